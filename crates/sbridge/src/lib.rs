#![forbid(unsafe_code)]

//! sbridge: a counter screen backed by a number bridge.
//!
//! - [`bridge`] - the `getNumber` capability and its implementations
//! - [`shell`] - the [`AppShell`](shell::AppShell) model
//! - [`cli`] - command-line and environment configuration

pub mod bridge;
pub mod cli;
pub mod shell;

use bridge::{EchoBridge, NativeBridge, NumberBridge, SilentBridge};
use cli::{BridgeKind, Opts};
use sbridge_runtime::program::ProgramConfig;
use std::sync::Arc;

/// Build the bridge selected by `opts`.
pub fn bridge_from_opts(opts: &Opts) -> Arc<dyn NumberBridge> {
    match opts.bridge {
        BridgeKind::Native => Arc::new(NativeBridge {
            step: opts.step,
            latency: opts.latency(),
        }),
        BridgeKind::Echo => Arc::new(EchoBridge),
        BridgeKind::Silent => Arc::new(SilentBridge),
    }
}

/// Runtime configuration derived from `opts`.
pub fn program_config(opts: &Opts) -> ProgramConfig {
    ProgramConfig {
        alternate_screen: opts.alternate_screen,
        mouse: opts.mouse,
        exit_after: opts.exit_after(),
        ..ProgramConfig::default()
    }
}
