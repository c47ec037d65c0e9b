#![forbid(unsafe_code)]

//! sbridge runtime
//!
//! # Key Components
//!
//! - [`Model`] - Trait for application state and behavior
//! - [`Cmd`] - Commands for side effects
//! - [`Dispatcher`] - Handle that delivers effect results back to the UI thread
//! - [`Program`] - The terminal event loop
//! - [`ProgramCore`] - The loop's state and steps, without a terminal
//! - [`ProgramSimulator`] - Terminal-free driver for tests
//!
//! # How it fits
//! The runtime consumes input events from `sbridge-core`, drives
//! `Model::update`, calls `Model::view` into a [`Buffer`], and hands the
//! buffer to the [`Presenter`].

pub mod buffer;
pub mod dispatch;
pub mod frame;
pub mod presenter;
pub mod program;
pub mod simulator;

pub use buffer::{Buffer, Cell, CellAttrs};
pub use dispatch::Dispatcher;
pub use frame::Frame;
pub use presenter::Presenter;
pub use program::{Cmd, Effect, Model, Program, ProgramConfig, ProgramCore};
pub use simulator::{CmdRecord, ProgramSimulator};
