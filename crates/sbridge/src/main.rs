#![forbid(unsafe_code)]

//! sbridge binary entry point.

use sbridge::cli;
use sbridge::shell::AppShell;
use sbridge_core::logging::init_file_logging;
use sbridge_runtime::program::Program;

fn main() {
    let opts = cli::Opts::parse();

    if let Some(path) = &opts.log_file
        && let Err(e) = init_file_logging(path, opts.log_filter.as_deref())
    {
        eprintln!("Failed to initialize logging at {}: {e}", path.display());
        std::process::exit(1);
    }

    let bridge = sbridge::bridge_from_opts(&opts);
    tracing::info!(bridge = bridge.name(), step = opts.step, "starting sbridge");
    let shell = AppShell::new(bridge);

    // The program (and its terminal session) is dropped before any exit.
    let result =
        Program::with_config(shell, sbridge::program_config(&opts)).and_then(|mut p| p.run());
    if let Err(e) = result {
        eprintln!("sbridge: {e}");
        std::process::exit(1);
    }
}
