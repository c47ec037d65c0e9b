#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Environment variables with the `SBRIDGE_` prefix supply defaults; explicit
//! flags override them.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Full `--help` output.
pub const HELP_TEXT: &str = "\
sbridge: a counter screen that fetches its number through a native bridge

USAGE:
    sbridge [OPTIONS]

OPTIONS:
    --bridge=KIND        Bridge implementation: 'native' (default), 'echo', 'silent'
    --step=N             Amount the native bridge adds to its input (default: 1)
    --latency-ms=N       Simulated native bridge latency in ms (default: 0)
    --inline             Draw on the main screen instead of the alternate screen
    --no-mouse           Disable mouse event capture
    --log-file=PATH      Write JSON logs to PATH (logging is off otherwise)
    --log-filter=FILTER  Log filter directive, e.g. 'debug' (default: info)
    --exit-after-ms=N    Quit automatically after N milliseconds
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    Enter / Space / click   Call getNumber with the displayed number
    q / Esc / Ctrl+C        Quit

ENVIRONMENT VARIABLES:
    SBRIDGE_BRIDGE          Override --bridge
    SBRIDGE_STEP            Override --step
    SBRIDGE_LATENCY_MS      Override --latency-ms
    SBRIDGE_LOG_FILE        Override --log-file
    SBRIDGE_LOG_FILTER      Override --log-filter
    SBRIDGE_EXIT_AFTER_MS   Override --exit-after-ms
    RUST_LOG                Takes precedence over --log-filter when set";

/// Which bridge implementation to wire into the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeKind {
    /// In-process Rust implementation.
    #[default]
    Native,
    /// Answers with the input.
    Echo,
    /// Never answers.
    Silent,
}

impl std::str::FromStr for BridgeKind {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(Self::Native),
            "echo" => Ok(Self::Echo),
            "silent" => Ok(Self::Silent),
            other => Err(CliError::InvalidValue {
                option: "--bridge",
                value: other.to_string(),
            }),
        }
    }
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Bridge implementation.
    pub bridge: BridgeKind,
    /// Native bridge step.
    pub step: i64,
    /// Native bridge latency.
    pub latency_ms: u64,
    /// Use the alternate screen.
    pub alternate_screen: bool,
    /// Whether mouse events are enabled.
    pub mouse: bool,
    /// JSON log destination.
    pub log_file: Option<PathBuf>,
    /// Log filter directive.
    pub log_filter: Option<String>,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            bridge: BridgeKind::Native,
            step: 1,
            latency_ms: 0,
            alternate_screen: true,
            mouse: true,
            log_file: None,
            log_filter: None,
            exit_after_ms: 0,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Run the application.
    Run(Opts),
    /// Print help and exit.
    Help,
    /// Print version and exit.
    Version,
}

/// A command line that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// An option value failed to parse.
    InvalidValue {
        /// The option (or environment variable) name.
        option: &'static str,
        /// The rejected value.
        value: String,
    },
    /// An argument that is not an option we know.
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { option, value } => write!(f, "Invalid {option} value: {value}"),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

fn parse_value<T: std::str::FromStr>(option: &'static str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::InvalidValue {
        option,
        value: value.to_string(),
    })
}

impl Opts {
    /// Parse `args` (without the program name) on top of `env` lookups.
    pub fn parse_from<I, F>(args: I, env: F) -> Result<Parsed, CliError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = env("SBRIDGE_BRIDGE") {
            opts.bridge = val.parse()?;
        }
        if let Some(val) = env("SBRIDGE_STEP") {
            opts.step = parse_value("SBRIDGE_STEP", &val)?;
        }
        if let Some(val) = env("SBRIDGE_LATENCY_MS") {
            opts.latency_ms = parse_value("SBRIDGE_LATENCY_MS", &val)?;
        }
        if let Some(val) = env("SBRIDGE_LOG_FILE") {
            opts.log_file = Some(PathBuf::from(val));
        }
        if let Some(val) = env("SBRIDGE_LOG_FILTER") {
            opts.log_filter = Some(val);
        }
        if let Some(val) = env("SBRIDGE_EXIT_AFTER_MS") {
            opts.exit_after_ms = parse_value("SBRIDGE_EXIT_AFTER_MS", &val)?;
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--inline" => opts.alternate_screen = false,
                "--no-mouse" => opts.mouse = false,
                other => {
                    if let Some(val) = other.strip_prefix("--bridge=") {
                        opts.bridge = val.parse()?;
                    } else if let Some(val) = other.strip_prefix("--step=") {
                        opts.step = parse_value("--step", val)?;
                    } else if let Some(val) = other.strip_prefix("--latency-ms=") {
                        opts.latency_ms = parse_value("--latency-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--log-filter=") {
                        opts.log_filter = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after_ms = parse_value("--exit-after-ms", val)?;
                    } else {
                        return Err(CliError::UnknownArgument(other.to_string()));
                    }
                }
            }
        }

        Ok(Parsed::Run(opts))
    }

    /// Parse the process arguments and environment.
    ///
    /// Prints help/version or the parse error and exits the process when the
    /// application should not run.
    pub fn parse() -> Self {
        match Self::parse_from(std::env::args().skip(1), |k| std::env::var(k).ok()) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                std::process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("sbridge {VERSION}");
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("{e}");
                eprintln!("Run with --help for usage information.");
                std::process::exit(1);
            }
        }
    }

    /// Native bridge latency as a duration.
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Auto-exit deadline, if any.
    pub fn exit_after(&self) -> Option<Duration> {
        (self.exit_after_ms > 0).then(|| Duration::from_millis(self.exit_after_ms))
    }
}
