#![deny(missing_docs)]
//! Shared logging utilities for the chat workspace.
//!
//! Every crate logs through the `agri_*` macros. Hosts and tests build their
//! `simplelog` configuration from [`base_config`], which keeps the HTTP stack
//! quiet so chat traffic logs stay readable.

use log::LevelFilter;
use simplelog::{Config, ConfigBuilder};

/// Log targets of the HTTP client stack that are never forwarded.
pub const QUIET_TARGETS: [&str; 4] = ["reqwest", "hyper", "hyper_util", "rustls"];

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! agri_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! agri_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! agri_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! agri_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! agri_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Level used when nothing more specific is configured.
///
/// Debug builds log at `Debug`, release builds at `Info`.
pub fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Shared `simplelog` configuration: RFC 3339 timestamps, targets only on
/// errors, and the [`QUIET_TARGETS`] filtered out.
pub fn base_config() -> Config {
    let mut builder = ConfigBuilder::new();
    builder
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error);
    for target in QUIET_TARGETS {
        builder.add_filter_ignore_str(target);
    }
    builder.build()
}

/// Initializes a terminal logger for tests.
///
/// Safe to call from every test; only the first call installs a logger.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode};

    let _ = CombinedLogger::init(vec![TermLogger::new(
        default_level(),
        base_config(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
