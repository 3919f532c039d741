//! Logger bootstrap for native runners

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initialize the global logger.
///
/// `RUST_LOG` wins when set; otherwise `info` (or `debug` when `verbose`).
/// Calling this more than once is harmless.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    // try_init only fails when a logger is already installed
    let _ = Builder::from_env(env).format_timestamp_millis().try_init();
}
