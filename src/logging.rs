//! Logger bootstrap for the runner and tests.

use env_logger::{Builder, Env};
use log::{debug, LevelFilter};

/// Initializes the global logger.
///
/// When `verbose` is `true`, per-frame debug messages are printed. Otherwise
/// only info level and above are shown. `RUST_LOG` overrides both, so
/// `RUST_LOG=lille_motion=trace` exposes individual impacts and probe hits.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);

    // `try_init` only fails if a logger was already set, which happens when
    // several tests initialise logging in one process.
    if builder.try_init().is_err() {
        debug!("logger already initialised");
    }
}
