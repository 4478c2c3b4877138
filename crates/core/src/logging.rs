//! Logging initialization and configuration.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the logging system with tracing.
///
/// `RUST_LOG` wins when set. Otherwise the filter is `info`, or `debug`
/// for the workspace crates when `verbose` is requested.
///
/// # Example
/// ```
/// triframe_core::init_logging(false);
/// tracing::info!("Renderer initialized");
/// ```
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "info,triframe=debug,triframe_rhi=debug,triframe_renderer=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // try_init so repeated calls (doc tests, multiple test binaries) are harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .try_init();
}
