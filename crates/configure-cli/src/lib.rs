//! configure library - expose modules for testing
//!
//! The binary keeps the plugin registry, the aggregator manifest and the
//! workspace member list of a collector monorepo in sync with the plugin
//! crates on disk.

pub mod commands;
pub mod common;

pub use common::{GlobalOpts, RunStatus, FATAL_EXIT_CODE};
pub use configure_logger as logger;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tracing filter for a verbosity level: warn, `-v` debug, `-vv` trace
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the tracing subscriber used by the library crates
///
/// `RUST_LOG` wins over the verbosity flags.
pub fn init_tracing(verbosity: u8) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(verbosity).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
