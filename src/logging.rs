//! Stderr logging for the binary.
//!
//! `LTOLABEL_LOG` takes an `EnvFilter` directive (default `warn`).
//! `--verbose` switches this crate to `debug` regardless.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub const LOG_ENV: &str = "LTOLABEL_LOG";

pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,lto_label=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_span_events(FmtSpan::NONE);

    // A subscriber may already be installed when embedded or under test.
    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .try_init();

    tracing::debug!(verbose, "logging initialized");
}
