//! Tracing setup
//!
//! Diagnostics go to stderr so they never mix with `--list` output. The
//! default level is `warn`; `VERSO_DEBUG` raises it to `debug`, and
//! `RUST_LOG` overrides both.

use std::env;
use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging; `debug` comes from [`crate::config::Settings::debug`]
pub fn init(debug: bool) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = if debug { "debug" } else { "warn" };

        let filter = if env::var_os("RUST_LOG").is_some() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!("verso_install={level}"))
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(debug)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    });
}
