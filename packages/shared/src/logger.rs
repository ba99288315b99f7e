//! Logger setup shared by every Heya binary.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Without it, `default_level` is applied to the
/// binary's own crates and `info` to everything else.
///
/// # Arguments
///
/// * `bin_name` - Name of the running binary (usually `env!("CARGO_BIN_NAME")`)
/// * `default_level` - Log level used for Heya crates when `RUST_LOG` is unset
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let crate_name = bin_name.replace('-', "_");
        EnvFilter::new(format!(
            "info,{crate_name}={default_level},heya_server={default_level},tower_http={default_level}"
        ))
    });

    // try_init so that tests and repeated calls do not panic
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
