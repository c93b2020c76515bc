//! Telemetry and Observability
//!
//! Structured logging setup shared by the relay server and the tracker.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter for the relay server
pub const SERVER_FILTER: &str = "info,location_relay=debug,tower_http=debug";

/// Default filter for the tracker client
pub const TRACKER_FILTER: &str = "info,location_relay=info";

/// Initialize tracing subscriber
///
/// `RUST_LOG` wins over `default_filter` when set. `LOG_FORMAT=json`
/// switches to JSON lines.
pub fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }

    tracing::info!("Tracing initialized");
}
