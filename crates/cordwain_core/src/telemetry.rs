//! Tracing subscriber setup.

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console telemetry.
///
/// Respects `RUST_LOG`; falls back to `info,cordwain=debug`.
///
/// # Errors
///
/// Returns error if a global subscriber is already installed.
pub fn init_telemetry() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cordwain=debug"));
    install(env_filter)
}

/// Initialize console telemetry with an explicit default level.
///
/// `RUST_LOG` still wins when it is set.
pub fn init_telemetry_with_level(
    level: tracing::Level,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    install(env_filter)
}

fn install(env_filter: EnvFilter) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .try_init()?;

    info!("Telemetry initialized (console)");
    Ok(())
}
