use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize structured logging for the wizard.
///
/// RUST_LOG takes precedence over the configured level. Fails instead of
/// panicking when a global subscriber is already installed.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    tracing::info!("Triage telemetry initialized with structured logging");
    Ok(())
}

/// Span wrapping one wizard event from dispatch to persistence
pub fn create_wizard_span(event: &str, step: &str) -> tracing::Span {
    tracing::info_span!("wizard_event", event = event, step = step)
}
