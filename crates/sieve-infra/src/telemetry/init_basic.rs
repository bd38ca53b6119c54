use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "sieve=debug,sieve_api=debug,sieve_worker=debug,tower_http=debug";

/// Initialize tracing with an env-driven filter (`RUST_LOG`) and a pretty or JSON formatter.
pub fn init_telemetry(
    service_name: &str,
    environment: &str,
    log_format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let registry = tracing_subscriber::registry().with(filter);
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    tracing::info!(
        service = %service_name,
        environment = %environment,
        log_format = %log_format,
        "Tracing initialized"
    );
    Ok(())
}
