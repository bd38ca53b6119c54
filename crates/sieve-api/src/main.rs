use sieve_api::setup;
use sieve_core::Config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    sieve_infra::init_telemetry("sieve-api", config.environment(), config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let app = setup::initialize_app(config.clone()).await?;

    let served = setup::server::start_server(&config, app.router.clone()).await;

    app.shutdown().await;

    served
}
