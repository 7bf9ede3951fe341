use anyhow::Context;
use kk_api::{telemetry, Application};
use kk_shared::AppConfig;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    telemetry::init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting KeyKeeper API server");

    let application = Application::build(config)
        .await
        .context("failed to initialise application")?;
    application.run().await.context("server exited with an error")?;

    Ok(())
}
