use anyhow::Context;

use roster_api::config::ApiConfig;
use roster_infra::Storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;
    roster_observability::init(config.log_format);

    let storage = Storage::connect(&config.storage)
        .await
        .context("failed to initialize storage")?;
    tracing::info!(
        backend = if config.storage.is_persistent() { "postgres" } else { "in-memory" },
        timeout_ms = storage.timeout().as_millis() as u64,
        "storage ready"
    );
    if !config.storage.is_persistent() {
        tracing::warn!("DATABASE_URL not set; records live in memory and vanish on exit");
    }

    let app = roster_api::app::build_app(storage);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
