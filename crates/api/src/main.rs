use anyhow::Context;

use conduct_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config is read before logging exists, so its outcome is logged afterwards.
    let config = AppConfig::from_env();
    conduct_observability::init(
        config
            .as_ref()
            .map(|config| config.log_format)
            .unwrap_or_default(),
    );
    let config = config.context("invalid configuration")?;

    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }
    tracing::info!(?config, "configuration loaded");

    let app = conduct_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
