use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use agdb_api::app::{build_app, services::build_services};
use agdb_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agdb_observability::init();

    let config = ApiConfig::from_env()?;
    let services = Arc::new(build_services(&config).await?);
    let app = build_app(services);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
