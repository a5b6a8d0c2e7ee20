use std::sync::Arc;

use anyhow::Context;

use invoicepad_api::{build_app, ProductStore, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    invoicepad_observability::init();

    let config = ServerConfig::from_env()?;
    if config.auth_token.is_none() {
        tracing::warn!("INVOICEPAD_AUTH_TOKEN not set; product routes are unauthenticated");
    }

    let store = Arc::new(if config.seed {
        ProductStore::seeded()
    } else {
        ProductStore::new()
    });
    let app = build_app(store, config.auth_token.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server terminated")?;
    Ok(())
}
