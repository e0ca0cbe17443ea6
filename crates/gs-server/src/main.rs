use std::sync::Arc;

use gs_common::config::ServerConfig;
use gs_server::db::connect_and_migrate;
use gs_server::routes::build_router;
use gs_server::state::AppState;
use gs_server::storage::local::LocalStorage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ServerConfig::from_env()?;
    let pool = connect_and_migrate(&config.database_url).await?;
    let storage = Arc::new(LocalStorage::new(
        config.storage_root.clone(),
        config.public_file_base.clone(),
    ));

    let state = AppState::new(pool, storage, config.session_ttl_hours);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "greenstay server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
