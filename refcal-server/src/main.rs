mod routes;
mod singleton;
mod state;

use anyhow::Result;
use refcal_core::RefCalConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("refcal_core=info,refcal_server=info,tower_http=info")),
        )
        .init();

    let config = RefCalConfig::load()?;
    let data_dir = config.data_path();
    std::fs::create_dir_all(&data_dir)?;

    // Ensure only one process writes the data directory
    let _lock = singleton::acquire_lock(&data_dir)?;

    let state = AppState::open(&data_dir)?;
    let app = routes::app(state);

    let addr = config.bind_addr()?;
    info!("refcal-server listening on http://{addr}, data in {}", data_dir.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
