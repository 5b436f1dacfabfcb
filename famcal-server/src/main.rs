mod routes;
mod singleton;
mod state;

use anyhow::Result;
use famcal_core::MemoryStore;
use famcal_core::config::FamCalConfig;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("famcal_core=info,famcal_server=info,tower_http=info")),
        )
        .init();

    let config = FamCalConfig::load()?;
    let data_path = config.data_path();

    // Ensure only one instance writes the data file
    let _lock = singleton::acquire_lock(&data_path)?;

    let store = MemoryStore::open(&data_path)?;
    let state = AppState::new(store, config.tz()?);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("famcal-server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
