// Filmgraph server - users, friendships, films and likes over HTTP

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use filmgraph::{api::create_router, app_state::AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(config.clone()).await?;
    let app = create_router(app_state);

    let addr = config.server_address();
    info!(
        "Filmgraph listening on http://{} ({:?} storage, {:?} friendships)",
        addr, config.database.backend, config.catalog.friendship_policy
    );

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
