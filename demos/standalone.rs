use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use edutrack_console::{
    logging, ApiClient, AuthSession, ConsoleConfig, ConsoleService, FirebaseIdentity,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    info!("Starting EduTrack console example");

    // API_URL and IDENTITY_API_KEY must be set; see ConsoleConfig::from_env
    let config = ConsoleConfig::from_env()?;

    let api = ApiClient::new(&config)?;
    let identity = FirebaseIdentity::new(&config)?;
    let auth = AuthSession::new(Arc::new(identity));

    let console = ConsoleService::new(api, auth);

    let app = Router::new()
        .merge(console.router())
        .route("/health", axum::routing::get(|| async { "OK" }));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Console running on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
