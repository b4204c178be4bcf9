use splitledger::{
    BroadcastHub, InMemoryLogging, InMemoryStorage, LedgerService, api, config::CONFIG,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&CONFIG.log_level)))
        .init();
    info!(config = ?*CONFIG, "configuration loaded");

    // Hub task lives as long as the service holds a handle to it
    let (hub, _hub_task) = BroadcastHub::spawn(CONFIG.broadcast_capacity, CONFIG.subscriber_buffer);

    // Initialize storage and logging
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let service = Arc::new(LedgerService::new(storage, logging, hub, CONFIG.store_timeout()));

    let app = api::app(service, CONFIG.request_timeout());

    // Start server
    let addr = SocketAddr::from((CONFIG.host, CONFIG.port));
    info!("Server running at http://{}", addr);
    info!("Swagger UI at http://{}/swagger-ui", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
