// Initialize configuration
// Set up logging
// Create the chain client, account store and scanner
// Start the account polling task
// Start HTTP server, shut both down on Ctrl-C

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tx_history_service::{
    api,
    blockchain::{self, RpcClient},
    config::Config,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tx-history-service");

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    // Shared state
    let client = Arc::new(RpcClient::new(&config));
    let app_state = Arc::new(AppState::new(config.clone(), client));

    // Start account polling task
    let shutdown = CancellationToken::new();
    let polling_state = app_state.clone();
    let polling_shutdown = shutdown.clone();
    let polling_handle = tokio::spawn(async move {
        blockchain::start_polling(polling_state, polling_shutdown).await;
    });
    info!("Account polling task started");

    // Start HTTP server
    let app = api::create_router(app_state);
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Http server started at {}", addr);

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Err(e) = polling_handle.await {
        error!("Polling task ended abnormally: {}", e);
    }

    Ok(())
}
