//! services/client/src/bin/docchat.rs

use docchat_lib::{
    adapters::{ConsoleNoticeSink, HttpDocumentService, JsonTourStore, TerminalLayout},
    app::{run, AppState, Console},
    config::Config,
    error::ClientError,
};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Backend at {}.", config.api_url);

    // --- 2. Initialize Adapters ---
    let service = Arc::new(HttpDocumentService::new(
        &config.api_url,
        config.request_timeout,
    )?);
    let store = Arc::new(JsonTourStore::open(&config.tour_state_path));
    let layout = Arc::new(TerminalLayout::new(config.viewport));

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        service,
        Arc::new(ConsoleNoticeSink),
        layout,
        store,
        Console::stdout(),
    ));

    // --- 4. Run the View ---
    run(app_state, BufReader::new(tokio::io::stdin())).await
}
