//! valet binary - composition root.
//!
//! Ties the crates together:
//! 1. Parse CLI args and load configuration from TOML
//! 2. Initialize file logging (the terminal owns stderr)
//! 3. Build the agent client, history store, and chat session
//! 4. Start the telemetry poller and feed it into the event loop
//! 5. Run the terminal shell until quit

mod app;
mod cli;
mod tui;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use valet_agent::AgentClient;
use valet_core::ValetConfig;
use valet_session::{ChatSession, NullVoice};
use valet_store::HistoryStore;
use valet_telemetry::TelemetryPoller;

use crate::app::App;
use crate::cli::CliArgs;
use crate::tui::{AppEvent, EventHandler};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_path = args.resolve_config_path();
    let config = ValetConfig::load_or_default(&config_path);

    let data_dir = args.resolve_data_dir(&config.general.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    // Logs go to a file: the alternate screen owns stderr while we run.
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("valet.log"))?;
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .init();

    info!("Starting valet v{}", env!("CARGO_PKG_VERSION"));
    info!(path = %config_path.display(), "Configuration loaded");

    let base_url = args.resolve_base_url(&config.server.base_url);
    let client = Arc::new(AgentClient::new(
        &base_url,
        Duration::from_secs(config.server.timeout_secs),
    )?);

    // Connectivity probe; the shell starts either way.
    match client.health().await {
        Ok(health) => info!(status = %health.status, "Agent service reachable"),
        Err(e) => warn!("Agent service not reachable yet: {}", e),
    }

    let store = HistoryStore::in_dir(&data_dir);
    let session = ChatSession::new(&config.chat, store, Box::new(NullVoice));

    let poller = TelemetryPoller::new(Duration::from_secs(config.telemetry.poll_interval_secs));
    let (poller_handle, mut telemetry_rx) = poller.start(Arc::clone(&client));

    let mut events = EventHandler::new(Duration::from_millis(120));

    // Feed poll outcomes into the single consumer loop.
    let telemetry_tx = events.sender();
    tokio::spawn(async move {
        while let Some(event) = telemetry_rx.recv().await {
            if telemetry_tx.send(AppEvent::Telemetry(event)).is_err() {
                break;
            }
        }
    });

    let mut app = App::new(
        Arc::clone(&client),
        session,
        Some(poller_handle),
        events.sender(),
        data_dir.join("exports"),
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = app.run(&mut terminal, &mut events).await;
    tui::restore()?;

    info!("valet exiting");
    result?;
    Ok(())
}
