// georeminders - geofence-triggered location reminders
// Entry point: reads JSON commands from stdin, one response per line on stdout

use georeminders::commands::{self, Command, CommandResponse};
use georeminders::config::{AppConfig, DEFAULT_LOG_FILTER};
use georeminders::platform::{LogNotifier, SimulatedLocationService};
use georeminders::app;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays a clean response stream
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting georeminders");

    let config = AppConfig::from_env()?;
    let device = SimulatedLocationService::new();
    let state = app::setup(config, Arc::new(device.clone()), Arc::new(LogNotifier)).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Command>(line) {
            Ok(command) => commands::execute(&state, &device, command).await,
            Err(e) => {
                tracing::warn!("Rejected command line: {}", e);
                CommandResponse::error(format!("Invalid command: {}", e))
            }
        };

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    state.shutdown_ui();
    tracing::info!("Input closed, shutting down");

    Ok(())
}
