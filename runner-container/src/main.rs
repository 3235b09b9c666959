use anyhow::{Context, Result};
use relay_core::channel::json_lines::JsonLinesChannel;
use relay_core::config::load_config;
use relay_core::relay::Relay;
use relay_core::telemetry::init_tracing;
use tracing::info;

/// This is the entry point for running the relay as a long-lived process next
/// to the watch bridge, e.g. on a phone companion host or in a container.
///
/// What it does at a high-level:
///     Load config (first argument as a YAML path, else WATCH_RELAY_CONFIG, else defaults).
///     Read device events as JSON lines from stdin until EOF:
///         - GET the upstream server with the event payload
///         - write one `{"0": ...}` reply line to stdout
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref())
        .await
        .context("Failed to load relay configuration")?;
    let relay = Relay::new(&config)?;

    let channel = JsonLinesChannel::stdio();
    relay.run(&channel).await.context("Relay loop failed")?;

    info!("Device channel drained. Final metrics: {:?}", relay.metrics());
    Ok(())
}
