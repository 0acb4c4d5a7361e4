//! # relay-agent
//!
//! Distress relay binary: loads settings, installs logging and metrics,
//! seeds the officer directory and serves HTTP/WebSocket until Ctrl-C.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use relay_core::{OfficerId, OfficerRecord};
use relay_logging::{LogFormat, LogLevel, LoggingConfig};
use relay_server::config::ServerConfig;
use relay_server::server::RelayServer;
use relay_server::shutdown::DEFAULT_SHUTDOWN_TIMEOUT;
use relay_settings::RelaySettings;

/// Officer distress relay server.
#[derive(Parser, Debug)]
#[command(name = "relay-agent", about = "Officer distress relay server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Settings file (default `~/.relay/settings.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with an empty officer directory.
    #[arg(long)]
    no_seed: bool,
}

impl Cli {
    /// Fold command-line overrides into loaded settings.
    fn apply(&self, settings: &mut RelaySettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if self.no_seed {
            settings.seed.enabled = false;
        }
    }
}

fn server_config(settings: &RelaySettings) -> ServerConfig {
    ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
        send_queue_capacity: settings.server.send_queue_capacity,
        max_message_size: settings.server.max_message_size,
    }
}

fn logging_config(settings: &RelaySettings) -> LoggingConfig {
    LoggingConfig {
        level: LogLevel::from_str_lossy(&settings.logging.level),
        format: LogFormat::from_json_flag(settings.logging.json),
        ..LoggingConfig::default()
    }
}

/// Directory records for the configured seed officers, stamped `now`.
fn seed_records(settings: &RelaySettings) -> Vec<OfficerRecord> {
    if !settings.seed.enabled {
        return Vec::new();
    }
    let now = Utc::now();
    settings
        .seed
        .officers
        .iter()
        .map(|seed| OfficerRecord {
            id: OfficerId::from(seed.id.as_str()),
            name: seed.name.clone(),
            status: seed.status,
            last_seen: now,
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut settings = match args.config {
        Some(ref path) => relay_settings::load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => relay_settings::load_settings().context("Failed to load settings")?,
    };
    args.apply(&mut settings);

    relay_logging::init_subscriber(&logging_config(&settings))
        .context("Failed to initialize logging")?;

    let metrics_handle = match relay_server::metrics::install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "metrics recorder unavailable, /metrics disabled");
            None
        }
    };

    let server = RelayServer::in_memory(server_config(&settings), metrics_handle);
    let seeded = server.service().seed_officers(seed_records(&settings));
    tracing::info!(seeded, "officer directory ready");

    let (addr, handle) = server
        .listen()
        .await
        .context("Failed to bind server")?;
    tracing::info!("Distress relay listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    let drained = server
        .shutdown()
        .graceful_shutdown(vec![handle], Some(DEFAULT_SHUTDOWN_TIMEOUT))
        .await;
    if !drained {
        tracing::warn!("server did not stop within the shutdown timeout");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
