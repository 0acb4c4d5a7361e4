//! Settings types. JSON keys are camelCase.

use relay_core::OfficerStatus;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelaySettings {
    /// Listener and connection settings.
    pub server: ServerSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
    /// Officers inserted into the directory at startup.
    pub seed: SeedSettings,
}

impl RelaySettings {
    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(SettingsError::InvalidValue("server.host is empty".into()));
        }
        if self.server.send_queue_capacity == 0 {
            return Err(SettingsError::InvalidValue(
                "server.sendQueueCapacity must be > 0".into(),
            ));
        }
        if self.server.max_message_size < 1024 {
            return Err(SettingsError::InvalidValue(
                "server.maxMessageSize must be at least 1024 bytes".into(),
            ));
        }
        if let Some(dup) = duplicate_seed_id(&self.seed.officers) {
            return Err(SettingsError::InvalidValue(format!(
                "seed.officers contains duplicate id {dup}"
            )));
        }
        Ok(())
    }
}

fn duplicate_seed_id(officers: &[SeedOfficer]) -> Option<&str> {
    let mut seen = std::collections::HashSet::new();
    officers
        .iter()
        .map(|o| o.id.as_str())
        .find(|id| !seen.insert(*id))
}

/// Listener and per-connection limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind host.
    pub host: String,
    /// Bind port (`0` picks a free port).
    pub port: u16,
    /// Outbound frames buffered per connection before deliveries fail.
    pub send_queue_capacity: usize,
    /// Largest inbound WebSocket message accepted, in bytes.
    pub max_message_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            send_queue_capacity: 256,
            max_message_size: 64 * 1024,
        }
    }
}

/// Log output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter level (`RUST_LOG` takes precedence).
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

/// Startup seed data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedSettings {
    /// Whether to insert `officers` at startup.
    pub enabled: bool,
    /// Officers to insert.
    pub officers: Vec<SeedOfficer>,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            officers: vec![SeedOfficer {
                id: "officer_001".into(),
                name: "Daniel Bernardo".into(),
                status: OfficerStatus::ElevatedVitals,
            }],
        }
    }
}

/// One seeded officer. Unlike API-created officers, the id is fixed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedOfficer {
    /// Directory id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Initial status.
    #[serde(default)]
    pub status: OfficerStatus,
}
