//! Officer records held by the directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ids::OfficerId;

/// Reported condition of an officer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficerStatus {
    /// Vitals within range.
    #[default]
    Normal,
    /// Wearable telemetry reports elevated vitals.
    ElevatedVitals,
    /// Officer-declared or detected emergency.
    Emergency,
}

impl OfficerStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::ElevatedVitals => "elevated_vitals",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for OfficerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfficerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "elevated_vitals" => Ok(Self::ElevatedVitals),
            "emergency" => Ok(Self::Emergency),
            other => Err(format!("unknown officer status: {other}")),
        }
    }
}

/// An officer as stored in the directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerRecord {
    /// Directory id.
    pub id: OfficerId,
    /// Display name.
    pub name: String,
    /// Current status.
    pub status: OfficerStatus,
    /// Last time the status was written.
    pub last_seen: DateTime<Utc>,
}

impl OfficerRecord {
    /// Apply a status change and refresh `last_seen`.
    pub fn set_status(&mut self, status: OfficerStatus, at: DateTime<Utc>) {
        self.status = status;
        self.last_seen = at;
    }
}

/// Fields accepted when creating an officer. The directory assigns the id
/// and `last_seen`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOfficer {
    /// Display name.
    pub name: String,
    /// Initial status.
    #[serde(default)]
    pub status: OfficerStatus,
}
