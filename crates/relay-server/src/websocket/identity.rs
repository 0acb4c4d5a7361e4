//! Client identity: who is on the other end of a connection.

use std::fmt;
use std::str::FromStr;

use relay_core::OfficerId;
use serde::{Deserialize, Serialize};

/// Which side of the relay a client is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    /// A field officer's device.
    Officer,
    /// A dispatch console.
    Dispatch,
}

impl ClientRole {
    /// Route segment for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Officer => "officer",
            Self::Dispatch => "dispatch",
        }
    }
}

impl fmt::Display for ClientRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "officer" => Ok(Self::Officer),
            "dispatch" => Ok(Self::Dispatch),
            other => Err(format!("unknown client type: {other}")),
        }
    }
}

/// Registry key: role plus the raw id from the route.
///
/// Roles namespace ids, so a dispatch console called `7` and officer `7`
/// are different identities.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientIdentity {
    role: ClientRole,
    id: String,
}

impl ClientIdentity {
    /// Build from a role and raw id.
    pub fn new(role: ClientRole, id: impl Into<String>) -> Self {
        Self {
            role,
            id: id.into(),
        }
    }

    /// Identity of an officer's device.
    pub fn officer(id: &OfficerId) -> Self {
        Self::new(ClientRole::Officer, id.as_str())
    }

    /// Identity of a dispatch console.
    pub fn dispatch(id: impl Into<String>) -> Self {
        Self::new(ClientRole::Dispatch, id)
    }

    /// The client's role.
    pub fn role(&self) -> ClientRole {
        self.role
    }

    /// The officer id, for officer identities.
    pub fn officer_id(&self) -> Option<OfficerId> {
        match self.role {
            ClientRole::Officer => Some(OfficerId::from(self.id.as_str())),
            ClientRole::Dispatch => None,
        }
    }

    /// Whether this is a dispatch console.
    pub fn is_dispatch(&self) -> bool {
        self.role == ClientRole::Dispatch
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            ClientRole::Officer => f.write_str(&self.id),
            ClientRole::Dispatch => write!(f, "dispatch_{}", self.id),
        }
    }
}
