//! # relay-core
//!
//! Shared vocabulary for the distress relay crates.
//!
//! - **Branded IDs**: `OfficerId`, `MessageId` as newtypes over `String`
//! - **Records**: `OfficerRecord` (directory) and `MessageRecord` (message log)
//! - **Events**: `RelayEvent`, the closed set of frames pushed to live clients
//! - **Errors**: `RelayError` for lookups that miss

#![deny(unsafe_code)]

pub mod errors;
pub mod events;
pub mod ids;
pub mod message;
pub mod officer;

pub use errors::{RelayError, Result};
pub use events::RelayEvent;
pub use ids::{MessageId, OfficerId};
pub use message::MessageRecord;
pub use officer::{NewOfficer, OfficerRecord, OfficerStatus};
