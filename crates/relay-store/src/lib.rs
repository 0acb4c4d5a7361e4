//! # relay-store
//!
//! The two record stores the relay reads and writes:
//!
//! - [`Directory`]: officer records and their status
//! - [`MessageLog`]: dispatch messages and officer responses
//!
//! Both are traits so the server only sees the narrow interface it needs.
//! The in-memory implementations guard each map with its own lock; there
//! are no cross-store transactions.

#![deny(unsafe_code)]

pub mod directory;
pub mod message_log;

pub use directory::{Directory, InMemoryDirectory};
pub use message_log::{InMemoryMessageLog, MessageLog};
