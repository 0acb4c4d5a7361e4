//! Live client connections: identity, registry, routing and sessions.

pub mod broadcast;
pub mod connection;
pub mod identity;
pub mod protocol;
pub mod registry;
pub mod session;
