//! # relay-server
//!
//! Axum HTTP + `WebSocket` server for the distress relay.
//!
//! - Connection registry keyed by role-namespaced client identity
//! - Broadcast routing: point-to-point to an officer, fan-out to dispatch
//! - Per-connection sessions with a bounded outbound queue and writer task
//! - REST routes over the officer directory and message log
//! - Health, Prometheus metrics, and graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod service;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use server::RelayServer;
pub use service::RelayService;
