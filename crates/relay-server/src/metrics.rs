//! Prometheus recorder and metric names.
//!
//! Recording through the `metrics` macros is a no-op until a recorder is
//! installed, so library code records unconditionally.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the global Prometheus recorder.
///
/// Returns the handle used to render `/metrics`. Fails if a global recorder
/// is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// WebSocket connections accepted (counter, labels: role).
pub const WS_CONNECTIONS_TOTAL: &str = "relay_ws_connections_total";
/// WebSocket connections closed (counter, labels: role).
pub const WS_DISCONNECTIONS_TOTAL: &str = "relay_ws_disconnections_total";
/// Open WebSocket connections (gauge, labels: role).
pub const WS_CONNECTIONS_ACTIVE: &str = "relay_ws_connections_active";
/// Frames queued to a client (counter, labels: event).
pub const EVENTS_DELIVERED_TOTAL: &str = "relay_events_delivered_total";
/// Frames that could not be queued (counter, labels: event).
pub const DELIVERY_FAILURES_TOTAL: &str = "relay_delivery_failures_total";
/// Inbound frames dropped without effect (counter, labels: reason).
pub const FRAMES_IGNORED_TOTAL: &str = "relay_frames_ignored_total";
