//! Forwarding payloads to connected mobile devices.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connection::{Outbound, WsConnection};
use crate::error::{RelayError, Result};
use crate::state::RelayState;

/// Envelope written to a device socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayFrame {
    Relay {
        /// Sender, usually the extension id.
        from: String,
        payload: serde_json::Value,
    },
}

/// Open a connection handle for a freshly accepted device socket and make it
/// the device's current connection. Any previous handle is closed.
pub fn attach_device(state: &RelayState, device_id: &str) -> (Arc<WsConnection>, Outbound) {
    let (conn, outbound) = WsConnection::open(device_id);
    state.connections.set_connection(device_id, conn.clone());
    (conn, outbound)
}

/// Send `payload` from `from` to the device's current connection.
pub fn forward_to_device(
    state: &RelayState,
    device_id: &str,
    from: &str,
    payload: serde_json::Value,
) -> Result<()> {
    let conn = state
        .connections
        .get_connection(device_id)
        .ok_or_else(|| RelayError::DeviceNotConnected {
            device_id: device_id.to_string(),
        })?;

    let frame = RelayFrame::Relay {
        from: from.to_string(),
        payload,
    };
    conn.send(serde_json::to_string(&frame)?)?;
    debug!(device_id, from, conn_id = %conn.conn_id(), "Relayed message to device");
    Ok(())
}
