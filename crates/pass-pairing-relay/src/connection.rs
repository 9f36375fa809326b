//! Channel-backed device connection handle.
//!
//! The socket layer owns the actual WebSocket. It calls [`WsConnection::open`]
//! on accept, registers the handle, and drains the returned [`Outbound`] into
//! the socket until it yields `None`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use pass_pairing_core::MobileConnection;

use crate::error::{RelayError, Result};

/// Sending half of a device connection.
///
/// `send` only pushes onto an unbounded channel, so many relay tasks can send
/// concurrently and none of them waits on the registry.
#[derive(Debug)]
pub struct WsConnection {
    conn_id: String,
    device_id: String,
    tx: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

/// Receiving half, drained by the socket writer.
#[derive(Debug)]
pub struct Outbound {
    rx: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
}

impl WsConnection {
    /// Create a handle for `device_id` and the outbound queue that feeds its socket.
    pub fn open(device_id: &str) -> (Arc<Self>, Outbound) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let conn = Arc::new(Self {
            conn_id: Uuid::new_v4().to_string(),
            device_id: device_id.to_string(),
            tx,
            cancel: cancel.clone(),
        });
        debug!(conn_id = %conn.conn_id, device_id, "Opened device connection");
        (conn, Outbound { rx, cancel })
    }

    pub fn conn_id(&self) -> &str {
        &self.conn_id
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }

    /// Queue a serialized frame for the device.
    pub fn send(&self, text: String) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(self.closed_error());
        }
        self.tx.send(text).map_err(|_| self.closed_error())
    }

    /// Resolves once the handle has been closed.
    pub async fn closed(&self) {
        self.cancel.cancelled().await
    }

    fn closed_error(&self) -> RelayError {
        RelayError::ConnectionClosed {
            conn_id: self.conn_id.clone(),
        }
    }
}

impl MobileConnection for WsConnection {
    fn close(&self) {
        if !self.cancel.is_cancelled() {
            debug!(conn_id = %self.conn_id, device_id = %self.device_id, "Closing device connection");
            self.cancel.cancel();
        }
    }
}

impl Outbound {
    /// Next frame to write, or `None` once the handle is closed or dropped.
    ///
    /// Frames accepted by `send` before the close are still flushed.
    pub async fn next(&mut self) -> Option<String> {
        if !self.cancel.is_cancelled() {
            tokio::select! {
                biased;
                msg = self.rx.recv() => return msg,
                _ = self.cancel.cancelled() => {}
            }
        }
        // Closing the receiver makes any racing send fail instead of landing
        // after the drain.
        self.rx.close();
        self.rx.try_recv().ok()
    }

    /// Close from the socket side, e.g. when the peer hangs up.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.rx.close();
    }
}
