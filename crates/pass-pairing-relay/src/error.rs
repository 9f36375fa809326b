use thiserror::Error;

use pass_pairing_core::PairingError;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Device not connected: {device_id}")]
    DeviceNotConnected { device_id: String },

    #[error("Connection closed: {conn_id}")]
    ConnectionClosed { conn_id: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Pairing(#[from] PairingError),
}

pub type Result<T> = std::result::Result<T, RelayError>;
