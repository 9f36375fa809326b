//! Relay-side wiring for extension/mobile pairing.
//!
//! Owns one pairing store and one device connection registry per process,
//! hands out channel-backed connection handles to the socket layer, and
//! forwards payloads to paired devices.

pub mod connection;
pub mod error;
pub mod logging;
pub mod relay;
pub mod state;
pub mod sweep;

pub use connection::{Outbound, WsConnection};
pub use error::{RelayError, Result};
pub use relay::{RelayFrame, attach_device, forward_to_device};
pub use state::RelayState;
