//! Pairing state and live device connections for extension/mobile pairing.
//!
//! Two independent stores: [`pairing::PairingStore`] keyed by extension id and
//! [`connection::ConnectionRegistry`] keyed by device id. Composition happens
//! in the caller.

pub mod config;
pub mod connection;
pub mod error;
pub mod pairing;
pub mod types;

pub use connection::{ConnectionRegistry, MobileConnection};
pub use error::{PairingError, Result};
pub use pairing::PairingStore;
pub use types::{PairingInfo, PairingRecord};
