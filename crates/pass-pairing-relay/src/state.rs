//! Shared relay state.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use pass_pairing_core::config::Config;
use pass_pairing_core::{ConnectionRegistry, PairingStore};

use crate::connection::WsConnection;
use crate::sweep::spawn_expiry_sweeper;

/// Process-wide relay state, built once at startup and shared with every
/// handler through an `Arc`.
///
/// The two stores lock independently and never call each other.
pub struct RelayState {
    pub config: Arc<Config>,
    pub pairing: Arc<PairingStore>,
    pub connections: Arc<ConnectionRegistry<WsConnection>>,
    shutdown: CancellationToken,
}

impl RelayState {
    pub fn new(config: Config) -> Self {
        let pairing = PairingStore::from_config(&config.pairing());
        Self {
            config: Arc::new(config),
            pairing: Arc::new(pairing),
            connections: Arc::new(ConnectionRegistry::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Start the background expiry sweep. Returns `None` when pairings never
    /// expire. Must be called from within a tokio runtime.
    pub fn start_sweeper(&self) -> Option<JoinHandle<()>> {
        self.pairing.ttl()?;
        let interval = self.config.pairing().sweep_interval();
        Some(spawn_expiry_sweeper(
            self.pairing.clone(),
            interval,
            self.shutdown.child_token(),
        ))
    }

    /// Stop background tasks started from this state.
    pub fn shutdown(&self) {
        info!("Relay state shutting down");
        self.shutdown.cancel();
    }
}
