//! Device connection registry: the live transport handle of each mobile
//! device, keyed by device id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

/// A live bidirectional transport to a mobile device.
///
/// Handles are shared as `Arc`s: the relay may be sending on a handle while
/// the registry replaces it, so implementations must allow concurrent use.
pub trait MobileConnection: Send + Sync + 'static {
    /// Close the transport. Must be idempotent.
    fn close(&self);
}

/// Thread-safe map from device id to its current connection handle.
///
/// The registry owns the handles it holds: when [`set_connection`] replaces a
/// different handle for the same device, the superseded handle is closed.
///
/// [`set_connection`]: ConnectionRegistry::set_connection
pub struct ConnectionRegistry<C: MobileConnection> {
    devices: Mutex<HashMap<String, Arc<C>>>,
}

impl<C: MobileConnection> Default for ConnectionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: MobileConnection> ConnectionRegistry<C> {
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<C>>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind `device_id` to `conn`, closing any other handle it replaces.
    pub fn set_connection(&self, device_id: &str, conn: Arc<C>) {
        let previous = self.lock().insert(device_id.to_string(), conn.clone());

        // Closed outside the lock so a slow close never stalls lookups.
        match previous {
            Some(old) if !Arc::ptr_eq(&old, &conn) => {
                warn!(device_id, "Replacing existing device connection");
                old.close();
            }
            Some(_) => debug!(device_id, "Device connection re-registered"),
            None => debug!(device_id, "Device connected"),
        }
    }

    /// Current handle for `device_id`, if the device has connected.
    pub fn get_connection(&self, device_id: &str) -> Option<Arc<C>> {
        self.lock().get(device_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
