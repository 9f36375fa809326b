//! Extension pairing store: pairing state between a browser extension and a
//! mobile device, keyed by extension id.
//!
//! Records are created by [`PairingStore::add`] and only ever updated through
//! [`PairingStore::set_pairing_info`]; an update never creates a record.
//! Every operation takes the single store lock once, so each call is atomic.
//! Sequences of calls (exists-then-set) are not.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::config::PairingConfig;
use crate::error::{PairingError, Result};
use crate::types::{PairingInfo, PairingRecord};

/// In-memory pairing table.
///
/// Without a TTL the `expires` field of every record stays `None` and nothing
/// ever expires. With a TTL, writes stamp `now + ttl`, expired records read as
/// absent, and [`PairingStore::purge_expired`] drops them.
#[derive(Debug, Default)]
pub struct PairingStore {
    ttl: Option<TimeDelta>,
    extensions: Mutex<HashMap<String, PairingRecord>>,
}

impl PairingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero TTL is treated as no TTL.
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            ttl: ttl
                .filter(|d| !d.is_zero())
                .and_then(|d| TimeDelta::from_std(d).ok()),
            extensions: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &PairingConfig) -> Self {
        Self::with_ttl(config.ttl())
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl.and_then(|d| d.to_std().ok())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PairingRecord>> {
        // Critical sections never leave the map half-written.
        self.extensions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.ttl.and_then(|ttl| now.checked_add_signed(ttl))
    }

    /// Register an extension, resetting any previous pairing info.
    pub fn add(&self, extension_id: &str) {
        let record = PairingRecord::new(extension_id, self.expiry_from(Utc::now()));
        let previous = self.lock().insert(extension_id.to_string(), record);
        debug!(
            extension_id,
            reset = previous.is_some(),
            "Added extension"
        );
    }

    /// Check whether a live record exists for the extension.
    pub fn exists(&self, extension_id: &str) -> bool {
        let now = Utc::now();
        self.lock()
            .get(extension_id)
            .is_some_and(|r| !r.is_expired(now))
    }

    /// Snapshot of the pairing info for an extension.
    pub fn get_pairing_info(&self, extension_id: &str) -> Result<PairingInfo> {
        let now = Utc::now();
        self.lock()
            .get(extension_id)
            .filter(|r| !r.is_expired(now))
            .map(|r| r.pairing_info.clone())
            .ok_or_else(|| PairingError::not_found(extension_id))
    }

    /// Replace the pairing info of an existing extension.
    ///
    /// Fails with [`PairingError::NotFound`] if the extension was never added.
    pub fn set_pairing_info(&self, extension_id: &str, info: PairingInfo) -> Result<()> {
        let now = Utc::now();
        let expires = self.expiry_from(now);
        let mut extensions = self.lock();
        match extensions.get_mut(extension_id) {
            Some(record) if !record.is_expired(now) => {
                record.pairing_info = info;
                record.expires = expires;
                debug!(extension_id, "Updated pairing info");
                Ok(())
            }
            _ => Err(PairingError::not_found(extension_id)),
        }
    }

    /// Number of records held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every expired record. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }
        let now = Utc::now();
        let mut extensions = self.lock();
        let before = extensions.len();
        extensions.retain(|_, r| !r.is_expired(now));
        let removed = before - extensions.len();
        if removed > 0 {
            debug!(removed, remaining = extensions.len(), "Purged expired pairings");
        }
        removed
    }

    #[cfg(test)]
    fn record(&self, extension_id: &str) -> Option<PairingRecord> {
        self.lock().get(extension_id).cloned()
    }
}
