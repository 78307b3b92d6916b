//! Paste persistence: one serialized record per `paste:<id>` key, with a
//! per-key eviction deadline emulating a store-native ttl.
//!
//! Two backends implement [`PasteStore`]: [`RedbStore`] (durable, file-backed)
//! and [`MemoryStore`] (process-local). Both encode records with bincode and
//! read "now" from an injected [`Clock`], so eviction behaves identically.
//! Which one runs is decided once at startup by [`open_store`].

mod memory;
mod redb_store;
mod tables;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::clock::Clock;
use crate::config::{Config, StoreBackend};
use crate::constants::PASTE_KEY_PREFIX;
use crate::error::AppError;
use crate::models::paste::Paste;
use std::sync::Arc;

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The stored record matched and was replaced.
    Stored,
    /// The stored record changed since it was read; nothing was written.
    Changed,
    /// No live record under the key (never written or evicted).
    Missing,
}

/// Key-value persistence for paste records.
///
/// Implementations must be safe to share across concurrent requests.
pub trait PasteStore: Send + Sync {
    /// Store `paste` under its id, replacing any previous value.
    ///
    /// `ttl_seconds` arms store-level eviction that many seconds from now;
    /// `None` clears any deadline so the key persists.
    fn put(&self, id: &str, paste: &Paste, ttl_seconds: Option<u64>) -> Result<(), AppError>;

    /// Load the last stored record, or `None` if absent or evicted.
    fn get(&self, id: &str) -> Result<Option<Paste>, AppError>;

    /// Replace the record only if its stored `views_count` still equals
    /// `expected_views`, as one atomic step.
    fn compare_and_put(
        &self,
        id: &str,
        expected_views: u64,
        paste: &Paste,
        ttl_seconds: Option<u64>,
    ) -> Result<SwapOutcome, AppError>;

    /// Physically drop keys whose eviction deadline has passed.
    ///
    /// # Returns
    /// Number of keys removed.
    fn purge_evicted(&self) -> Result<usize, AppError>;

    /// Verify the backend can serve requests.
    fn ping(&self) -> Result<(), AppError>;

    /// Short backend label for logs.
    fn backend_name(&self) -> &'static str;
}

/// Namespaced storage key for a paste id.
pub fn storage_key(id: &str) -> String {
    format!("{}{}", PASTE_KEY_PREFIX, id)
}

/// Absolute eviction deadline for a ttl hint given at `now_ms`.
pub(crate) fn eviction_deadline(now_ms: i64, ttl_seconds: Option<u64>) -> Option<i64> {
    ttl_seconds.map(|ttl| {
        let ttl_ms = i64::try_from(ttl).unwrap_or(i64::MAX).saturating_mul(1000);
        now_ms.saturating_add(ttl_ms)
    })
}

/// A key is gone once `now` is strictly past its deadline.
pub(crate) fn is_evicted(deadline: Option<i64>, now_ms: i64) -> bool {
    deadline.is_some_and(|deadline| now_ms > deadline)
}

pub(crate) fn encode_record(paste: &Paste) -> Result<Vec<u8>, AppError> {
    Ok(bincode::serialize(paste)?)
}

pub(crate) fn decode_record(bytes: &[u8]) -> Result<Paste, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Open the store selected by `config`.
///
/// When the durable store cannot be opened outside production, a warning is
/// logged and an in-memory store is used instead; in production the error is
/// returned.
///
/// # Errors
/// Returns the durable store's open error in production.
pub fn open_store(config: &Config, clock: Arc<dyn Clock>) -> Result<Arc<dyn PasteStore>, AppError> {
    match config.store_backend {
        StoreBackend::Memory => {
            if config.production {
                tracing::warn!(
                    "In-memory paste store selected in production; pastes will not survive restarts"
                );
            }
            Ok(Arc::new(MemoryStore::new(clock)))
        }
        StoreBackend::Redb => match RedbStore::open(&config.db_path, clock.clone()) {
            Ok(store) => Ok(Arc::new(store)),
            Err(err) if !config.production => {
                tracing::warn!(
                    "Paste store at {} unavailable ({}); using in-memory fallback",
                    config.db_path,
                    err
                );
                Ok(Arc::new(MemoryStore::new(clock)))
            }
            Err(err) => Err(err),
        },
    }
}

#[cfg(test)]
mod tests;
