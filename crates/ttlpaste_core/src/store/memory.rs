//! Process-local paste store.
//!
//! Substitute for the durable store in development and tests. Records are
//! kept bincode-encoded, exactly as [`super::RedbStore`] persists them, so a
//! round-trip through either backend yields the same values.

use super::{
    decode_record, encode_record, eviction_deadline, is_evicted, storage_key, PasteStore,
    SwapOutcome,
};
use crate::clock::Clock;
use crate::error::AppError;
use crate::models::paste::Paste;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

struct Entry {
    bytes: Vec<u8>,
    evict_at_ms: Option<i64>,
}

/// Mutex-guarded map from storage key to encoded record.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, AppError> {
        self.entries.lock().map_err(|_| {
            AppError::StorageUnavailable("in-memory paste store is poisoned".to_string())
        })
    }

    /// Remove `key` if its deadline passed and return what is still live.
    fn live_entry<'a>(
        entries: &'a mut HashMap<String, Entry>,
        key: &str,
        now_ms: i64,
    ) -> Option<&'a Entry> {
        if entries
            .get(key)
            .is_some_and(|entry| is_evicted(entry.evict_at_ms, now_ms))
        {
            entries.remove(key);
        }
        entries.get(key)
    }

    fn entry_for(&self, paste: &Paste, ttl_seconds: Option<u64>) -> Result<Entry, AppError> {
        Ok(Entry {
            bytes: encode_record(paste)?,
            evict_at_ms: eviction_deadline(self.clock.now_ms(), ttl_seconds),
        })
    }
}

impl PasteStore for MemoryStore {
    fn put(&self, id: &str, paste: &Paste, ttl_seconds: Option<u64>) -> Result<(), AppError> {
        let entry = self.entry_for(paste, ttl_seconds)?;
        self.entries()?.insert(storage_key(id), entry);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Paste>, AppError> {
        let now_ms = self.clock.now_ms();
        let key = storage_key(id);
        let mut entries = self.entries()?;
        let record = Self::live_entry(&mut entries, &key, now_ms)
            .map(|entry| decode_record(&entry.bytes))
            .transpose()?;
        Ok(record)
    }

    fn compare_and_put(
        &self,
        id: &str,
        expected_views: u64,
        paste: &Paste,
        ttl_seconds: Option<u64>,
    ) -> Result<SwapOutcome, AppError> {
        let key = storage_key(id);
        let replacement = self.entry_for(paste, ttl_seconds)?;
        let now_ms = self.clock.now_ms();
        let mut entries = self.entries()?;

        let current = match Self::live_entry(&mut entries, &key, now_ms) {
            Some(entry) => decode_record(&entry.bytes)?,
            None => return Ok(SwapOutcome::Missing),
        };
        if current.views_count != expected_views {
            return Ok(SwapOutcome::Changed);
        }
        entries.insert(key, replacement);
        Ok(SwapOutcome::Stored)
    }

    fn purge_evicted(&self) -> Result<usize, AppError> {
        let now_ms = self.clock.now_ms();
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|_, entry| !is_evicted(entry.evict_at_ms, now_ms));
        Ok(before - entries.len())
    }

    fn ping(&self) -> Result<(), AppError> {
        self.entries().map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
