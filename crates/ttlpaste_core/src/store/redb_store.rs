//! Durable paste store backed by an embedded redb file.

use super::tables::{PASTES, PASTE_EVICTIONS};
use super::{
    decode_record, encode_record, eviction_deadline, is_evicted, storage_key, PasteStore,
    SwapOutcome,
};
use crate::clock::Clock;
use crate::constants::REDB_FILE_NAME;
use crate::error::AppError;
use crate::models::paste::Paste;
use redb::{ReadableDatabase, ReadableTable, WriteTransaction};
use std::path::Path;
use std::sync::Arc;

/// redb has no native key expiry, so deadlines live in a side table and are
/// enforced on read and by [`PasteStore::purge_evicted`].
pub struct RedbStore {
    db: Arc<redb::Database>,
    clock: Arc<dyn Clock>,
}

impl RedbStore {
    /// Open (or create) the store under the `db_path` directory.
    ///
    /// # Returns
    /// A store with both tables initialized.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or redb fails to
    /// open the file (for example when another process holds it).
    pub fn open(db_path: &str, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let dir = Path::new(db_path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageUnavailable(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;
        let db = redb::Database::create(dir.join(REDB_FILE_NAME))?;

        let write_txn = db.begin_write()?;
        write_txn.open_table(PASTES)?;
        write_txn.open_table(PASTE_EVICTIONS)?;
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(db),
            clock,
        })
    }

    /// Read the live record for `key` inside a write transaction.
    fn live_record(&self, txn: &WriteTransaction, key: &str) -> Result<Option<Paste>, AppError> {
        let evictions = txn.open_table(PASTE_EVICTIONS)?;
        let deadline = evictions.get(key)?.map(|guard| guard.value());
        if is_evicted(deadline, self.clock.now_ms()) {
            return Ok(None);
        }
        let pastes = txn.open_table(PASTES)?;
        let record = match pastes.get(key)? {
            Some(guard) => Some(decode_record(guard.value())?),
            None => None,
        };
        Ok(record)
    }

    fn write_record(
        &self,
        txn: &WriteTransaction,
        key: &str,
        paste: &Paste,
        ttl_seconds: Option<u64>,
    ) -> Result<(), AppError> {
        let encoded = encode_record(paste)?;
        let mut pastes = txn.open_table(PASTES)?;
        let mut evictions = txn.open_table(PASTE_EVICTIONS)?;
        pastes.insert(key, encoded.as_slice())?;
        match eviction_deadline(self.clock.now_ms(), ttl_seconds) {
            Some(deadline) => {
                evictions.insert(key, deadline)?;
            }
            None => {
                evictions.remove(key)?;
            }
        }
        Ok(())
    }
}

impl PasteStore for RedbStore {
    fn put(&self, id: &str, paste: &Paste, ttl_seconds: Option<u64>) -> Result<(), AppError> {
        let key = storage_key(id);
        let write_txn = self.db.begin_write()?;
        self.write_record(&write_txn, &key, paste, ttl_seconds)?;
        write_txn.commit()?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Paste>, AppError> {
        let key = storage_key(id);
        let read_txn = self.db.begin_read()?;
        let evictions = read_txn.open_table(PASTE_EVICTIONS)?;
        let deadline = evictions.get(key.as_str())?.map(|guard| guard.value());
        if is_evicted(deadline, self.clock.now_ms()) {
            return Ok(None);
        }
        let pastes = read_txn.open_table(PASTES)?;
        match pastes.get(key.as_str())? {
            Some(guard) => Ok(Some(decode_record(guard.value())?)),
            None => Ok(None),
        }
    }

    fn compare_and_put(
        &self,
        id: &str,
        expected_views: u64,
        paste: &Paste,
        ttl_seconds: Option<u64>,
    ) -> Result<SwapOutcome, AppError> {
        let key = storage_key(id);
        let write_txn = self.db.begin_write()?;
        let outcome = match self.live_record(&write_txn, &key)? {
            None => SwapOutcome::Missing,
            Some(current) if current.views_count != expected_views => SwapOutcome::Changed,
            Some(_) => {
                self.write_record(&write_txn, &key, paste, ttl_seconds)?;
                SwapOutcome::Stored
            }
        };
        if outcome == SwapOutcome::Stored {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(outcome)
    }

    fn purge_evicted(&self) -> Result<usize, AppError> {
        let now_ms = self.clock.now_ms();
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut evictions = write_txn.open_table(PASTE_EVICTIONS)?;
            let mut pastes = write_txn.open_table(PASTES)?;

            let mut expired_keys = Vec::new();
            for item in evictions.iter()? {
                let (key, deadline) = item?;
                if is_evicted(Some(deadline.value()), now_ms) {
                    expired_keys.push(key.value().to_string());
                }
            }
            for key in &expired_keys {
                evictions.remove(key.as_str())?;
                pastes.remove(key.as_str())?;
            }
            expired_keys.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    fn ping(&self) -> Result<(), AppError> {
        let read_txn = self.db.begin_read()?;
        read_txn.open_table(PASTES)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redb"
    }
}
