//! redb table definitions for the paste store.

use redb::TableDefinition;

/// Serialized paste records keyed by `paste:<id>`.
pub(super) const PASTES: TableDefinition<&str, &[u8]> = TableDefinition::new("pastes");

/// Eviction deadlines (ms since epoch) for keys written with a ttl hint.
pub(super) const PASTE_EVICTIONS: TableDefinition<&str, i64> =
    TableDefinition::new("paste_evictions");
