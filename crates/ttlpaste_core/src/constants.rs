//! Shared constants used across ttlpaste crates.

/// Default API port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default maximum paste size accepted by the API layer.
pub const DEFAULT_MAX_PASTE_SIZE: usize = 10 * 1024 * 1024;

/// Largest accepted `ttl_seconds` (about 31,700 years), so every deadline
/// stays within the renderable timestamp range.
pub const MAX_TTL_SECONDS: u64 = 1_000_000_000_000;

/// Default interval between store eviction sweeps, in seconds.
pub const DEFAULT_EVICTION_SWEEP_SECS: u64 = 60;

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:3000";

/// Namespace prefix for persisted paste keys.
pub const PASTE_KEY_PREFIX: &str = "paste:";

/// Length of generated paste ids.
pub const PASTE_ID_LEN: usize = 12;

/// Upper bound on load/evaluate/commit cycles for one view before giving up.
pub const MAX_VIEW_COMMIT_ATTEMPTS: usize = 8;

/// Request header carrying the test-mode clock override (ms since epoch).
pub const TEST_NOW_HEADER: &str = "x-test-now-ms";

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";
