//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use ttlpaste_core::{open_store, ManualClock, MemoryStore, StoreBackend};
use ttlpaste_server::{create_app, AppState, Config};

/// 2024-01-01T00:00:00Z
pub(crate) const T0: i64 = 1_704_067_200_000;

pub(crate) fn test_config(test_mode: bool) -> Config {
    Config {
        db_path: String::from("/nonexistent/ttlpaste-test"),
        port: 0,
        base_url: String::from("http://paste.test"),
        max_paste_size: 10_000,
        store_backend: StoreBackend::Memory,
        test_mode,
        production: false,
        eviction_sweep_secs: 0,
    }
}

pub(crate) fn test_server_for_config(config: Config) -> (TestServer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let store = Arc::new(MemoryStore::new(clock.clone()));
    let state = AppState::with_clock(config, store, clock.clone());
    let server = TestServer::new(create_app(state, false)).expect("server");
    (server, clock)
}

/// Test-mode server over an in-memory store with a hand-driven clock.
pub(crate) fn setup_test_server() -> (TestServer, Arc<ManualClock>) {
    test_server_for_config(test_config(true))
}

/// Server over a redb store in a fresh temp dir.
pub(crate) fn setup_redb_server(db_dir: &Path) -> (TestServer, Arc<ManualClock>) {
    let mut config = test_config(true);
    config.db_path = db_dir.to_str().expect("db path").to_string();
    config.store_backend = StoreBackend::Redb;
    config.production = true;

    let clock = Arc::new(ManualClock::new(T0));
    let store = open_store(&config, clock.clone()).expect("open redb store");
    assert_eq!(store.backend_name(), "redb");
    let state = AppState::with_clock(config, store, clock.clone());
    let server = TestServer::new(create_app(state, false)).expect("server");
    (server, clock)
}

pub(crate) fn temp_db_dir() -> TempDir {
    TempDir::new().expect("temp dir")
}
