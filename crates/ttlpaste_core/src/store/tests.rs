//! Behaviour shared by every [`PasteStore`] backend.

use super::*;
use crate::clock::ManualClock;
use crate::models::paste::NewPaste;
use std::sync::Barrier;
use std::thread;
use tempfile::TempDir;

const T0: i64 = 1_700_000_000_000;

struct Backend {
    store: Arc<dyn PasteStore>,
    clock: Arc<ManualClock>,
    _dir: Option<TempDir>,
}

fn memory_backend() -> Backend {
    let clock = Arc::new(ManualClock::new(T0));
    Backend {
        store: Arc::new(MemoryStore::new(clock.clone())),
        clock,
        _dir: None,
    }
}

fn redb_backend() -> Backend {
    let clock = Arc::new(ManualClock::new(T0));
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("db");
    let store = RedbStore::open(db_path.to_str().expect("db path"), clock.clone()).expect("open");
    Backend {
        store: Arc::new(store),
        clock,
        _dir: Some(dir),
    }
}

fn backends() -> Vec<Backend> {
    vec![memory_backend(), redb_backend()]
}

fn sample(id: &str, ttl_seconds: Option<u64>) -> Paste {
    Paste::new(
        id.to_string(),
        NewPaste {
            content: "<script>alert('x')</script>\n  spaced  ".to_string(),
            ttl_seconds,
            max_views: Some(5),
        },
        T0,
    )
}

#[test]
fn storage_key_is_namespaced() {
    assert_eq!(storage_key("abc"), "paste:abc");
}

#[test]
fn get_returns_what_put_stored() {
    for backend in backends() {
        let name = backend.store.backend_name();
        let paste = sample("roundtrip", None);
        backend.store.put("roundtrip", &paste, None).expect("put");
        let loaded = backend.store.get("roundtrip").expect("get");
        assert_eq!(loaded.as_ref(), Some(&paste), "backend {}", name);
        assert_eq!(backend.store.get("missing").expect("get"), None, "backend {}", name);
    }
}

#[test]
fn ttl_hint_evicts_strictly_after_deadline() {
    for backend in backends() {
        let name = backend.store.backend_name();
        let paste = sample("ttl", Some(2));
        backend.store.put("ttl", &paste, Some(2)).expect("put");

        backend.clock.set(T0 + 2_000);
        assert!(backend.store.get("ttl").expect("get").is_some(), "backend {}", name);

        backend.clock.set(T0 + 2_001);
        assert!(backend.store.get("ttl").expect("get").is_none(), "backend {}", name);
    }
}

#[test]
fn put_without_ttl_clears_previous_deadline() {
    for backend in backends() {
        let paste = sample("sticky", None);
        backend.store.put("sticky", &paste, Some(1)).expect("put with ttl");
        backend.store.put("sticky", &paste, None).expect("put without ttl");
        backend.clock.advance(3_600_000);
        assert!(
            backend.store.get("sticky").expect("get").is_some(),
            "backend {}",
            backend.store.backend_name()
        );
    }
}

#[test]
fn rewrite_with_recomputed_ttl_moves_the_countdown() {
    for backend in backends() {
        let name = backend.store.backend_name();
        let paste = sample("countdown", Some(10));
        backend.store.put("countdown", &paste, Some(10)).expect("put");

        backend.clock.set(T0 + 4_000);
        backend.store.put("countdown", &paste, Some(6)).expect("rewrite");

        backend.clock.set(T0 + 10_000);
        assert!(backend.store.get("countdown").expect("get").is_some(), "backend {}", name);
        backend.clock.set(T0 + 10_001);
        assert!(backend.store.get("countdown").expect("get").is_none(), "backend {}", name);
    }
}

#[test]
fn compare_and_put_only_applies_to_expected_version() {
    for backend in backends() {
        let name = backend.store.backend_name();
        let paste = sample("cas", None);
        backend.store.put("cas", &paste, None).expect("put");

        let mut next = paste.clone();
        next.views_count = 1;
        assert_eq!(
            backend.store.compare_and_put("cas", 0, &next, None).expect("cas"),
            SwapOutcome::Stored,
            "backend {}",
            name
        );
        assert_eq!(
            backend.store.compare_and_put("cas", 0, &next, None).expect("cas"),
            SwapOutcome::Changed,
            "backend {}",
            name
        );
        assert_eq!(
            backend.store.compare_and_put("absent", 0, &next, None).expect("cas"),
            SwapOutcome::Missing,
            "backend {}",
            name
        );
        let stored = backend.store.get("cas").expect("get").expect("present");
        assert_eq!(stored.views_count, 1, "backend {}", name);
    }
}

#[test]
fn compare_and_put_treats_evicted_key_as_missing() {
    for backend in backends() {
        let paste = sample("gone", Some(1));
        backend.store.put("gone", &paste, Some(1)).expect("put");
        backend.clock.advance(1_001);
        assert_eq!(
            backend.store.compare_and_put("gone", 0, &paste, Some(1)).expect("cas"),
            SwapOutcome::Missing,
            "backend {}",
            backend.store.backend_name()
        );
    }
}

#[test]
fn purge_removes_only_evicted_keys() {
    for backend in backends() {
        let name = backend.store.backend_name();
        backend.store.put("short", &sample("short", Some(1)), Some(1)).expect("put");
        backend.store.put("long", &sample("long", Some(60)), Some(60)).expect("put");
        backend.store.put("forever", &sample("forever", None), None).expect("put");

        assert_eq!(backend.store.purge_evicted().expect("purge"), 0, "backend {}", name);
        backend.clock.advance(5_000);
        assert_eq!(backend.store.purge_evicted().expect("purge"), 1, "backend {}", name);
        assert!(backend.store.get("long").expect("get").is_some());
        assert!(backend.store.get("forever").expect("get").is_some());
        assert_eq!(backend.store.purge_evicted().expect("purge"), 0, "backend {}", name);
    }
}

#[test]
fn concurrent_swaps_on_same_version_commit_once() {
    for backend in backends() {
        let name = backend.store.backend_name();
        let paste = sample("race", None);
        backend.store.put("race", &paste, None).expect("put");

        let workers = 8;
        let barrier = Arc::new(Barrier::new(workers));
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let store = backend.store.clone();
                let barrier = barrier.clone();
                let mut next = paste.clone();
                next.views_count = 1;
                thread::spawn(move || {
                    barrier.wait();
                    store.compare_and_put("race", 0, &next, None).expect("cas")
                })
            })
            .collect();

        let stored = handles
            .into_iter()
            .map(|handle| handle.join().expect("worker join"))
            .filter(|outcome| *outcome == SwapOutcome::Stored)
            .count();
        assert_eq!(stored, 1, "backend {}", name);
    }
}

#[test]
fn redb_store_survives_reopen() {
    let clock: Arc<ManualClock> = Arc::new(ManualClock::new(T0));
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("db");
    let db_path = db_path.to_str().expect("db path");
    let paste = sample("durable", Some(30));
    {
        let store = RedbStore::open(db_path, clock.clone()).expect("open");
        store.put("durable", &paste, Some(30)).expect("put");
    }
    let reopened = RedbStore::open(db_path, clock.clone()).expect("reopen");
    assert_eq!(reopened.get("durable").expect("get"), Some(paste));
    clock.advance(30_001);
    assert_eq!(reopened.get("durable").expect("get"), None);
}

#[test]
fn open_store_falls_back_to_memory_outside_production() {
    let dir = TempDir::new().expect("temp dir");
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file in the way").expect("write blocker");
    let mut config = test_config(blocker.join("db").to_string_lossy().to_string());

    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(T0));
    let store = open_store(&config, clock.clone()).expect("fallback store");
    assert_eq!(store.backend_name(), "memory");

    config.production = true;
    let err = open_store(&config, clock).err().expect("production must fail");
    assert!(err.is_storage_unavailable());
}

#[test]
fn open_store_honours_explicit_backend() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = test_config(dir.path().join("db").to_string_lossy().to_string());
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(T0));

    assert_eq!(open_store(&config, clock.clone()).expect("redb").backend_name(), "redb");
    config.store_backend = StoreBackend::Memory;
    assert_eq!(open_store(&config, clock).expect("memory").backend_name(), "memory");
}

fn test_config(db_path: String) -> Config {
    Config {
        db_path,
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        max_paste_size: 1024,
        store_backend: StoreBackend::Redb,
        test_mode: false,
        production: false,
        eviction_sweep_secs: 0,
    }
}
