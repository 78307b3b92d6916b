//! Core domain library for ttlpaste (paste lifecycle, storage, validation).

/// Wall-clock abstraction used by storage and retrieval.
pub mod clock;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Process-global environment helpers for tests and tooling.
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Availability and view accounting rules.
pub mod lifecycle;
/// Data models for API requests and persistence.
pub mod models;
/// Paste identifier generation.
pub mod naming;
/// Creation and retrieval orchestration.
pub mod service;
/// Paste store trait and backends.
pub mod store;
/// Creation request validation.
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, StoreBackend};
pub use constants::{DEFAULT_CLI_SERVER_URL, DEFAULT_PORT};
pub use error::AppError;
pub use service::PasteService;
pub use store::{open_store, MemoryStore, PasteStore, RedbStore, SwapOutcome};
pub use validation::ValidationError;
