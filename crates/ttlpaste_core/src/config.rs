//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_EVICTION_SWEEP_SECS, DEFAULT_MAX_PASTE_SIZE, DEFAULT_PORT};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which [`crate::store::PasteStore`] implementation to open at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Embedded redb file under `db_path`.
    #[default]
    Redb,
    /// Process-local map; contents vanish on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "redb" | "" => Ok(Self::Redb),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!(
                "unknown store backend '{}'; expected 'redb' or 'memory'",
                other
            )),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redb => f.write_str("redb"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Runtime configuration for ttlpaste.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    /// Public origin used to build share links, without trailing slash.
    pub base_url: String,
    pub max_paste_size: usize,
    pub store_backend: StoreBackend,
    /// Honour the `x-test-now-ms` clock override header.
    pub test_mode: bool,
    /// Disables the in-memory fallback when the durable store cannot open.
    pub production: bool,
    /// Seconds between eviction sweeps; `0` disables the sweeper.
    pub eviction_sweep_secs: u64,
}

fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
}

fn default_db_path() -> String {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache")
        .join("ttlpaste")
        .join("db")
        .to_string_lossy()
        .to_string()
}

/// Strip trailing slashes so `format!("{base}/p/{id}")` never doubles them.
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parsed<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|raw| raw.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unparseable numeric values fall back to defaults; an unknown
    /// `STORE_BACKEND` is logged and treated as `redb`.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let port = env_parsed("PORT").unwrap_or(DEFAULT_PORT);
        let base_url = env::var("BASE_URL")
            .or_else(|_| env::var("NEXT_PUBLIC_BASE_URL"))
            .ok()
            .map(|raw| normalize_base_url(&raw))
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", port));
        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!("{}; using redb", err);
                StoreBackend::Redb
            }),
            Err(_) => StoreBackend::default(),
        };

        Self {
            db_path: env::var("DB_PATH")
                .map(expand_tilde)
                .unwrap_or_else(|_| default_db_path()),
            port,
            base_url,
            max_paste_size: env_parsed("MAX_PASTE_SIZE").unwrap_or(DEFAULT_MAX_PASTE_SIZE),
            store_backend,
            test_mode: env_flag_enabled("TEST_MODE"),
            production: env_flag_enabled("PRODUCTION"),
            eviction_sweep_secs: env_parsed("EVICTION_SWEEP_SECS")
                .unwrap_or(DEFAULT_EVICTION_SWEEP_SECS),
        }
    }
}
