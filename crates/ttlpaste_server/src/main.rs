//! Headless API server entrypoint.

use std::sync::Arc;
use std::time::Duration;
use ttlpaste_core::{open_store, DEFAULT_PORT};
use ttlpaste_server::sweeper::spawn_eviction_sweeper;
use ttlpaste_server::{config::Config, serve_router, AppState, SystemClock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    purge_evicted: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            "--purge-evicted" => flags.purge_evicted = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttlpaste=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    let store = open_store(&config, Arc::new(SystemClock))?;
    tracing::info!("Paste store: {}", store.backend_name());

    if cli_flags.purge_evicted {
        let removed = store.purge_evicted()?;
        println!("Removed {} evicted paste key(s)", removed);
        return Ok(());
    }

    if config.test_mode {
        tracing::warn!("TEST_MODE enabled - x-test-now-ms overrides the availability clock");
    }

    let sweeper = spawn_eviction_sweeper(
        store.clone(),
        Duration::from_secs(config.eviction_sweep_secs),
    );
    let state = AppState::new(config.clone(), store);

    let allow_public = ttlpaste_server::config::env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_addr = ttlpaste_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("ttlpaste running at http://{}", actual_addr);
    tracing::info!("Share links use {}", config.base_url);

    let serve_result = serve_router(listener, state, allow_public, shutdown_signal()).await;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    tracing::info!("ttlpaste stopped");

    serve_result?;

    Ok(())
}

fn print_help() {
    println!("ttlpaste server\n");
    println!("Usage: ttlpaste [OPTIONS]\n");
    println!("Options:");
    println!("  --purge-evicted   Remove expired store keys once and exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database directory (default: ~/.cache/ttlpaste/db)");
    println!(
        "  PORT              Server port (default: {})",
        DEFAULT_PORT
    );
    println!("  BASE_URL          Origin for share links (alias: NEXT_PUBLIC_BASE_URL)");
    println!("  MAX_PASTE_SIZE    Maximum paste size in bytes (default: 10MB)");
    println!("  STORE_BACKEND     redb | memory (default: redb)");
    println!("  PRODUCTION        Fail instead of falling back to the in-memory store");
    println!("  TEST_MODE         Honour the x-test-now-ms clock override header");
    println!("  EVICTION_SWEEP_SECS  Seconds between eviction sweeps, 0 disables (default: 60)");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
