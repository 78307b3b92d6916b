//! HTTP server wiring for ttlpaste (API, handlers, and shared state).

/// HTTP error mapping for API handlers.
pub mod error;
/// JSON extractor with API-shaped rejections.
pub mod extract;
/// HTTP handlers for paste and health endpoints.
pub mod handlers;
/// Periodic eviction of expired store keys.
pub mod sweeper;

pub use ttlpaste_core::{
    config, models, naming, AppError, Clock, Config, PasteService, PasteStore, SystemClock,
    DEFAULT_PORT,
};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue},
    routing::{get, post},
    Router,
};
use hyper::Method;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use ttlpaste_core::constants::TEST_NOW_HEADER;

/// Room for the JSON envelope and escaping around `max_paste_size` bytes of
/// content.
const BODY_LIMIT_ALLOWANCE: usize = 64 * 1024;

const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'none'";

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PasteService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Construct shared application state on the system clock.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `store`: Store selected at startup.
    ///
    /// # Returns
    /// A new [`AppState`].
    pub fn new(config: Config, store: Arc<dyn PasteStore>) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Construct shared application state with an explicit clock.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `store`: Store selected at startup.
    /// - `clock`: Time source for creation stamps and store countdowns.
    ///
    /// # Returns
    /// A new [`AppState`] whose service reads time from `clock`.
    pub fn with_clock(config: Config, store: Arc<dyn PasteStore>, clock: Arc<dyn Clock>) -> Self {
        let service = PasteService::new(store, clock, &config.base_url);
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware.
///
/// # Arguments
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
///
/// # Returns
/// Configured `axum::Router`.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let cors_port = state.config.port;
    create_app_with_cors_port(state, allow_public_access, cors_port)
}

/// Resolve the listener address from env var overrides and security policy.
///
/// # Arguments
/// - `config`: Server configuration containing the configured `port`.
/// - `allow_public_access`: Whether non-loopback bind targets are permitted.
///
/// # Returns
/// A validated socket address that enforces loopback when public access is disabled.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match std::env::var("BIND") {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

/// Origins allowed when public access is off: loopback on the listener port
/// plus the configured share-link origin.
fn local_origins(config: &Config, cors_port: u16) -> Vec<HeaderValue> {
    [
        format!("http://localhost:{}", cors_port),
        format!("http://127.0.0.1:{}", cors_port),
        config.base_url.clone(),
    ]
    .into_iter()
    .filter_map(|origin| HeaderValue::from_str(&origin).ok())
    .collect()
}

fn cors_layer(config: &Config, allow_public_access: bool, cors_port: u16) -> CorsLayer {
    let methods = [Method::GET, Method::POST];
    if allow_public_access {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let mut allowed_headers = vec![header::CONTENT_TYPE, header::ACCEPT];
    if config.test_mode {
        allowed_headers.push(HeaderName::from_static(TEST_NOW_HEADER));
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(local_origins(config, cors_port)))
        .allow_methods(methods)
        .allow_headers(AllowHeaders::list(allowed_headers))
}

fn create_app_with_cors_port(state: AppState, allow_public_access: bool, cors_port: u16) -> Router {
    let cors = cors_layer(&state.config, allow_public_access, cors_port);
    let body_limit = state
        .config
        .max_paste_size
        .saturating_add(BODY_LIMIT_ALLOWANCE);

    Router::new()
        .route("/api/pastes", post(handlers::paste::create_paste))
        .route("/api/pastes/:id", get(handlers::paste::get_paste))
        .route("/api/healthz", get(handlers::health::healthz))
        .with_state(state)
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors)
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(CONTENT_SECURITY_POLICY),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                )),
        )
}

fn listener_cors_port(listener: &tokio::net::TcpListener, fallback_port: u16) -> u16 {
    listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(fallback_port)
}

/// Run the Axum server with graceful shutdown support.
///
/// # Arguments
/// - `listener`: Bound TCP listener for the server.
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
/// - `shutdown_signal`: Future that resolves when shutdown should start.
///
/// # Returns
/// `Ok(())` when the server exits cleanly.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let cors_port = listener_cors_port(&listener, state.config.port);
    let app = create_app_with_cors_port(state, allow_public_access, cors_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
