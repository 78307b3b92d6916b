//! Paste HTTP handlers.

use crate::{error::HttpError, extract::ApiJson, AppState};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;
use ttlpaste_core::{
    constants::TEST_NOW_HEADER,
    models::paste::{CreatedPaste, PasteView},
    naming, validation, AppError, Config,
};

/// Create a paste from `{content, ttl_seconds?, max_views?}`.
///
/// # Returns
/// `201 Created` with the new id and share link.
///
/// # Errors
/// `400` with the first validation failure; nothing is stored in that case.
pub async fn create_paste(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<CreatedPaste>), HttpError> {
    let new_paste = validation::validate_create_request(&body, state.config.max_paste_size)
        .map_err(|err| {
            tracing::debug!(field = ?err.field(), "Rejected create request: {}", err);
            err
        })?;
    let created = state.service.create(new_paste)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Serve one view of a paste.
///
/// # Errors
/// `404 Paste not found` for unknown, expired and exhausted pastes alike.
pub async fn get_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PasteView>, HttpError> {
    if !naming::looks_like_paste_id(&id) {
        return Err(AppError::NotFound.into());
    }
    let now_override = test_now_override(&state.config, &headers);
    let view = state.service.view(&id, now_override)?;
    Ok(Json(view))
}

/// Clock override from the test-mode header; ignored outside test mode.
pub(crate) fn test_now_override(config: &Config, headers: &HeaderMap) -> Option<i64> {
    if !config.test_mode {
        return None;
    }
    headers
        .get(TEST_NOW_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::test_now_override;
    use axum::http::{HeaderMap, HeaderValue};
    use ttlpaste_core::{Config, StoreBackend};

    fn config(test_mode: bool) -> Config {
        Config {
            db_path: String::from("/tmp/ttlpaste-db"),
            port: 3000,
            base_url: String::from("http://localhost:3000"),
            max_paste_size: 1024,
            store_backend: StoreBackend::Memory,
            test_mode,
            production: false,
            eviction_sweep_secs: 0,
        }
    }

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-test-now-ms", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn override_requires_test_mode() {
        let headers = headers_with("1704067200000");
        assert_eq!(
            test_now_override(&config(true), &headers),
            Some(1_704_067_200_000)
        );
        assert_eq!(test_now_override(&config(false), &headers), None);
    }

    #[test]
    fn malformed_override_is_ignored() {
        for value in ["soon", "", "12.5", "0x10"] {
            assert_eq!(
                test_now_override(&config(true), &headers_with(value)),
                None,
                "header {:?}",
                value
            );
        }
        assert_eq!(test_now_override(&config(true), &HeaderMap::new()), None);
    }
}
