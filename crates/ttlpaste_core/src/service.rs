//! Creation and retrieval orchestration over a [`PasteStore`].

use crate::clock::Clock;
use crate::constants::MAX_VIEW_COMMIT_ATTEMPTS;
use crate::error::AppError;
use crate::lifecycle::{self, PasteState};
use crate::models::paste::{format_timestamp_ms, CreatedPaste, NewPaste, Paste, PasteView};
use crate::naming;
use crate::store::{PasteStore, SwapOutcome};
use std::sync::Arc;

/// Shared paste operations; cheap to clone behind an `Arc`.
pub struct PasteService {
    store: Arc<dyn PasteStore>,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl PasteService {
    /// Build a service over an already-opened store.
    ///
    /// # Arguments
    /// - `store`: Shared paste store.
    /// - `clock`: Time source for creation stamps and store countdowns.
    /// - `base_url`: Origin used for share links (trailing `/` ignored).
    pub fn new(store: Arc<dyn PasteStore>, clock: Arc<dyn Clock>, base_url: &str) -> Self {
        Self {
            store,
            clock,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The underlying store, e.g. for the eviction sweeper.
    pub fn store(&self) -> &Arc<dyn PasteStore> {
        &self.store
    }

    /// Share link for `id`.
    pub fn share_url(&self, id: &str) -> String {
        format!("{}/p/{}", self.base_url, id)
    }

    /// Persist a new paste under a fresh id.
    ///
    /// The store receives `ttl_seconds` as its eviction hint so it can drop the
    /// key on its own once the paste can no longer be served.
    ///
    /// # Returns
    /// The new id and its share link.
    ///
    /// # Errors
    /// Propagates storage failures; nothing is returned unless the write
    /// succeeded.
    pub fn create(&self, new: NewPaste) -> Result<CreatedPaste, AppError> {
        let id = naming::generate_paste_id();
        let ttl_seconds = new.ttl_seconds;
        let paste = Paste::new(id.clone(), new, self.clock.now_ms());
        self.store.put(&id, &paste, ttl_seconds)?;
        tracing::debug!(
            paste_id = %id,
            ttl_seconds = ?paste.ttl_seconds,
            max_views = ?paste.max_views,
            "Created paste"
        );
        Ok(CreatedPaste {
            url: self.share_url(&id),
            id,
        })
    }

    /// Serve one view of a paste and count it.
    ///
    /// Availability is judged at `now_override` when given (test mode), else
    /// at the clock's time. The store countdown is always recomputed from the
    /// real clock so it keeps tracking the original deadline.
    ///
    /// The increment is committed with a conditional write keyed on the
    /// `views_count` that was evaluated; if another request got there first
    /// the whole load/evaluate/commit cycle runs again, so a view budget can
    /// never be overshot.
    ///
    /// # Returns
    /// Content plus remaining views and deadline.
    ///
    /// # Errors
    /// - [`AppError::NotFound`] when the paste is absent, expired, exhausted,
    ///   or fails the remaining-views consistency check.
    /// - [`AppError::StorageUnavailable`] when the store keeps losing the race
    ///   or fails outright.
    pub fn view(&self, id: &str, now_override: Option<i64>) -> Result<PasteView, AppError> {
        for attempt in 1..=MAX_VIEW_COMMIT_ATTEMPTS {
            let Some(paste) = self.store.get(id)? else {
                return Err(AppError::NotFound);
            };

            let evaluated_at = now_override.unwrap_or_else(|| self.clock.now_ms());
            if let PasteState::Expired(reason) = lifecycle::evaluate(&paste, evaluated_at) {
                tracing::debug!(paste_id = %id, ?reason, "Paste unavailable");
                return Err(AppError::NotFound);
            }

            let next = lifecycle::record_view(&paste);
            let ttl_seconds = lifecycle::next_ttl_seconds(&paste, self.clock.now_ms());
            match self
                .store
                .compare_and_put(id, paste.views_count, &next, ttl_seconds)?
            {
                SwapOutcome::Stored => return Self::render_view(id, paste),
                SwapOutcome::Missing => return Err(AppError::NotFound),
                SwapOutcome::Changed => {
                    tracing::debug!(paste_id = %id, attempt, "View raced another view; retrying");
                }
            }
        }

        tracing::warn!(
            paste_id = %id,
            "Gave up recording view after {} attempts",
            MAX_VIEW_COMMIT_ATTEMPTS
        );
        Err(AppError::StorageUnavailable(format!(
            "view of paste '{}' could not be recorded",
            id
        )))
    }

    /// Build the response from the record as it was evaluated (pre-increment).
    fn render_view(id: &str, paste: Paste) -> Result<PasteView, AppError> {
        let remaining_views = lifecycle::remaining_views(&paste);
        if remaining_views.is_some_and(|remaining| remaining < 0) {
            tracing::debug!(paste_id = %id, "Negative remaining views; treating as not found");
            return Err(AppError::NotFound);
        }
        Ok(PasteView {
            expires_at: paste.expires_at.map(format_timestamp_ms),
            remaining_views,
            content: paste.content,
        })
    }

    /// Whether the store currently answers.
    pub fn healthy(&self) -> bool {
        match self.store.ping() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Paste store health check failed: {}", err);
                false
            }
        }
    }
}
