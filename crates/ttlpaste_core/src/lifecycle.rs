//! Pure availability and view-accounting rules for pastes.
//!
//! Nothing here performs I/O or reads the clock; callers pass `now_ms` and
//! commit whatever next state these functions compute.
//!
//! A paste is either [`PasteState::Valid`] or [`PasteState::Expired`]. Expiry
//! is terminal: `expires_at` never moves and `views_count` never decreases,
//! so once either rule trips it stays tripped.

use crate::models::paste::Paste;

/// Why a paste stopped being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryReason {
    /// `now` passed `expires_at`.
    TimeElapsed,
    /// `views_count` reached `max_views`.
    ViewsExhausted,
}

/// Availability of a paste at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteState {
    Valid,
    Expired(ExpiryReason),
}

/// Evaluate a paste at `now_ms`.
///
/// The deadline instant itself is still valid (`now > expires_at` expires).
/// The view that would exceed the budget is never valid, so the `max_views`-th
/// view is the last one served. Time is checked before the view budget.
pub fn evaluate(paste: &Paste, now_ms: i64) -> PasteState {
    if let Some(expires_at) = paste.expires_at {
        if now_ms > expires_at {
            return PasteState::Expired(ExpiryReason::TimeElapsed);
        }
    }
    if let Some(max_views) = paste.max_views {
        if paste.views_count >= max_views {
            return PasteState::Expired(ExpiryReason::ViewsExhausted);
        }
    }
    PasteState::Valid
}

/// `true` when [`evaluate`] yields [`PasteState::Valid`].
#[inline]
pub fn is_available(paste: &Paste, now_ms: i64) -> bool {
    evaluate(paste, now_ms) == PasteState::Valid
}

/// Views left after the one currently being served.
///
/// Computed from the record as it was evaluated, i.e. before its increment.
/// The result can be negative when the record was already exhausted; callers
/// must answer not-found in that case rather than report it.
///
/// # Returns
/// `None` when the paste has no view budget.
pub fn remaining_views(paste: &Paste) -> Option<i64> {
    paste.max_views.map(|max_views| {
        let max_views = i64::try_from(max_views).unwrap_or(i64::MAX);
        let views = i64::try_from(paste.views_count).unwrap_or(i64::MAX);
        max_views.saturating_sub(views).saturating_sub(1)
    })
}

/// Store-level eviction countdown that keeps tracking the original deadline.
///
/// `max(1, ttl_seconds - floor((now_ms - created_at) / 1000))`. The floor of 1
/// keeps the store from ever receiving a non-positive ttl.
///
/// # Returns
/// `None` when the paste was created without a ttl.
pub fn next_ttl_seconds(paste: &Paste, now_ms: i64) -> Option<u64> {
    paste.ttl_seconds.map(|ttl| {
        let elapsed_secs = now_ms.saturating_sub(paste.created_at).div_euclid(1000);
        let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);
        // Cannot be below 1 here, so the cast is lossless.
        ttl.saturating_sub(elapsed_secs).max(1) as u64
    })
}

/// Next persisted state after serving one view.
pub fn record_view(paste: &Paste) -> Paste {
    Paste {
        views_count: paste.views_count.saturating_add(1),
        ..paste.clone()
    }
}
