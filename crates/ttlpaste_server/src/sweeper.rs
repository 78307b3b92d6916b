//! Background removal of keys past their eviction deadline.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use ttlpaste_core::PasteStore;

/// Spawn a task that calls [`PasteStore::purge_evicted`] every `period`.
///
/// # Returns
/// The task handle, or `None` when `period` is zero (sweeping disabled).
pub fn spawn_eviction_sweeper(
    store: Arc<dyn PasteStore>,
    period: Duration,
) -> Option<JoinHandle<()>> {
    if period.is_zero() {
        tracing::info!("Eviction sweeper disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sweep_once(store.as_ref());
        }
    }))
}

/// Run one sweep, logging instead of failing.
///
/// # Returns
/// Number of keys removed (`0` when the sweep failed).
pub fn sweep_once(store: &dyn PasteStore) -> usize {
    match store.purge_evicted() {
        Ok(0) => 0,
        Ok(removed) => {
            tracing::debug!(
                backend = store.backend_name(),
                "Evicted {} expired paste key(s)",
                removed
            );
            removed
        }
        Err(err) => {
            tracing::warn!(
                backend = store.backend_name(),
                "Eviction sweep failed: {}",
                err
            );
            0
        }
    }
}
