//! Periodic full resync
//!
//! Re-lists the watched kind on a fixed interval and swaps the listing into
//! the store, healing any drift left by missed or reordered events.

use super::state::ResyncStatus;
use crate::store::{ObjectStore, Transform};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Shortest accepted interval between listings
pub const MIN_RESYNC_INTERVAL: Duration = Duration::from_secs(1);

/// A full listing of one resource kind
#[derive(Debug, Clone)]
pub struct Listing<K> {
    pub items: Vec<K>,
    /// Collection version the listing was served at
    pub resource_version: Option<String>,
}

/// Source of full listings
///
/// Implementations must serve listings at least as fresh as any event already
/// delivered to the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Lister<K: Send + Sync + 'static>: Send + Sync {
    async fn list(&self) -> Result<Listing<K>>;
}

/// Apply one listing result to the store
///
/// Returns the number of stored objects when the listing was applied.
pub(crate) fn apply_listing<T: Transform>(
    store: &ObjectStore<T>,
    listing: Result<Listing<T::Raw>>,
    status: &ResyncStatus,
) -> Option<usize> {
    status.record_attempt();

    let listing = match listing {
        Ok(listing) => listing,
        Err(e) => {
            tracing::warn!("Resync listing failed, keeping cached topology: {:#}", e);
            status.record_failure(&e);
            return None;
        }
    };

    match store.replace(&listing.items, listing.resource_version.as_deref()) {
        Ok(()) => {
            let objects = store.len();
            tracing::info!(
                objects,
                version = listing.resource_version.as_deref().unwrap_or(""),
                "Resync complete"
            );
            status.record_success(objects);
            Some(objects)
        }
        Err(e) => {
            tracing::warn!("Resync skipped: {}", e);
            status.record_stale(&e);
            None
        }
    }
}

/// Run the resync loop until `token` is cancelled
///
/// The first listing is issued immediately. Intervals below
/// [`MIN_RESYNC_INTERVAL`] are raised to it. A listing still in flight when
/// the token fires is dropped before it reaches the store.
pub(crate) async fn run_resync<T, L>(
    store: Arc<ObjectStore<T>>,
    lister: L,
    interval: Duration,
    token: CancellationToken,
    status: Arc<ResyncStatus>,
) where
    T: Transform,
    T::Raw: Send + Sync + 'static,
    L: Lister<T::Raw>,
{
    if interval < MIN_RESYNC_INTERVAL {
        tracing::warn!(
            "Resync interval {:?} too short, using {:?}",
            interval,
            MIN_RESYNC_INTERVAL
        );
    }
    let mut ticker = tokio::time::interval(interval.max(MIN_RESYNC_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let listing = tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!("Abandoning in-flight listing");
                break;
            }
            listing = lister.list() => listing,
        };

        apply_listing(&store, listing, &status);
    }

    tracing::info!("Resync loop stopped");
}
