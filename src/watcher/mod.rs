//! Watcher module
//!
//! Keeps an [`EndpointStore`] in sync with the cluster: a resync task that
//! periodically swaps in a full listing, and an optional pump applying
//! incremental watch events in between.
//!
//! Both tasks share one cancellation token. Stopping them leaves the cached
//! topology in place, so queries keep answering with the last known state.

mod events;
mod resync;
mod state;

pub use resync::*;
pub use state::*;

use crate::topology::{EndpointStore, TopologyIndex};
use anyhow::Result;
use futures::Stream;
use k8s_openapi::api::discovery::v1::EndpointSlice;
use kube::runtime::watcher::Event;
use parking_lot::Mutex;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owns the endpoint store, its topology index and the tasks feeding them
///
/// Constructed explicitly and handed to consumers; each instance is fully
/// independent of any other.
pub struct TopologyCache {
    index: Arc<TopologyIndex>,
    status: Arc<ResyncStatus>,
    token: CancellationToken,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TopologyCache {
    /// Create a cache around an existing store
    pub fn new(store: Arc<EndpointStore>) -> Self {
        Self {
            index: Arc::new(TopologyIndex::new(store)),
            status: Arc::new(ResyncStatus::new()),
            token: CancellationToken::new(),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<EndpointStore> {
        self.index.store()
    }

    /// Query side, shareable with metric decorators
    pub fn index(&self) -> &Arc<TopologyIndex> {
        &self.index
    }

    /// Whether the first full listing has been applied
    pub fn is_initialized(&self) -> bool {
        self.store().has_synced()
    }

    pub fn status(&self) -> ResyncReport {
        self.status.report()
    }

    /// Start the periodic full resync
    ///
    /// The first listing is requested right away.
    pub fn spawn_resync<L>(&self, lister: L, interval: Duration)
    where
        L: Lister<EndpointSlice> + 'static,
    {
        tracing::debug!("Starting resync loop every {:?}", interval);
        let handle = tokio::spawn(run_resync(
            Arc::clone(self.store()),
            lister,
            interval,
            self.token.child_token(),
            Arc::clone(&self.status),
        ));
        self.handles.lock().push(handle);
    }

    /// Start applying incremental watch events
    pub fn spawn_watch<S, E>(&self, stream: S)
    where
        S: Stream<Item = Result<Event<EndpointSlice>, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        tracing::debug!("Starting EndpointSlice watch pump");
        let handle = tokio::spawn(events::run_event_pump(
            Arc::clone(self.store()),
            stream,
            self.token.child_token(),
            Arc::clone(&self.status),
        ));
        self.handles.lock().push(handle);
    }

    /// Run one listing now, outside the periodic loop
    ///
    /// Returns the number of stored objects. Failures leave the cache as is.
    pub async fn resync_now<L>(&self, lister: &L) -> Result<usize>
    where
        L: Lister<EndpointSlice> + ?Sized,
    {
        let listing = lister.list().await;
        apply_listing(self.store(), listing, &self.status).ok_or_else(|| {
            let report = self.status.report();
            anyhow::anyhow!(
                "resync failed: {}",
                report.last_error.unwrap_or_else(|| "unknown error".to_string())
            )
        })
    }

    /// Signal all tasks to stop; calling it again has no effect
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!("Stopping topology cache tasks");
        }
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop and wait for every task to finish
    pub async fn shutdown(&self) {
        self.stop();
        let handles = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Topology task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for TopologyCache {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
