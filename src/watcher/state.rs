//! Resync bookkeeping
//!
//! Tracks how the background loops are doing so the host process can report
//! it in its diagnostics.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// Serializable view of the resync and watch counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResyncReport {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub stale_rejections: u64,
    pub watch_events: u64,
    pub watch_errors: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub last_object_count: usize,
}

/// Thread-safe resync status shared between the loops and readers
#[derive(Debug, Default)]
pub struct ResyncStatus {
    inner: Mutex<ResyncReport>,
}

impl ResyncStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.inner.lock().attempts += 1;
    }

    /// A listing was applied
    pub fn record_success(&self, objects: usize) {
        let mut report = self.inner.lock();
        report.successes += 1;
        report.last_success = Some(Utc::now());
        report.last_object_count = objects;
    }

    /// A listing could not be obtained
    pub fn record_failure(&self, error: &anyhow::Error) {
        let mut report = self.inner.lock();
        report.failures += 1;
        report.last_error = Some(format!("{:#}", error));
    }

    /// A listing was older than the applied state
    pub fn record_stale(&self, error: &crate::store::StoreError) {
        let mut report = self.inner.lock();
        report.stale_rejections += 1;
        report.last_error = Some(error.to_string());
    }

    pub fn record_watch_event(&self) {
        self.inner.lock().watch_events += 1;
    }

    pub fn record_watch_error(&self, error: String) {
        let mut report = self.inner.lock();
        report.watch_errors += 1;
        report.last_error = Some(error);
    }

    pub fn report(&self) -> ResyncReport {
        self.inner.lock().clone()
    }
}
