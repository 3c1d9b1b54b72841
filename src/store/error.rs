//! Store errors

/// Errors returned by store mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A full listing is older than state the store already applied
    #[error("listing at version {listed} is older than applied version {applied}")]
    StaleListing { listed: u64, applied: u64 },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
