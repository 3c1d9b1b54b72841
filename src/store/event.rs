//! Delete notifications

/// A delete notification
///
/// Watch streams that miss the final event hand over the last state they saw
/// instead of the deleted object itself. Both carry a full payload, so the
/// store resolves the key the same way for either variant.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteEvent<K> {
    /// The object as it was deleted
    Live(K),
    /// The last known state of an object whose deletion was observed late
    LastKnown(K),
}

impl<K> DeleteEvent<K> {
    /// Borrow the carried object
    pub fn object(&self) -> &K {
        match self {
            DeleteEvent::Live(obj) | DeleteEvent::LastKnown(obj) => obj,
        }
    }

    /// Whether this is a tombstone carrying last known state
    pub fn is_last_known(&self) -> bool {
        matches!(self, DeleteEvent::LastKnown(_))
    }
}
