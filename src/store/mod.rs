//! Object store
//!
//! Generic concurrent keyed store of transformed objects, fed by incremental
//! watch events and periodic full listings.
//!
//! The backing map sits behind an `Arc` that is swapped or copied on write.
//! Readers take a [`Snapshot`] under a short read lock and iterate it without
//! holding any lock, so a reader always sees exactly one generation.

mod error;
mod event;
mod transform;

pub use error::*;
pub use event::*;
pub use transform::*;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type Items<O> = Arc<HashMap<String, Arc<O>>>;

/// Outcome of an incremental mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// The store changed
    Applied,
    /// Nothing to change: identical content, or delete of an unknown key
    Unchanged,
    /// The event is already covered by the last full listing and was skipped
    Superseded,
}

impl Mutation {
    fn or(self, other: Mutation) -> Mutation {
        if self == Mutation::Applied || other == Mutation::Applied {
            Mutation::Applied
        } else {
            other
        }
    }
}

/// Point-in-time view of a store
#[derive(Debug)]
pub struct Snapshot<O> {
    generation: u64,
    synced: bool,
    items: Items<O>,
}

impl<O> Clone for Snapshot<O> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            synced: self.synced,
            items: Arc::clone(&self.items),
        }
    }
}

impl<O> Snapshot<O> {
    /// Store generation this snapshot was taken at
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a full listing had completed when the snapshot was taken
    pub fn has_synced(&self) -> bool {
        self.synced
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&O> {
        self.items.get(key).map(|obj| obj.as_ref())
    }

    /// Iterate over the stored objects in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &O> {
        self.items.values().map(|obj| obj.as_ref())
    }
}

struct Inner<O> {
    items: Items<O>,
    generation: u64,
    synced: bool,
    // Version of the last full listing, if it carried one
    listed_version: Option<u64>,
    // Highest version applied by any mutation
    high_water: Option<u64>,
}

impl<O: PartialEq> Inner<O> {
    fn is_superseded(&self, version: Option<u64>) -> bool {
        matches!((version, self.listed_version), (Some(v), Some(listed)) if v <= listed)
    }

    fn observe(&mut self, version: Option<u64>) {
        if let Some(v) = version {
            self.high_water = Some(self.high_water.map_or(v, |hw| hw.max(v)));
        }
    }

    fn upsert(&mut self, key: String, version: Option<u64>, obj: O) -> Mutation {
        if self.is_superseded(version) {
            return Mutation::Superseded;
        }
        self.observe(version);

        if self.items.get(&key).is_some_and(|current| **current == obj) {
            return Mutation::Unchanged;
        }

        Arc::make_mut(&mut self.items).insert(key, Arc::new(obj));
        self.generation += 1;
        Mutation::Applied
    }

    // UIDs are never reused, so a delete is safe to apply whatever its version.
    fn remove(&mut self, key: &str, version: Option<u64>) -> Mutation {
        self.observe(version);

        if !self.items.contains_key(key) {
            return Mutation::Unchanged;
        }

        Arc::make_mut(&mut self.items).remove(key);
        self.generation += 1;
        Mutation::Applied
    }

    fn swap(&mut self, items: HashMap<String, Arc<O>>, listed: Option<u64>) {
        self.items = Arc::new(items);
        self.generation += 1;
        self.synced = true;
        self.listed_version = listed;
        self.observe(listed);
    }
}

/// Thread-safe store of transformed objects keyed by UID
///
/// Generic over the [`Transform`] strategy it is constructed with.
pub struct ObjectStore<T: Transform> {
    transform: T,
    inner: RwLock<Inner<T::Output>>,
}

impl<T: Transform> ObjectStore<T> {
    /// Create an empty, unsynced store
    pub fn new(transform: T) -> Self {
        Self {
            transform,
            inner: RwLock::new(Inner {
                items: Arc::new(HashMap::new()),
                generation: 0,
                synced: false,
                listed_version: None,
                high_water: None,
            }),
        }
    }

    /// The transform strategy this store was built with
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Insert or overwrite an object
    pub fn add(&self, raw: &T::Raw) -> Mutation {
        let key = self.transform.key(raw);
        let version = self.transform.version(raw);
        let obj = self.transform.transform(raw);

        let outcome = self.inner.write().upsert(key.clone(), version, obj);
        tracing::trace!(key = %key, ?version, ?outcome, "add");
        outcome
    }

    /// Apply an update notification
    ///
    /// If the UID changed between the two states the old entry is removed and
    /// the new one inserted within the same critical section.
    pub fn update(&self, old: &T::Raw, new: &T::Raw) -> Mutation {
        let old_key = self.transform.key(old);
        let new_key = self.transform.key(new);
        let version = self.transform.version(new);
        let obj = self.transform.transform(new);

        let mut inner = self.inner.write();
        if old_key == new_key {
            return inner.upsert(new_key, version, obj);
        }

        tracing::debug!(old = %old_key, new = %new_key, "Update changed object UID");
        let removed = inner.remove(&old_key, self.transform.version(old));
        removed.or(inner.upsert(new_key, version, obj))
    }

    /// Remove an object; a miss is a no-op
    pub fn delete(&self, event: &DeleteEvent<T::Raw>) -> Mutation {
        let raw = event.object();
        let key = self.transform.key(raw);
        let version = self.transform.version(raw);

        if event.is_last_known() {
            tracing::debug!(key = %key, "Deleting from last known state");
        }

        self.inner.write().remove(&key, version)
    }

    /// Replace the whole content with a full listing
    ///
    /// Objects are transformed before the write lock is taken; the lock only
    /// covers the swap. A listing whose version is older than state already
    /// applied is rejected and leaves the store untouched.
    pub fn replace(&self, raw_list: &[T::Raw], version_hint: Option<&str>) -> StoreResult<()> {
        let listed = version_hint.and_then(parse_version);
        let items = self.transform_all(raw_list);
        let count = items.len();

        {
            let mut inner = self.inner.write();
            if let (Some(listed), Some(applied)) = (listed, inner.high_water) {
                if listed < applied {
                    return Err(StoreError::StaleListing { listed, applied });
                }
            }
            inner.swap(items, listed);
        }

        tracing::debug!(objects = count, version = ?listed, "Replaced store contents");
        Ok(())
    }

    /// Replace the whole content with a relist from the event source itself
    ///
    /// The source delivers the relist after every event it already delivered,
    /// so the set is applied without a staleness check. `version_hint` is a
    /// lower bound of the relist version and only raises the listed version.
    pub fn relist(&self, raw_list: &[T::Raw], version_hint: Option<&str>) {
        let hint = version_hint.and_then(parse_version);
        let items = self.transform_all(raw_list);
        let count = items.len();

        {
            let mut inner = self.inner.write();
            let listed = match (hint, inner.listed_version) {
                (Some(hint), Some(prev)) => Some(hint.max(prev)),
                (hint, prev) => hint.or(prev),
            };
            inner.swap(items, listed);
        }

        tracing::debug!(objects = count, version = ?hint, "Relisted store contents");
    }

    fn transform_all(&self, raw_list: &[T::Raw]) -> HashMap<String, Arc<T::Output>> {
        raw_list
            .iter()
            .map(|raw| (self.transform.key(raw), Arc::new(self.transform.transform(raw))))
            .collect()
    }

    /// Get a single object by key
    pub fn get(&self, key: &str) -> Option<Arc<T::Output>> {
        self.inner.read().items.get(key).cloned()
    }

    /// All objects of one generation
    pub fn list(&self) -> Vec<Arc<T::Output>> {
        let items = Arc::clone(&self.inner.read().items);
        items.values().cloned().collect()
    }

    /// All keys of one generation
    pub fn list_keys(&self) -> Vec<String> {
        let items = Arc::clone(&self.inner.read().items);
        items.keys().cloned().collect()
    }

    /// Consistent point-in-time view
    pub fn snapshot(&self) -> Snapshot<T::Output> {
        let inner = self.inner.read();
        Snapshot {
            generation: inner.generation,
            synced: inner.synced,
            items: Arc::clone(&inner.items),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().items.is_empty()
    }

    /// Whether a full listing has been applied at least once
    pub fn has_synced(&self) -> bool {
        self.inner.read().synced
    }

    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Version of the last full listing
    pub fn listed_version(&self) -> Option<u64> {
        self.inner.read().listed_version
    }

    /// Highest version applied so far
    pub fn high_water(&self) -> Option<u64> {
        self.inner.read().high_water
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Raw {
        uid: &'static str,
        version: &'static str,
        value: u32,
    }

    fn raw(uid: &'static str, version: &'static str, value: u32) -> Raw {
        Raw {
            uid,
            version,
            value,
        }
    }

    struct ValueTransform;

    impl Transform for ValueTransform {
        type Raw = Raw;
        type Output = u32;

        fn key(&self, raw: &Raw) -> String {
            raw.uid.to_string()
        }

        fn version(&self, raw: &Raw) -> Option<u64> {
            parse_version(raw.version)
        }

        fn transform(&self, raw: &Raw) -> u32 {
            raw.value
        }
    }

    fn store() -> ObjectStore<ValueTransform> {
        ObjectStore::new(ValueTransform)
    }

    #[test]
    fn test_new_store_is_empty_and_unsynced() {
        let store = store();
        assert!(store.is_empty());
        assert!(!store.has_synced());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_add_is_idempotent() {
        let store = store();
        assert_eq!(store.add(&raw("a", "", 1)), Mutation::Applied);
        let generation = store.generation();

        assert_eq!(store.add(&raw("a", "", 1)), Mutation::Unchanged);
        assert_eq!(store.len(), 1);
        assert_eq!(store.generation(), generation);
        assert_eq!(store.get("a").as_deref(), Some(&1));
    }

    #[test]
    fn test_add_overwrites_same_uid() {
        let store = store();
        store.add(&raw("a", "", 1));
        assert_eq!(store.add(&raw("a", "", 2)), Mutation::Applied);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").as_deref(), Some(&2));
    }

    #[test]
    fn test_update_same_uid() {
        let store = store();
        store.add(&raw("a", "", 1));

        let outcome = store.update(&raw("a", "", 1), &raw("a", "", 5));
        assert_eq!(outcome, Mutation::Applied);
        assert_eq!(store.get("a").as_deref(), Some(&5));
    }

    #[test]
    fn test_update_with_changed_uid_moves_entry() {
        let store = store();
        store.add(&raw("a", "", 1));

        let outcome = store.update(&raw("a", "", 1), &raw("b", "", 2));
        assert_eq!(outcome, Mutation::Applied);
        assert!(store.get("a").is_none());
        assert_eq!(store.get("b").as_deref(), Some(&2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_miss_is_noop() {
        let store = store();
        store.add(&raw("a", "", 1));
        let generation = store.generation();

        let outcome = store.delete(&DeleteEvent::Live(raw("missing", "", 0)));
        assert_eq!(outcome, Mutation::Unchanged);
        assert_eq!(store.len(), 1);
        assert_eq!(store.generation(), generation);
    }

    #[test]
    fn test_delete_tombstone_resolves_uid() {
        let store = store();
        store.add(&raw("a", "", 1));

        let outcome = store.delete(&DeleteEvent::LastKnown(raw("a", "", 1)));
        assert_eq!(outcome, Mutation::Applied);
        assert!(store.is_empty());

        // Duplicate notification
        let outcome = store.delete(&DeleteEvent::LastKnown(raw("a", "", 1)));
        assert_eq!(outcome, Mutation::Unchanged);
    }

    #[test]
    fn test_replace_removes_omitted_objects() {
        let store = store();
        store.add(&raw("a", "", 1));
        store.add(&raw("b", "", 2));

        store
            .replace(&[raw("b", "", 20), raw("c", "", 3)], None)
            .unwrap();

        assert!(store.has_synced());
        assert!(store.get("a").is_none());
        assert_eq!(store.get("b").as_deref(), Some(&20));
        assert_eq!(store.get("c").as_deref(), Some(&3));
        let mut keys = store.list_keys();
        keys.sort();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_replace_with_empty_hint_is_unordered() {
        let store = store();
        store.replace(&[raw("a", "10", 1)], Some("")).unwrap();
        assert_eq!(store.listed_version(), None);

        // Nothing to be superseded by
        assert_eq!(store.add(&raw("b", "5", 2)), Mutation::Applied);
    }

    #[test]
    fn test_events_older_than_listing_are_superseded() {
        let store = store();
        store.replace(&[raw("a", "100", 1)], Some("100")).unwrap();

        assert_eq!(store.add(&raw("a", "90", 0)), Mutation::Superseded);
        assert_eq!(store.get("a").as_deref(), Some(&1));

        assert_eq!(store.add(&raw("a", "101", 2)), Mutation::Applied);
        assert_eq!(store.get("a").as_deref(), Some(&2));
    }

    #[test]
    fn test_delete_is_never_superseded() {
        let store = store();
        store.replace(&[raw("a", "5", 1)], Some("100")).unwrap();

        // Tombstone carries the pre-delete version, older than the listing
        let outcome = store.delete(&DeleteEvent::LastKnown(raw("a", "5", 1)));
        assert_eq!(outcome, Mutation::Applied);
        assert!(store.is_empty());
    }

    #[test]
    fn test_stale_listing_is_rejected() {
        let store = store();
        store.replace(&[raw("a", "100", 1)], Some("100")).unwrap();
        store.add(&raw("b", "120", 2));

        let err = store
            .replace(&[raw("a", "100", 1)], Some("110"))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::StaleListing {
                listed: 110,
                applied: 120
            }
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b").as_deref(), Some(&2));

        // A fresh enough listing is accepted
        store.replace(&[raw("a", "100", 1)], Some("120")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.high_water(), Some(120));
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let store = store();
        store.replace(&[raw("a", "", 1), raw("b", "", 2)], None).unwrap();

        let before = store.snapshot();
        store.add(&raw("c", "", 3));
        store.delete(&DeleteEvent::Live(raw("a", "", 1)));

        assert_eq!(before.len(), 2);
        assert_eq!(before.get("a"), Some(&1));
        assert!(before.get("c").is_none());
        assert!(before.has_synced());

        let after = store.snapshot();
        assert_eq!(after.len(), 2);
        assert!(after.generation() > before.generation());
        let mut values: Vec<u32> = after.iter().copied().collect();
        values.sort();
        assert_eq!(values, vec![2, 3]);
    }

    #[test]
    fn test_relist_applies_after_newer_listing() {
        let store = store();
        store
            .replace(&[raw("a", "950", 1), raw("b", "900", 2)], Some("1000"))
            .unwrap();

        // Newest surviving object is older than the listing itself
        store.relist(&[raw("a", "950", 1)], Some("950"));

        assert!(store.get("b").is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.listed_version(), Some(1000));
    }

    #[test]
    fn test_relist_applies_after_newer_delete() {
        let store = store();
        store.relist(
            &[raw("a", "10", 1), raw("b", "11", 2), raw("c", "12", 3)],
            Some("12"),
        );
        store.delete(&DeleteEvent::Live(raw("c", "20", 3)));
        assert_eq!(store.high_water(), Some(20));

        store.relist(&[raw("a", "10", 1)], Some("10"));

        assert!(store.get("b").is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.listed_version(), Some(12));
        assert_eq!(store.high_water(), Some(20));
    }

    #[test]
    fn test_list_returns_one_generation() {
        let store = store();
        store.replace(&[raw("a", "", 1), raw("b", "", 2)], None).unwrap();

        let mut values: Vec<u32> = store.list().iter().map(|v| **v).collect();
        values.sort();
        assert_eq!(values, vec![1, 2]);
    }
}
