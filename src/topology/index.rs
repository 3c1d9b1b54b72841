//! Derived topology views
//!
//! Both views are computed from a single store snapshot and cached until the
//! store generation moves.

use super::endpoint::{EndpointInfo, EndpointStore};
use super::service::{Service, pod_key};
use crate::store::Snapshot;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Counters describing the current topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologySummary {
    pub synced: bool,
    pub generation: u64,
    pub objects: usize,
    pub services: usize,
    pub pods: usize,
}

#[derive(Debug, Default)]
struct Views {
    generation: u64,
    synced: bool,
    objects: usize,
    pod_to_services: HashMap<String, Vec<String>>,
    service_to_pods: HashMap<Service, usize>,
}

impl Views {
    fn build(snapshot: &Snapshot<EndpointInfo>) -> Self {
        let mut views = Views {
            generation: snapshot.generation(),
            synced: snapshot.has_synced(),
            objects: snapshot.len(),
            ..Default::default()
        };

        // Warm-up: serve nothing until the first full listing landed
        if !views.synced {
            return views;
        }

        for info in snapshot.iter() {
            for pod in &info.pod_refs {
                views
                    .pod_to_services
                    .entry(pod_key(&pod.namespace, &pod.pod_name))
                    .or_default()
                    .push(info.service_name.clone());
            }

            if !info.pod_refs.is_empty() {
                *views
                    .service_to_pods
                    .entry(Service::new(&info.service_name, &info.namespace))
                    .or_insert(0) += info.pod_refs.len();
            }
        }

        views
    }
}

/// Pod/service lookups over an [`EndpointStore`]
pub struct TopologyIndex {
    store: Arc<EndpointStore>,
    cached: Mutex<Option<Arc<Views>>>,
}

impl TopologyIndex {
    pub fn new(store: Arc<EndpointStore>) -> Self {
        Self {
            store,
            cached: Mutex::new(None),
        }
    }

    /// The store this index reads from
    pub fn store(&self) -> &Arc<EndpointStore> {
        &self.store
    }

    /// Service names per pod key (`namespace:<ns>,podName:<pod>`)
    ///
    /// A pod listed by several objects naming the same service carries that
    /// name once per object.
    pub fn pod_key_to_service_names(&self) -> HashMap<String, Vec<String>> {
        self.views().pod_to_services.clone()
    }

    /// Number of backing pods per service; services without pods are omitted
    pub fn service_to_pod_num(&self) -> HashMap<Service, usize> {
        self.views().service_to_pods.clone()
    }

    /// Services a single pod belongs to
    pub fn services_for_pod(&self, namespace: &str, pod_name: &str) -> Vec<String> {
        self.views()
            .pod_to_services
            .get(&pod_key(namespace, pod_name))
            .cloned()
            .unwrap_or_default()
    }

    /// Backing pod count of a single service
    pub fn pod_count(&self, service: &Service) -> usize {
        self.views()
            .service_to_pods
            .get(service)
            .copied()
            .unwrap_or(0)
    }

    pub fn summary(&self) -> TopologySummary {
        let views = self.views();
        TopologySummary {
            synced: views.synced,
            generation: views.generation,
            objects: views.objects,
            services: views.service_to_pods.len(),
            pods: views.pod_to_services.len(),
        }
    }

    fn views(&self) -> Arc<Views> {
        let snapshot = self.store.snapshot();

        if let Some(views) = self.cached.lock().as_ref() {
            if views.generation == snapshot.generation() {
                return Arc::clone(views);
            }
        }

        let views = Arc::new(Views::build(&snapshot));

        let mut cached = self.cached.lock();
        let newer = cached
            .as_ref()
            .is_none_or(|current| current.generation < views.generation);
        if newer {
            *cached = Some(Arc::clone(&views));
        }
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DeleteEvent;
    use crate::topology::EndpointTransform;
    use k8s_openapi::api::core::v1::ObjectReference;
    use k8s_openapi::api::discovery::v1::{Endpoint, EndpointSlice};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn slice(uid: &str, namespace: &str, name: &str, pods: &[&str]) -> EndpointSlice {
        EndpointSlice {
            metadata: ObjectMeta {
                uid: Some(uid.to_string()),
                namespace: Some(namespace.to_string()),
                name: Some(name.to_string()),
                ..Default::default()
            },
            endpoints: pods
                .iter()
                .map(|pod| Endpoint {
                    target_ref: Some(ObjectReference {
                        kind: Some("Pod".to_string()),
                        namespace: Some(namespace.to_string()),
                        name: Some(pod.to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn index() -> TopologyIndex {
        TopologyIndex::new(Arc::new(EndpointStore::new(EndpointTransform)))
    }

    #[test]
    fn test_unsynced_store_serves_empty_views() {
        let index = index();
        index.store().add(&slice("u1", "default", "web", &["web-1"]));

        assert!(index.pod_key_to_service_names().is_empty());
        assert!(index.service_to_pod_num().is_empty());
        assert!(!index.summary().synced);
        assert_eq!(index.summary().objects, 1);
    }

    #[test]
    fn test_counts_sum_across_objects_of_one_service() {
        let index = index();
        index
            .store()
            .replace(
                &[
                    slice("u1", "default", "web", &["web-1", "web-2"]),
                    slice("u2", "default", "web", &["web-3"]),
                    slice("u3", "other", "web", &["web-9"]),
                ],
                None,
            )
            .unwrap();

        let counts = index.service_to_pod_num();
        assert_eq!(counts.get(&Service::new("web", "default")), Some(&3));
        assert_eq!(counts.get(&Service::new("web", "other")), Some(&1));
        assert_eq!(index.pod_count(&Service::new("web", "default")), 3);
        assert_eq!(index.pod_count(&Service::new("missing", "default")), 0);
    }

    #[test]
    fn test_duplicate_service_names_are_kept() {
        let index = index();
        index
            .store()
            .replace(
                &[
                    slice("u1", "default", "web", &["shared"]),
                    slice("u2", "default", "web", &["shared"]),
                    slice("u3", "default", "api", &["shared"]),
                ],
                None,
            )
            .unwrap();

        let mut services = index.services_for_pod("default", "shared");
        services.sort();
        assert_eq!(services, vec!["api", "web", "web"]);
    }

    #[test]
    fn test_read_after_write_sees_update() {
        let index = index();
        index
            .store()
            .replace(&[slice("u1", "default", "web", &["web-1"])], None)
            .unwrap();
        assert_eq!(index.services_for_pod("default", "web-1"), vec!["web"]);

        index
            .store()
            .add(&slice("u1", "default", "web", &["web-2"]));
        assert!(index.services_for_pod("default", "web-1").is_empty());
        assert_eq!(index.services_for_pod("default", "web-2"), vec!["web"]);

        index
            .store()
            .delete(&DeleteEvent::Live(slice("u1", "default", "web", &[])));
        assert!(index.service_to_pod_num().is_empty());
        assert!(index.pod_key_to_service_names().is_empty());
    }

    #[test]
    fn test_views_are_cached_per_generation() {
        let index = index();
        index
            .store()
            .replace(&[slice("u1", "default", "web", &["web-1"])], None)
            .unwrap();

        let first = index.views();
        let second = index.views();
        assert!(Arc::ptr_eq(&first, &second));

        index.store().add(&slice("u2", "default", "api", &["api-1"]));
        let third = index.views();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.service_to_pods.len(), 2);
    }
}
