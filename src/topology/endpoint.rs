//! Endpoint extraction
//!
//! Reduces EndpointSlice objects to the pod references behind a service.

use crate::store::{ObjectStore, Transform, parse_version};
use k8s_openapi::api::discovery::v1::{Endpoint, EndpointSlice};
use serde::Serialize;

/// Target reference kind that identifies a pod backend
pub const POD_KIND: &str = "Pod";

/// Reference to a pod backing a service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodRef {
    pub namespace: String,
    pub pod_name: String,
}

/// Indexable view of one EndpointSlice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointInfo {
    pub uid: String,
    pub namespace: String,
    pub service_name: String,
    pub pod_refs: Vec<PodRef>,
}

/// Transform from EndpointSlice to [`EndpointInfo`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointTransform;

/// Store of EndpointSlices keyed by UID
pub type EndpointStore = ObjectStore<EndpointTransform>;

impl Transform for EndpointTransform {
    type Raw = EndpointSlice;
    type Output = EndpointInfo;

    fn key(&self, raw: &EndpointSlice) -> String {
        let meta = &raw.metadata;
        match meta.uid.as_deref() {
            Some(uid) if !uid.is_empty() => uid.to_string(),
            _ => format!(
                "{}/{}",
                meta.namespace.as_deref().unwrap_or_default(),
                meta.name.as_deref().unwrap_or_default()
            ),
        }
    }

    fn version(&self, raw: &EndpointSlice) -> Option<u64> {
        raw.metadata.resource_version.as_deref().and_then(parse_version)
    }

    fn transform(&self, raw: &EndpointSlice) -> EndpointInfo {
        EndpointInfo {
            uid: self.key(raw),
            namespace: raw.metadata.namespace.clone().unwrap_or_default(),
            service_name: raw.metadata.name.clone().unwrap_or_default(),
            pod_refs: raw.endpoints.iter().filter_map(pod_ref).collect(),
        }
    }
}

/// Pod behind an endpoint, if the endpoint references one completely
fn pod_ref(endpoint: &Endpoint) -> Option<PodRef> {
    let target = endpoint.target_ref.as_ref()?;
    if target.kind.as_deref() != Some(POD_KIND) {
        return None;
    }

    Some(PodRef {
        namespace: target.namespace.clone().filter(|ns| !ns.is_empty())?,
        pod_name: target.name.clone().filter(|name| !name.is_empty())?,
    })
}
