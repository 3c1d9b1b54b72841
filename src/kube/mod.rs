//! Kubernetes client module
//!
//! Connects to the API server and adapts EndpointSlice list and watch calls to
//! the [`Lister`] trait and event stream the topology cache consumes.

use crate::watcher::{Listing, Lister};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::Stream;
use k8s_openapi::api::discovery::v1::EndpointSlice;
use kube::api::ListParams;
use kube::config::Kubeconfig;
use kube::runtime::watcher;
use kube::{Api, Client, Config};

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer()
        .await
        .context("Failed to infer Kubernetes configuration")?;
    tracing::debug!("Using API server {}", config.cluster_url);

    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Name of the current kubeconfig context, if running from a kubeconfig
pub fn current_context() -> Option<String> {
    Kubeconfig::read().ok().and_then(|config| config.current_context)
}

/// Turn a namespace setting into an API scope
///
/// Empty, `all` and `-A` select every namespace.
pub fn resolve_namespace(namespace: &str) -> Option<String> {
    let namespace = namespace.trim();
    if namespace.is_empty() || namespace == "all" || namespace == "-A" {
        None
    } else {
        Some(namespace.to_string())
    }
}

/// EndpointSlice API, namespaced when a namespace is given
pub fn endpoint_slice_api(client: Client, namespace: Option<&str>) -> Api<EndpointSlice> {
    match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    }
}

/// Full EndpointSlice listings from the API server
///
/// Lists are requested without a resourceVersion, which the API server serves
/// as a consistent read of the latest state, never older than an event the
/// watch already delivered.
#[derive(Clone)]
pub struct EndpointSliceLister {
    api: Api<EndpointSlice>,
}

impl EndpointSliceLister {
    pub fn new(api: Api<EndpointSlice>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Lister<EndpointSlice> for EndpointSliceLister {
    async fn list(&self) -> Result<Listing<EndpointSlice>> {
        let list = self
            .api
            .list(&ListParams::default())
            .await
            .context("Failed to list EndpointSlices")?;

        Ok(Listing {
            items: list.items,
            resource_version: list.metadata.resource_version,
        })
    }
}

/// Incremental EndpointSlice events for the topology cache's watch pump
pub fn watch_endpoint_slices(
    api: Api<EndpointSlice>,
) -> impl Stream<Item = Result<watcher::Event<EndpointSlice>, watcher::Error>> + Send {
    watcher(api, watcher::Config::default())
}
