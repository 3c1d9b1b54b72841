//! svcmap library
//!
//! In-memory mirror of EndpointSlices answering which services a pod belongs
//! to and how many pods back each service, for attributing node metrics to
//! logical services.

pub mod cli;
pub mod config;
pub mod kube;
pub mod store;
pub mod topology;
pub mod watcher;

// Re-export commonly used types for convenience
pub use store::{DeleteEvent, Mutation, ObjectStore, StoreError, Transform};
pub use topology::{
    EndpointInfo, EndpointStore, EndpointTransform, PodRef, Service, TopologyIndex, pod_key,
};
pub use watcher::{Lister, Listing, ResyncReport, TopologyCache};
