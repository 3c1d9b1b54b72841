//! Service topology
//!
//! Answers which services a pod belongs to and how many pods back a service,
//! from EndpointSlices held in an [`EndpointStore`].

mod endpoint;
mod index;
mod service;

pub use endpoint::*;
pub use index::*;
pub use service::*;
