//! Kubernetes access: connecting, listing Flux objects and deleting releases.
//!
//! Talks to the API server through kube-rs with dynamic objects, so no Flux
//! CRD types need to be compiled in.

pub mod client;
pub mod delete;
pub mod fetch;
pub mod resources;
