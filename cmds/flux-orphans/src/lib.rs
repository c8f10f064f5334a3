//! Detection and interactive cleanup of orphaned Flux HelmReleases.
//!
//! A HelmRelease is orphaned when its `kustomize.toolkit.fluxcd.io/*` labels
//! name a Kustomization, but no Kustomization lists it in its inventory.

pub mod cleanup;
pub mod commands;
pub mod config;
pub mod k8s;
pub mod orphans;
pub mod output;
pub mod telemetry;
