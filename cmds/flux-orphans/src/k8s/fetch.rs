//! Listing Kustomizations and HelmReleases.
//!
//! Objects are listed as [`DynamicObject`]s and decoded into the snapshot
//! types of [`crate::orphans`]. Nothing here retries: any API failure
//! aborts the run.

use kube::{
	api::{Api, DynamicObject, ListParams},
	Client,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use super::resources::{ApiKind, FluxApis};
use crate::orphans::{Bundle, InventoryRef, ManagedResource};

/// Page size for list calls.
const LIST_PAGE_SIZE: u32 = 500;

/// Errors that can occur while fetching cluster state.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("listing {kind} objects")]
	List {
		kind: String,
		#[source]
		source: Box<kube::Error>,
	},

	#[error("{kind} object without metadata.{field}")]
	MissingMetadata { kind: String, field: &'static str },

	#[error("decoding status of {kind} {namespace}/{name}")]
	Decode {
		kind: String,
		namespace: String,
		name: String,
		#[source]
		source: serde_json::Error,
	},
}

/// `status` of a Kustomization, reduced to its inventory.
#[derive(Debug, Default, Deserialize)]
struct KustomizationStatus {
	#[serde(default)]
	inventory: Option<ResourceInventory>,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceInventory {
	#[serde(default)]
	entries: Vec<InventoryRef>,
}

/// Both collections a run works on.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
	pub bundles: Vec<Bundle>,
	pub releases: Vec<ManagedResource>,
}

/// List every object of `kind`, in `namespace` or cluster-wide.
#[instrument(skip(client, kind), fields(kind = %kind.kind))]
pub async fn list_objects(
	client: &Client,
	kind: &ApiKind,
	namespace: Option<&str>,
) -> Result<Vec<DynamicObject>, FetchError> {
	let ar = kind.api_resource();
	let api: Api<DynamicObject> = match namespace {
		Some(ns) => Api::namespaced_with(client.clone(), ns, &ar),
		None => Api::all_with(client.clone(), &ar),
	};

	let mut params = ListParams::default().limit(LIST_PAGE_SIZE);
	let mut objects = Vec::new();
	loop {
		let page = api.list(&params).await.map_err(|e| FetchError::List {
			kind: kind.kind.clone(),
			source: Box::new(e),
		})?;
		objects.extend(page.items);

		match page.metadata.continue_ {
			Some(token) if !token.is_empty() => params = params.continue_token(&token),
			_ => break,
		}
	}

	tracing::debug!(count = objects.len(), "listed objects");
	Ok(objects)
}

fn metadata<'o>(
	obj: &'o DynamicObject,
	kind: &ApiKind,
) -> Result<(&'o str, &'o str), FetchError> {
	let missing = |field| FetchError::MissingMetadata {
		kind: kind.kind.clone(),
		field,
	};
	let name = obj.metadata.name.as_deref().ok_or_else(|| missing("name"))?;
	let namespace = obj
		.metadata
		.namespace
		.as_deref()
		.ok_or_else(|| missing("namespace"))?;
	Ok((name, namespace))
}

/// Decode a Kustomization. A missing `status.inventory` is an empty inventory.
pub fn decode_bundle(obj: &DynamicObject, kind: &ApiKind) -> Result<Bundle, FetchError> {
	let (name, namespace) = metadata(obj, kind)?;

	let status: KustomizationStatus = match obj.data.get("status") {
		Some(status) => {
			serde_json::from_value(status.clone()).map_err(|source| FetchError::Decode {
				kind: kind.kind.clone(),
				namespace: namespace.to_string(),
				name: name.to_string(),
				source,
			})?
		}
		None => KustomizationStatus::default(),
	};

	Ok(Bundle {
		name: name.to_string(),
		namespace: namespace.to_string(),
		inventory: status.inventory.map(|i| i.entries).unwrap_or_default(),
	})
}

pub fn decode_release(obj: &DynamicObject, kind: &ApiKind) -> Result<ManagedResource, FetchError> {
	let (name, namespace) = metadata(obj, kind)?;
	Ok(ManagedResource {
		name: name.to_string(),
		namespace: namespace.to_string(),
		labels: obj.metadata.labels.clone().unwrap_or_default(),
	})
}

pub async fn list_bundles(
	client: &Client,
	kind: &ApiKind,
	namespace: Option<&str>,
) -> Result<Vec<Bundle>, FetchError> {
	list_objects(client, kind, namespace)
		.await?
		.iter()
		.map(|obj| decode_bundle(obj, kind))
		.collect()
}

pub async fn list_managed_resources(
	client: &Client,
	kind: &ApiKind,
	namespace: Option<&str>,
) -> Result<Vec<ManagedResource>, FetchError> {
	list_objects(client, kind, namespace)
		.await?
		.iter()
		.map(|obj| decode_release(obj, kind))
		.collect()
}

/// Fetch Kustomizations and HelmReleases concurrently.
///
/// Returns only once both lists are complete. The namespace filter applies
/// to both, so Kustomizations outside it do not count as owners.
#[instrument(skip(client, apis))]
pub async fn fetch_snapshot(
	client: &Client,
	apis: &FluxApis,
	namespace: Option<&str>,
) -> Result<Snapshot, FetchError> {
	let (bundles, releases) = tokio::try_join!(
		list_bundles(client, &apis.bundle, namespace),
		list_managed_resources(client, &apis.release, namespace),
	)?;
	Ok(Snapshot { bundles, releases })
}
