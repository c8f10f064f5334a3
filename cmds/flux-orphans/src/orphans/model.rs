//! Plain snapshot types the detection core works on.
//!
//! These are decoded once from the cluster and never mutated afterwards.
//! Neither side references the other: a [`Bundle`] only knows the ids in its
//! inventory, a [`ManagedResource`] only knows its labels.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Namespace and name of a namespaced object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceRef {
	pub namespace: String,
	pub name: String,
}

impl ResourceRef {
	pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
			name: name.into(),
		}
	}
}

impl fmt::Display for ResourceRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.namespace, self.name)
	}
}

/// Raw inventory entry as written by the kustomize-controller
/// (`status.inventory.entries[]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InventoryRef {
	/// Object id, `<namespace>_<name>_<group>_<kind>`.
	#[serde(default)]
	pub id: String,
	/// API version the object was applied with.
	#[serde(default, rename = "v")]
	pub version: Option<String>,
}

impl InventoryRef {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			version: None,
		}
	}
}

/// Parsed inventory entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InventoryEntry {
	/// API group, empty for the core group.
	pub group: String,
	pub kind: String,
	/// Empty for cluster-scoped objects.
	pub namespace: String,
	pub name: String,
}

/// A Flux `Kustomization`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
	pub name: String,
	pub namespace: String,
	pub inventory: Vec<InventoryRef>,
}

/// A Flux `HelmRelease`, reduced to what ownership detection needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedResource {
	pub name: String,
	pub namespace: String,
	pub labels: BTreeMap<String, String>,
}

impl ManagedResource {
	pub fn reference(&self) -> ResourceRef {
		ResourceRef::new(&self.namespace, &self.name)
	}
}

/// The Kustomization a release claims to be owned by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
	pub name: String,
	pub namespace: String,
}

impl fmt::Display for OwnerRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.namespace, self.name)
	}
}

/// A release carrying both ownership labels.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Claim {
	pub resource: ResourceRef,
	pub owner: OwnerRef,
}

/// A claim that no inventory backs up.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanRecord {
	pub name: String,
	pub namespace: String,
	pub original_kustomization: OwnerRef,
}

impl OrphanRecord {
	pub fn reference(&self) -> ResourceRef {
		ResourceRef::new(&self.namespace, &self.name)
	}
}

impl From<Claim> for OrphanRecord {
	fn from(claim: Claim) -> Self {
		Self {
			name: claim.resource.name,
			namespace: claim.resource.namespace,
			original_kustomization: claim.owner,
		}
	}
}
