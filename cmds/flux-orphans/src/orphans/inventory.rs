//! Inventory index: which releases some Kustomization currently owns.

use std::{collections::HashSet, str::FromStr};

use thiserror::Error;
use tracing::warn;

use super::{
	model::{Bundle, InventoryEntry, ResourceRef},
	ReleaseKind,
};

/// An inventory id that doesn't follow `<namespace>_<name>_<group>_<kind>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed inventory entry `{id}`: {reason}")]
pub struct MalformedInventoryEntry {
	pub id: String,
	pub reason: &'static str,
}

impl FromStr for InventoryEntry {
	type Err = MalformedInventoryEntry;

	fn from_str(id: &str) -> Result<Self, Self::Err> {
		let malformed = |reason| MalformedInventoryEntry {
			id: id.to_string(),
			reason,
		};

		// None of the four fields can contain `_`: namespaces and names are
		// DNS labels/subdomains, groups are DNS subdomains, kinds are CamelCase.
		let mut parts = id.split('_');
		let (Some(namespace), Some(name), Some(group), Some(kind), None) = (
			parts.next(),
			parts.next(),
			parts.next(),
			parts.next(),
			parts.next(),
		) else {
			return Err(malformed("expected 4 `_`-separated fields"));
		};

		if name.is_empty() {
			return Err(malformed("empty name"));
		}
		if kind.is_empty() {
			return Err(malformed("empty kind"));
		}

		Ok(Self {
			group: group.to_string(),
			kind: kind.to_string(),
			namespace: namespace.to_string(),
			name: name.to_string(),
		})
	}
}

/// An entry that was left out of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
	/// Kustomization that listed the entry.
	pub bundle: ResourceRef,
	pub error: MalformedInventoryEntry,
}

/// Set of releases listed in at least one inventory.
#[derive(Debug, Default)]
pub struct InventoryIndex {
	owned: HashSet<ResourceRef>,
	skipped: Vec<SkippedEntry>,
}

impl InventoryIndex {
	/// Fold every release-kind entry of every bundle into the index.
	///
	/// Entries of other kinds are ignored. Malformed entries are skipped and
	/// recorded, the rest of the inventory is still indexed.
	pub fn build<'a>(bundles: impl IntoIterator<Item = &'a Bundle>, release: &ReleaseKind) -> Self {
		let mut index = Self::default();

		for bundle in bundles {
			for raw in &bundle.inventory {
				let entry = match raw.id.parse::<InventoryEntry>() {
					Ok(entry) => entry,
					Err(error) => {
						warn!(
							kustomization = %format!("{}/{}", bundle.namespace, bundle.name),
							%error,
							"skipping inventory entry"
						);
						index.skipped.push(SkippedEntry {
							bundle: ResourceRef::new(&bundle.namespace, &bundle.name),
							error,
						});
						continue;
					}
				};

				if release.matches(&entry) {
					index
						.owned
						.insert(ResourceRef::new(entry.namespace, entry.name));
				}
			}
		}

		index
	}

	pub fn contains(&self, resource: &ResourceRef) -> bool {
		self.owned.contains(resource)
	}

	/// Number of distinct releases owned by some inventory.
	pub fn len(&self) -> usize {
		self.owned.len()
	}

	pub fn is_empty(&self) -> bool {
		self.owned.is_empty()
	}

	pub fn skipped(&self) -> &[SkippedEntry] {
		&self.skipped
	}
}
