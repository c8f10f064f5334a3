//! Orphan resolver.

use std::collections::BTreeMap;

use super::{
	inventory::InventoryIndex,
	model::{Claim, OrphanRecord},
};

/// Orphans grouped by namespace.
///
/// Namespaces iterate in ascending order, records inside a namespace are
/// sorted by name. Only namespaces with at least one orphan are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanSet {
	groups: BTreeMap<String, Vec<OrphanRecord>>,
	skipped_entries: usize,
}

impl OrphanSet {
	/// All records, in (namespace, name) order.
	pub fn iter(&self) -> impl Iterator<Item = &OrphanRecord> {
		self.groups.values().flatten()
	}

	/// Namespace groups, in namespace order.
	pub fn groups(&self) -> impl Iterator<Item = (&str, &[OrphanRecord])> {
		self.groups
			.iter()
			.map(|(namespace, records)| (namespace.as_str(), records.as_slice()))
	}

	pub fn namespace_count(&self) -> usize {
		self.groups.len()
	}

	pub fn len(&self) -> usize {
		self.groups.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.groups.is_empty()
	}

	/// Inventory entries that could not be parsed while building the index.
	pub fn skipped_entries(&self) -> usize {
		self.skipped_entries
	}
}

impl FromIterator<OrphanRecord> for OrphanSet {
	fn from_iter<I: IntoIterator<Item = OrphanRecord>>(iter: I) -> Self {
		let mut groups: BTreeMap<String, Vec<OrphanRecord>> = BTreeMap::new();
		for record in iter {
			groups
				.entry(record.namespace.clone())
				.or_default()
				.push(record);
		}
		for records in groups.values_mut() {
			records.sort_by(|a, b| a.name.cmp(&b.name));
		}
		Self {
			groups,
			skipped_entries: 0,
		}
	}
}

/// Keep every claim whose release no inventory lists.
pub fn resolve_orphans(index: &InventoryIndex, claims: impl IntoIterator<Item = Claim>) -> OrphanSet {
	let mut orphans: OrphanSet = claims
		.into_iter()
		.filter(|claim| !index.contains(&claim.resource))
		.map(OrphanRecord::from)
		.collect();
	orphans.skipped_entries = index.skipped().len();
	orphans
}
