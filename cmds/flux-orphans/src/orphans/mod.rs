//! Orphan detection.
//!
//! Two independent views of ownership are compared: Kustomization inventories
//! ([`inventory`]) and the `kustomize.toolkit.fluxcd.io/*` labels on each
//! HelmRelease ([`claims`]). A release that claims an owner but is missing
//! from every inventory is an orphan ([`resolve`]).
//!
//! Everything here is a pure function of its inputs and a [`DetectionConfig`].

pub mod claims;
pub mod inventory;
pub mod model;
pub mod resolve;

pub use self::{
	claims::scan_claims,
	inventory::{InventoryIndex, MalformedInventoryEntry, SkippedEntry},
	model::{Bundle, Claim, InventoryEntry, InventoryRef, ManagedResource, OrphanRecord, OwnerRef, ResourceRef},
	resolve::{resolve_orphans, OrphanSet},
};

/// Label Flux puts on applied objects naming the owning Kustomization.
pub const DEFAULT_OWNER_NAME_LABEL: &str = "kustomize.toolkit.fluxcd.io/name";
/// Label Flux puts on applied objects naming the owning Kustomization's namespace.
pub const DEFAULT_OWNER_NAMESPACE_LABEL: &str = "kustomize.toolkit.fluxcd.io/namespace";

/// Group and kind of inventory entries that count as releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseKind {
	pub group: String,
	pub kind: String,
}

impl Default for ReleaseKind {
	fn default() -> Self {
		Self {
			group: "helm.toolkit.fluxcd.io".to_string(),
			kind: "HelmRelease".to_string(),
		}
	}
}

impl ReleaseKind {
	pub fn matches(&self, entry: &InventoryEntry) -> bool {
		entry.group == self.group && entry.kind == self.kind
	}
}

/// Label keys carrying an ownership claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerLabels {
	pub name: String,
	pub namespace: String,
}

impl Default for OwnerLabels {
	fn default() -> Self {
		Self {
			name: DEFAULT_OWNER_NAME_LABEL.to_string(),
			namespace: DEFAULT_OWNER_NAMESPACE_LABEL.to_string(),
		}
	}
}

/// Settings shared by the scanner and the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionConfig {
	pub release: ReleaseKind,
	pub labels: OwnerLabels,
}

/// Build the inventory index, scan claims and resolve orphans in one go.
///
/// Both inputs are expected to be already confined to the namespace filter,
/// if any.
pub fn find_orphans(
	bundles: &[Bundle],
	resources: &[ManagedResource],
	config: &DetectionConfig,
) -> OrphanSet {
	let index = InventoryIndex::build(bundles, &config.release);
	tracing::debug!(
		owned = index.len(),
		skipped = index.skipped().len(),
		"built inventory index"
	);

	let claims = scan_claims(resources, &config.labels);
	tracing::debug!(claims = claims.len(), "scanned ownership claims");

	resolve_orphans(&index, claims)
}
