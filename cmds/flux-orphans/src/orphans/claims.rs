//! Ownership claim scanner.

use super::{
	model::{Claim, ManagedResource, OwnerRef},
	OwnerLabels,
};

/// Releases carrying both owner labels, sorted by namespace then name.
///
/// A release with only one of the labels, or with an empty value, never
/// claimed an owner and is left out.
pub fn scan_claims<'a>(
	resources: impl IntoIterator<Item = &'a ManagedResource>,
	labels: &OwnerLabels,
) -> Vec<Claim> {
	let mut claims: Vec<Claim> = resources
		.into_iter()
		.filter_map(|resource| {
			let name = non_empty_label(resource, &labels.name)?;
			let namespace = non_empty_label(resource, &labels.namespace)?;
			Some(Claim {
				resource: resource.reference(),
				owner: OwnerRef {
					name: name.to_string(),
					namespace: namespace.to_string(),
				},
			})
		})
		.collect();

	claims.sort_by(|a, b| a.resource.cmp(&b.resource));
	claims
}

fn non_empty_label<'r>(resource: &'r ManagedResource, key: &str) -> Option<&'r str> {
	resource
		.labels
		.get(key)
		.map(String::as_str)
		.filter(|v| !v.is_empty())
}
