//! Path and response helpers for the mock server.

/// Split a Kubernetes API path into (collection path, last segment).
///
/// - `/apis/helm.toolkit.fluxcd.io/v2/namespaces/apps/helmreleases/podinfo`
///   -> (`/apis/helm.toolkit.fluxcd.io/v2/namespaces/apps/helmreleases`, `podinfo`)
/// - `/api/v1/namespaces/apps` -> (`/api/v1/namespaces`, `apps`)
pub fn split_resource_path(path: &str) -> (&str, &str) {
	let path = path.trim_end_matches('/');
	match path.rfind('/') {
		Some(idx) => (&path[..idx], &path[idx + 1..]),
		None => (path, ""),
	}
}

/// The cluster-wide collection a namespaced collection belongs to.
///
/// - `/apis/apps/v1/namespaces/default/deployments` -> Some(`/apis/apps/v1/deployments`)
/// - `/api/v1/namespaces` -> None
pub fn cluster_wide_path(path: &str) -> Option<String> {
	let ns_idx = path.find("/namespaces/")?;
	let before = &path[..ns_idx];
	let after = &path[ns_idx + "/namespaces/".len()..];
	let slash = after.find('/')?;
	Some(format!("{before}{}", &after[slash..]))
}

pub fn list_body(items: Vec<serde_json::Value>) -> serde_json::Value {
	serde_json::json!({
		"kind": "List",
		"apiVersion": "v1",
		"metadata": {"resourceVersion": "1"},
		"items": items
	})
}

pub fn status_body(code: u16, reason: &str, message: &str) -> serde_json::Value {
	serde_json::json!({
		"kind": "Status",
		"apiVersion": "v1",
		"metadata": {},
		"status": "Failure",
		"message": message,
		"reason": reason,
		"code": code
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_split_resource_path() {
		assert_eq!(
			split_resource_path("/apis/helm.toolkit.fluxcd.io/v2/namespaces/apps/helmreleases/podinfo"),
			("/apis/helm.toolkit.fluxcd.io/v2/namespaces/apps/helmreleases", "podinfo")
		);
	}

	#[test]
	fn test_cluster_wide_path() {
		assert_eq!(
			cluster_wide_path("/apis/helm.toolkit.fluxcd.io/v2/namespaces/apps/helmreleases")
				.as_deref(),
			Some("/apis/helm.toolkit.fluxcd.io/v2/helmreleases")
		);
		assert_eq!(cluster_wide_path("/api/v1/namespaces"), None);
	}
}
