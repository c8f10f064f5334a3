//! Resource kinds known to the mock server.

/// Kinds the server can store, keyed by `apiVersion` and `kind`.
pub struct MockCatalog {
	pub resources: Vec<MockApiResource>,
}

impl Default for MockCatalog {
	fn default() -> Self {
		Self {
			resources: vec![
				MockApiResource::cluster_scoped("v1", "namespaces", "Namespace"),
				MockApiResource::namespaced("v1", "configmaps", "ConfigMap"),
				MockApiResource::namespaced(
					"kustomize.toolkit.fluxcd.io/v1",
					"kustomizations",
					"Kustomization",
				),
				MockApiResource::namespaced("helm.toolkit.fluxcd.io/v2", "helmreleases", "HelmRelease"),
				MockApiResource::namespaced(
					"helm.toolkit.fluxcd.io/v2beta2",
					"helmreleases",
					"HelmRelease",
				),
			],
		}
	}
}

impl MockCatalog {
	pub fn find(&self, api_version: &str, kind: &str) -> Option<&MockApiResource> {
		self.resources
			.iter()
			.find(|r| r.api_version == api_version && r.kind == kind)
	}
}

/// A mock API resource definition.
pub struct MockApiResource {
	pub api_version: String,
	pub plural: String,
	pub kind: String,
	pub namespaced: bool,
}

impl MockApiResource {
	pub fn namespaced(api_version: &str, plural: &str, kind: &str) -> Self {
		Self {
			api_version: api_version.to_string(),
			plural: plural.to_string(),
			kind: kind.to_string(),
			namespaced: true,
		}
	}

	pub fn cluster_scoped(api_version: &str, plural: &str, kind: &str) -> Self {
		Self {
			namespaced: false,
			..Self::namespaced(api_version, plural, kind)
		}
	}

	/// Collection path for objects of this kind in `namespace`.
	pub fn collection_path(&self, namespace: Option<&str>) -> String {
		let prefix = if self.api_version.contains('/') {
			"/apis"
		} else {
			"/api"
		};
		match namespace.filter(|_| self.namespaced) {
			Some(ns) => format!("{prefix}/{}/namespaces/{ns}/{}", self.api_version, self.plural),
			None => format!("{prefix}/{}/{}", self.api_version, self.plural),
		}
	}
}
