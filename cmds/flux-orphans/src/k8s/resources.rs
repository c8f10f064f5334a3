//! API coordinates of the Flux kinds this tool reads.

use kube::{core::GroupVersionKind, discovery::ApiResource};

use crate::orphans::ReleaseKind;

/// Group, version, kind and plural of a custom resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKind {
	pub group: String,
	pub version: String,
	pub kind: String,
	pub plural: String,
}

impl ApiKind {
	/// `kustomize.toolkit.fluxcd.io/v1` `Kustomization`.
	pub fn kustomization() -> Self {
		Self {
			group: "kustomize.toolkit.fluxcd.io".to_string(),
			version: "v1".to_string(),
			kind: "Kustomization".to_string(),
			plural: "kustomizations".to_string(),
		}
	}

	/// `helm.toolkit.fluxcd.io/v2` `HelmRelease`.
	pub fn helm_release() -> Self {
		Self {
			group: "helm.toolkit.fluxcd.io".to_string(),
			version: "v2".to_string(),
			kind: "HelmRelease".to_string(),
			plural: "helmreleases".to_string(),
		}
	}

	pub fn api_resource(&self) -> ApiResource {
		let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
		ApiResource::from_gvk_with_plural(&gvk, &self.plural)
	}

	/// How entries of this kind show up in an inventory id.
	pub fn release_kind(&self) -> ReleaseKind {
		ReleaseKind {
			group: self.group.clone(),
			kind: self.kind.clone(),
		}
	}
}

/// The two kinds a run reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluxApis {
	pub bundle: ApiKind,
	pub release: ApiKind,
}

impl Default for FluxApis {
	fn default() -> Self {
		Self {
			bundle: ApiKind::kustomization(),
			release: ApiKind::helm_release(),
		}
	}
}
