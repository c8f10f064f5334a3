//! Deleting HelmReleases through the API server.

use kube::{
	api::{Api, ApiResource, DeleteParams, DynamicObject},
	Client,
};

use super::resources::ApiKind;
use crate::{
	cleanup::{DeleteError, ReleaseDeleter},
	orphans::ResourceRef,
};

/// Deletes releases of one kind with default delete options.
#[derive(Clone)]
pub struct KubeDeleter {
	client: Client,
	api_resource: ApiResource,
}

impl KubeDeleter {
	pub fn new(client: Client, kind: &ApiKind) -> Self {
		Self {
			client,
			api_resource: kind.api_resource(),
		}
	}
}

impl ReleaseDeleter for KubeDeleter {
	async fn delete(&self, release: &ResourceRef) -> Result<(), DeleteError> {
		let api: Api<DynamicObject> =
			Api::namespaced_with(self.client.clone(), &release.namespace, &self.api_resource);

		api.delete(&release.name, &DeleteParams::default())
			.await
			.map_err(|e| DeleteError {
				release: release.clone(),
				source: Box::new(e),
			})?;

		tracing::info!(%release, "deleted");
		Ok(())
	}
}
