//! Kubernetes cluster connection management.

use std::time::Duration;

use k8s_openapi::apimachinery::pkg::version::Info;
use kube::{
	config::{InferConfigError, KubeConfigOptions, Kubeconfig, KubeconfigError},
	Client, Config,
};
use thiserror::Error;
use tracing::instrument;

/// Default timeout for Kubernetes API requests.
const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when connecting to a Kubernetes cluster.
#[derive(Debug, Error)]
pub enum ConnectionError {
	#[error("no context named `{0}` was found. Please check your $KUBECONFIG")]
	ContextNotFound(String),

	#[error("unable to load a kubeconfig or in-cluster configuration")]
	Infer(#[from] InferConfigError),

	#[error(transparent)]
	Kubeconfig(#[from] KubeconfigError),

	#[error(transparent)]
	Kube(#[from] kube::Error),
}

/// Represents a connection to a Kubernetes cluster.
#[derive(Clone)]
pub struct ClusterConnection {
	client: Client,
	server_version: Info,
	/// Context name, or `in-cluster` when running inside a pod.
	cluster_identifier: String,
}

impl std::fmt::Debug for ClusterConnection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClusterConnection")
			.field("cluster_identifier", &self.cluster_identifier)
			.field("server_version", &self.server_version)
			.finish_non_exhaustive()
	}
}

impl ClusterConnection {
	/// Connect using `context` from the default kubeconfig, or, without one,
	/// whatever kube infers (current context, then in-cluster config).
	#[instrument]
	pub async fn connect(context: Option<&str>) -> Result<Self, ConnectionError> {
		if context.is_some() {
			return Self::from_kubeconfig(Kubeconfig::read()?, context).await;
		}

		let config = Config::infer().await?;
		let identifier = match Kubeconfig::read().ok().and_then(|k| k.current_context) {
			Some(current) => format!("context:{current}"),
			None => "in-cluster".to_string(),
		};
		Self::from_config(config, identifier).await
	}

	/// Connect using a provided kubeconfig, with `context` or its current context.
	#[instrument(skip(kubeconfig))]
	pub async fn from_kubeconfig(
		kubeconfig: Kubeconfig,
		context: Option<&str>,
	) -> Result<Self, ConnectionError> {
		if let Some(name) = context {
			if !kubeconfig.contexts.iter().any(|c| c.name == name) {
				return Err(ConnectionError::ContextNotFound(name.to_string()));
			}
		}

		let identifier = context
			.map(str::to_string)
			.or_else(|| kubeconfig.current_context.clone())
			.map(|name| format!("context:{name}"))
			.unwrap_or_else(|| "kubeconfig".to_string());

		let config = Config::from_custom_kubeconfig(
			kubeconfig,
			&KubeConfigOptions {
				context: context.map(str::to_string),
				..Default::default()
			},
		)
		.await?;

		Self::from_config(config, identifier).await
	}

	async fn from_config(mut config: Config, cluster_identifier: String) -> Result<Self, ConnectionError> {
		config.read_timeout = Some(DEFAULT_API_TIMEOUT);
		let client = Client::try_from(config)?;

		let server_version = client.apiserver_version().await?;
		tracing::debug!(
			cluster = %cluster_identifier,
			version = %server_version.git_version,
			"connected"
		);

		Ok(Self {
			client,
			server_version,
			cluster_identifier,
		})
	}

	/// Get a reference to the underlying kube client.
	pub fn client(&self) -> &Client {
		&self.client
	}

	pub fn server_version(&self) -> &Info {
		&self.server_version
	}

	/// Get the cluster identifier.
	pub fn cluster_identifier(&self) -> &str {
		&self.cluster_identifier
	}
}
