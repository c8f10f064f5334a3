//! HTTP-based mock Kubernetes server using wiremock.
//!
//! Serves `/version` plus GET (single object and list, namespaced or
//! cluster-wide) and DELETE for every kind in the [`MockCatalog`].

use std::{
	collections::{BTreeMap, HashSet},
	sync::{Arc, RwLock},
};

use bon::Builder;
use kube::config::{
	AuthInfo, Cluster, Context, Kubeconfig, NamedAuthInfo, NamedCluster, NamedContext,
};
use tracing::{debug, trace};
use wiremock::{
	matchers::{method, path, path_regex},
	Mock, MockServer, Request, ResponseTemplate,
};

use super::{
	catalog::MockCatalog,
	helpers::{cluster_wide_path, list_body, split_resource_path, status_body},
};

/// Stored objects keyed by (collection path, name).
pub type SharedResources = Arc<RwLock<BTreeMap<(String, String), serde_json::Value>>>;

/// A mock Kubernetes server exposed over HTTP.
#[derive(Builder)]
pub struct HttpMockK8sServer {
	/// Objects to serve as raw manifests. API paths are derived from
	/// apiVersion and kind using the catalog.
	#[builder(default)]
	resources: Vec<serde_json::Value>,
	/// `namespace/name` of objects whose deletion is rejected with 403.
	#[builder(default)]
	failing_deletes: Vec<String>,
}

/// A running HTTP mock server instance.
pub struct RunningHttpMockK8sServer {
	server: MockServer,
	catalog: MockCatalog,
	resources: SharedResources,
}

impl HttpMockK8sServer {
	/// Start the mock server with all configured resources.
	pub async fn start(self) -> RunningHttpMockK8sServer {
		let server = MockServer::start().await;
		let catalog = MockCatalog::default();

		debug!(uri = %server.uri(), "Started mock K8s server");

		let mut resources = BTreeMap::new();
		for manifest in self.resources {
			match key_for_manifest(&manifest, &catalog) {
				Some(key) => {
					trace!(api_path = %key.0, name = %key.1, "Registered resource");
					resources.insert(key, manifest);
				}
				None => debug!(?manifest, "Ignoring manifest of unknown kind"),
			}
		}
		let shared_resources = Arc::new(RwLock::new(resources));

		let plurals: HashSet<String> = catalog.resources.iter().map(|r| r.plural.clone()).collect();
		let failing: HashSet<String> = self.failing_deletes.into_iter().collect();

		mount_version(&server).await;
		mount_delete(&server, &shared_resources, failing).await;
		mount_get(&server, &shared_resources, plurals).await;

		RunningHttpMockK8sServer {
			server,
			catalog,
			resources: shared_resources,
		}
	}
}

/// Derive (collection path, name) for a manifest.
fn key_for_manifest(manifest: &serde_json::Value, catalog: &MockCatalog) -> Option<(String, String)> {
	let api_version = manifest.get("apiVersion")?.as_str()?;
	let kind = manifest.get("kind")?.as_str()?;
	let metadata = manifest.get("metadata")?;
	let name = metadata.get("name")?.as_str()?;
	let namespace = metadata
		.get("namespace")
		.and_then(|n| n.as_str())
		.unwrap_or("default");

	let resource = catalog.find(api_version, kind)?;
	Some((resource.collection_path(Some(namespace)), name.to_string()))
}

impl RunningHttpMockK8sServer {
	/// Get the server's URI (e.g., "http://127.0.0.1:12345").
	pub fn uri(&self) -> String {
		self.server.uri()
	}

	/// Whether the object is still stored, i.e. was not deleted.
	pub fn contains(&self, api_version: &str, kind: &str, namespace: &str, name: &str) -> bool {
		let Some(resource) = self.catalog.find(api_version, kind) else {
			return false;
		};
		let key = (resource.collection_path(Some(namespace)), name.to_string());
		self.resources
			.read()
			.map(|resources| resources.contains_key(&key))
			.unwrap_or(false)
	}

	/// Number of DELETE requests received so far.
	pub async fn delete_requests(&self) -> usize {
		self.server
			.received_requests()
			.await
			.unwrap_or_default()
			.iter()
			.filter(|req| req.method.as_str() == "DELETE")
			.count()
	}

	/// Create a Kubeconfig pointing to this mock server.
	pub fn kubeconfig(&self) -> Kubeconfig {
		self.kubeconfig_with_context("mock-context")
	}

	/// Create a Kubeconfig pointing to this mock server with a custom context name.
	pub fn kubeconfig_with_context(&self, context_name: &str) -> Kubeconfig {
		let cluster_name = "mock-cluster";
		let user_name = "mock-user";

		Kubeconfig {
			clusters: vec![NamedCluster {
				name: cluster_name.to_string(),
				cluster: Some(Cluster {
					server: Some(self.uri()),
					insecure_skip_tls_verify: Some(true),
					..Default::default()
				}),
			}],
			contexts: vec![NamedContext {
				name: context_name.to_string(),
				context: Some(Context {
					cluster: cluster_name.to_string(),
					user: Some(user_name.to_string()),
					namespace: Some("default".to_string()),
					..Default::default()
				}),
			}],
			auth_infos: vec![NamedAuthInfo {
				name: user_name.to_string(),
				auth_info: Some(AuthInfo::default()),
			}],
			current_context: Some(context_name.to_string()),
			..Default::default()
		}
	}
}

async fn mount_version(server: &MockServer) {
	Mock::given(method("GET"))
		.and(path("/version"))
		.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
			"major": "1",
			"minor": "31",
			"gitVersion": "v1.31.0",
			"gitCommit": "fake",
			"gitTreeState": "clean",
			"buildDate": "2024-08-13T00:00:00Z",
			"goVersion": "go1.22.5",
			"compiler": "gc",
			"platform": "linux/amd64"
		})))
		.mount(server)
		.await;
}

async fn mount_delete(server: &MockServer, resources: &SharedResources, failing: HashSet<String>) {
	let resources = Arc::clone(resources);

	Mock::given(method("DELETE"))
		.and(path_regex(r"^/api(s)?/.*/namespaces/[^/]+/[^/]+/[^/]+$"))
		.respond_with(move |req: &Request| {
			let (collection, name) = split_resource_path(req.url.path());
			let namespace = collection
				.rsplit('/')
				.nth(1)
				.unwrap_or_default();

			if failing.contains(&format!("{namespace}/{name}")) {
				return ResponseTemplate::new(403).set_body_json(status_body(
					403,
					"Forbidden",
					&format!("deletion of {name} is forbidden"),
				));
			}

			let removed = resources
				.write()
				.ok()
				.and_then(|mut resources| resources.remove(&(collection.to_string(), name.to_string())));
			match removed {
				Some(object) => ResponseTemplate::new(200).set_body_json(object),
				None => ResponseTemplate::new(404).set_body_json(status_body(
					404,
					"NotFound",
					&format!("{name} not found"),
				)),
			}
		})
		.mount(server)
		.await;
}

async fn mount_get(server: &MockServer, resources: &SharedResources, plurals: HashSet<String>) {
	let resources = Arc::clone(resources);

	Mock::given(method("GET"))
		.and(path_regex(r"^/api(s)?/.*"))
		.respond_with(move |req: &Request| {
			let path_str = req.url.path().trim_end_matches('/');
			let Ok(resources) = resources.read() else {
				return ResponseTemplate::new(500);
			};

			let (collection, last) = split_resource_path(path_str);
			if !plurals.contains(last) {
				return match resources.get(&(collection.to_string(), last.to_string())) {
					Some(object) => ResponseTemplate::new(200).set_body_json(object.clone()),
					None => ResponseTemplate::new(404).set_body_json(status_body(
						404,
						"NotFound",
						&format!("{last} not found"),
					)),
				};
			}

			// Namespaced list, or cluster-wide list across every namespace.
			let items = resources
				.iter()
				.filter(|((stored, _), _)| {
					stored == path_str || cluster_wide_path(stored).as_deref() == Some(path_str)
				})
				.map(|(_, object)| object.clone())
				.collect();
			ResponseTemplate::new(200).set_body_json(list_body(items))
		})
		.mount(server)
		.await;
}
