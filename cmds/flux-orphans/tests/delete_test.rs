//! Integration tests for deleting HelmReleases against a mock Kubernetes API server.

use assert_matches::assert_matches;
use flux_orphans::{
	cleanup::{CleanupSession, Input, ReleaseDeleter, SessionEnd},
	commands::{cleanup::apply_plan, find::detect},
	config::Config,
	k8s::{client::ClusterConnection, delete::KubeDeleter, resources::ApiKind},
	orphans::ResourceRef,
};
use k8s_mock::{HttpMockK8sServer, RunningHttpMockK8sServer};

const HELM_API_VERSION: &str = "helm.toolkit.fluxcd.io/v2";

fn kustomization(name: &str, owned: &[(&str, &str)]) -> serde_json::Value {
	let entries: Vec<_> = owned
		.iter()
		.map(|(namespace, release)| {
			serde_json::json!({
				"id": format!("{namespace}_{release}_helm.toolkit.fluxcd.io_HelmRelease"),
				"v": "v2"
			})
		})
		.collect();
	serde_json::json!({
		"apiVersion": "kustomize.toolkit.fluxcd.io/v1",
		"kind": "Kustomization",
		"metadata": { "name": name, "namespace": "flux-system" },
		"status": { "inventory": { "entries": entries } }
	})
}

fn helm_release(namespace: &str, name: &str) -> serde_json::Value {
	serde_json::json!({
		"apiVersion": HELM_API_VERSION,
		"kind": "HelmRelease",
		"metadata": {
			"name": name,
			"namespace": namespace,
			"labels": {
				"kustomize.toolkit.fluxcd.io/name": "apps",
				"kustomize.toolkit.fluxcd.io/namespace": "flux-system"
			}
		}
	})
}

fn cluster() -> Vec<serde_json::Value> {
	vec![
		kustomization("apps", &[("ns1", "svc-a")]),
		helm_release("ns1", "svc-a"),
		helm_release("ns1", "svc-b"),
		helm_release("ns1", "svc-c"),
		helm_release("ns2", "svc-d"),
	]
}

async fn start(failing_deletes: Vec<String>) -> (RunningHttpMockK8sServer, ClusterConnection) {
	let server = HttpMockK8sServer::builder()
		.resources(cluster())
		.failing_deletes(failing_deletes)
		.build()
		.start()
		.await;
	let connection = ClusterConnection::from_kubeconfig(server.kubeconfig(), None)
		.await
		.expect("failed to create connection");
	(server, connection)
}

fn deleter(connection: &ClusterConnection) -> KubeDeleter {
	KubeDeleter::new(connection.client().clone(), &ApiKind::helm_release())
}

#[tokio::test]
async fn test_delete_release() {
	let (server, connection) = start(Vec::new()).await;

	deleter(&connection)
		.delete(&ResourceRef::new("ns1", "svc-b"))
		.await
		.expect("delete should succeed");

	assert!(!server.contains(HELM_API_VERSION, "HelmRelease", "ns1", "svc-b"));
	assert!(server.contains(HELM_API_VERSION, "HelmRelease", "ns1", "svc-c"));
}

#[tokio::test]
async fn test_delete_missing_release_fails() {
	let (_server, connection) = start(Vec::new()).await;

	let result = deleter(&connection)
		.delete(&ResourceRef::new("ns1", "gone"))
		.await;

	assert_matches!(result, Err(e) if e.release == ResourceRef::new("ns1", "gone"));
}

#[tokio::test]
async fn test_cleanup_continues_after_failure() {
	let (server, connection) = start(vec!["ns1/svc-b".to_string()]).await;

	let orphans = detect(&connection, &Config::default(), None)
		.await
		.expect("detection should succeed");
	let mut session = CleanupSession::new(&orphans);
	session.apply(Input::DeleteAll).unwrap();
	session.apply(Input::Skip).unwrap();
	let plan = session.finish();
	assert_eq!(plan.end, SessionEnd::Done);

	let mut output = Vec::new();
	let report = apply_plan(&deleter(&connection), &plan, false, &mut output)
		.await
		.expect("writing output should succeed");
	let output = String::from_utf8(output).unwrap();

	assert_eq!(report.deleted, vec![ResourceRef::new("ns1", "svc-c")]);
	assert_eq!(report.failed.len(), 1);
	assert_eq!(report.failed[0].release, ResourceRef::new("ns1", "svc-b"));
	assert_eq!(server.delete_requests().await, 2);

	assert!(server.contains(HELM_API_VERSION, "HelmRelease", "ns1", "svc-b"));
	assert!(!server.contains(HELM_API_VERSION, "HelmRelease", "ns1", "svc-c"));
	assert!(server.contains(HELM_API_VERSION, "HelmRelease", "ns2", "svc-d"));

	assert!(output.contains("✗ Failed to delete HelmRelease ns1/svc-b"));
	assert!(output.contains("✓ Deleted HelmRelease ns1/svc-c"));
	assert!(output.contains("Failed: 1\n"));
	assert!(output.contains("Skipped: 1\n"));
}
