//! End-to-end cleanup sessions: detection against the mock cluster, scripted
//! answers through `TerminalPrompter`, then deletion.

use std::io::Cursor;

use flux_orphans::{
	cleanup::{SessionEnd, TerminalPrompter},
	commands::{
		cleanup::{apply_plan, review},
		find::detect,
	},
	config::Config,
	k8s::{client::ClusterConnection, delete::KubeDeleter, resources::ApiKind},
	orphans::{OrphanRecord, ResourceRef},
};
use k8s_mock::{HttpMockK8sServer, RunningHttpMockK8sServer};

const HELM_API_VERSION: &str = "helm.toolkit.fluxcd.io/v2";

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

/// Three orphans in `ns1`, one in `ns2`, one in `ns3`. Nothing is inventoried.
async fn start() -> (RunningHttpMockK8sServer, ClusterConnection) {
	let server = HttpMockK8sServer::builder()
		.resources(vec![
			helm_release("ns1", "a"),
			helm_release("ns1", "b"),
			helm_release("ns1", "c"),
			helm_release("ns2", "d"),
			helm_release("ns3", "e"),
		])
		.build()
		.start()
		.await;
	let connection = ClusterConnection::from_kubeconfig(server.kubeconfig(), None)
		.await
		.expect("failed to create connection");
	(server, connection)
}

async fn run_script(script: &str) -> (RunningHttpMockK8sServer, Vec<ResourceRef>, SessionEnd, String) {
	let (server, connection) = start().await;
	let orphans = detect(&connection, &Config::default(), None)
		.await
		.expect("detection should succeed");

	let mut prompter = TerminalPrompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
	let plan = review(&orphans, &mut prompter).expect("review should succeed");
	let mut output = prompter.into_output();

	let deleter = KubeDeleter::new(connection.client().clone(), &ApiKind::helm_release());
	let report = apply_plan(&deleter, &plan, false, &mut output)
		.await
		.expect("writing output should succeed");
	assert!(!report.has_failures());
	assert_eq!(
		report.deleted,
		plan.deletions.iter().map(OrphanRecord::reference).collect::<Vec<_>>()
	);

	(server, report.deleted, plan.end, String::from_utf8(output).unwrap())
}

#[tokio::test]
async fn test_select_then_delete_all() {
	// ns1: select, keep a, drop b, keep c. ns2: skip. ns3: delete all.
	let (server, deleted, end, output) = run_script("s\ny\nn\ny\nn\ny\n").await;

	assert_eq!(end, SessionEnd::Done);
	assert_eq!(
		deleted,
		vec![
			ResourceRef::new("ns1", "a"),
			ResourceRef::new("ns1", "c"),
			ResourceRef::new("ns3", "e"),
		]
	);
	assert!(server.contains(HELM_API_VERSION, "HelmRelease", "ns1", "b"));
	assert!(server.contains(HELM_API_VERSION, "HelmRelease", "ns2", "d"));
	assert!(output.contains("Found 5 orphaned HelmReleases in 3 namespaces."));
	assert!(output.contains("CLEANUP COMPLETE"));
	assert!(output.contains("Deleted: 3\n"));
	assert!(output.contains("Skipped: 2\n"));
}

#[tokio::test]
async fn test_quit_keeps_earlier_namespaces_only() {
	// ns1: delete all. ns2: quit. ns3 is never reviewed.
	let (server, deleted, end, output) = run_script("y\nq\n").await;

	assert_eq!(end, SessionEnd::Aborted);
	assert_eq!(
		deleted,
		vec![
			ResourceRef::new("ns1", "a"),
			ResourceRef::new("ns1", "b"),
			ResourceRef::new("ns1", "c"),
		]
	);
	assert!(server.contains(HELM_API_VERSION, "HelmRelease", "ns2", "d"));
	assert!(server.contains(HELM_API_VERSION, "HelmRelease", "ns3", "e"));
	assert!(!output.contains("Namespace: ns3"));
	assert!(output.contains("CLEANUP ABORTED"));
	assert_eq!(server.delete_requests().await, 3);
}

#[tokio::test]
async fn test_quit_during_select_drops_the_namespace() {
	let (server, deleted, end, _) = run_script("s\ny\nq\n").await;

	assert_eq!(end, SessionEnd::Aborted);
	assert!(deleted.is_empty());
	assert!(server.contains(HELM_API_VERSION, "HelmRelease", "ns1", "a"));
	assert_eq!(server.delete_requests().await, 0);
}
