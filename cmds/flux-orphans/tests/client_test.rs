//! Integration tests for ClusterConnection using HTTP mock server.

use assert_matches::assert_matches;
use flux_orphans::k8s::client::{ClusterConnection, ConnectionError};
use k8s_mock::HttpMockK8sServer;

#[tokio::test]
async fn test_connect_with_current_context() {
	let server = HttpMockK8sServer::builder().build().start().await;

	let conn = ClusterConnection::from_kubeconfig(server.kubeconfig(), None)
		.await
		.expect("connection should succeed");

	assert_eq!(conn.server_version().git_version, "v1.31.0");
	assert_eq!(conn.cluster_identifier(), "context:mock-context");
}

#[tokio::test]
async fn test_connect_with_named_context() {
	let server = HttpMockK8sServer::builder().build().start().await;

	let conn = ClusterConnection::from_kubeconfig(
		server.kubeconfig_with_context("staging"),
		Some("staging"),
	)
	.await
	.expect("connection should succeed");

	assert_eq!(conn.cluster_identifier(), "context:staging");
	assert_eq!(conn.server_version().minor, "31");
}

#[tokio::test]
async fn test_connect_context_not_found() {
	let server = HttpMockK8sServer::builder().build().start().await;

	let result = ClusterConnection::from_kubeconfig(server.kubeconfig(), Some("prod")).await;
	assert_matches!(
		result,
		Err(ConnectionError::ContextNotFound(context)) if context == "prod"
	);
}
