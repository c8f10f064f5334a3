//! Find command handler.
//!
//! Lists HelmReleases that still carry Kustomization owner labels but are
//! not in any Kustomization inventory.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use tracing::instrument;

use super::util::{create_tokio_runtime, ClusterArgs};
use crate::{
	config::Config,
	k8s::{client::ClusterConnection, fetch::fetch_snapshot},
	orphans::{find_orphans, OrphanSet},
	output::{write_orphans, OutputFormat},
};

#[derive(Args)]
pub struct FindArgs {
	#[command(flatten)]
	pub cluster: ClusterArgs,

	/// Output format. Defaults to the config file's `output`, then "table"
	#[arg(short = 'o', long, value_enum)]
	pub output: Option<OutputFormat>,
}

/// Run the find command.
pub fn run<W: Write>(args: FindArgs, writer: W) -> Result<()> {
	let mut config = args.cluster.load_config()?;
	config.merge_from(&Config {
		output: args.output,
		..Default::default()
	});

	let runtime = create_tokio_runtime()?;
	runtime.block_on(async {
		let connection = args.cluster.connect().await?;
		find_in_cluster(
			&connection,
			&config,
			args.cluster.namespace.as_deref(),
			writer,
		)
		.await?;
		Ok(())
	})
}

/// Fetch a snapshot and compute its orphans.
///
/// Malformed inventory entries are reported on stderr and otherwise ignored.
#[instrument(skip_all, fields(cluster = %connection.cluster_identifier(), namespace = ?namespace))]
pub async fn detect(
	connection: &ClusterConnection,
	config: &Config,
	namespace: Option<&str>,
) -> Result<OrphanSet> {
	let snapshot = fetch_snapshot(connection.client(), &config.apis(), namespace)
		.await
		.context("fetching Flux resources")?;
	tracing::debug!(
		kustomizations = snapshot.bundles.len(),
		helm_releases = snapshot.releases.len(),
		"fetched snapshot"
	);

	let orphans = find_orphans(&snapshot.bundles, &snapshot.releases, &config.detection());
	if let Some(warning) = unowned_namespace_warning(namespace, snapshot.bundles.len(), &orphans) {
		eprintln!("{warning}");
	}
	if orphans.skipped_entries() > 0 {
		eprintln!(
			"Warning: skipped {} malformed inventory entries",
			orphans.skipped_entries()
		);
	}
	Ok(orphans)
}

/// With a namespace filter only that namespace's Kustomizations are read, so
/// releases owned from elsewhere (usually `flux-system`) all look orphaned.
fn unowned_namespace_warning(
	namespace: Option<&str>,
	kustomizations: usize,
	orphans: &OrphanSet,
) -> Option<String> {
	let namespace = namespace?;
	if kustomizations > 0 || orphans.is_empty() {
		return None;
	}
	Some(format!(
		"Warning: no Kustomizations found in namespace '{namespace}'; \
		 every labelled HelmRelease there is reported as orphaned"
	))
}

/// Detect orphans and write them in the configured format.
pub async fn find_in_cluster<W: Write>(
	connection: &ClusterConnection,
	config: &Config,
	namespace: Option<&str>,
	writer: W,
) -> Result<OrphanSet> {
	let orphans = detect(connection, config, namespace).await?;
	write_orphans(&orphans, config.output.unwrap_or_default(), writer)?;
	Ok(orphans)
}
