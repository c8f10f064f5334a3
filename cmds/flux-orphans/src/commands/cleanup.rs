//! Cleanup command handler.
//!
//! Walks the operator through the orphans namespace by namespace and deletes
//! what they confirm.

use std::io::{self, IsTerminal, Write};

use anyhow::Result;
use clap::Args;
use tracing::instrument;

use super::{
	find::detect,
	util::{create_tokio_runtime, ClusterArgs},
};
use crate::{
	cleanup::{
		drive,
		execute::{write_dry_run, write_summary},
		execute_plan, CleanupPlan, CleanupSession, DeletionReport, Prompter, ReleaseDeleter,
		TerminalPrompter,
	},
	k8s::delete::KubeDeleter,
	orphans::OrphanSet,
};

#[derive(Args)]
pub struct CleanupArgs {
	#[command(flatten)]
	pub cluster: ClusterArgs,

	/// Review as usual, then print what would be deleted instead of deleting it
	#[arg(long)]
	pub dry_run: bool,
}

/// Run the cleanup command.
pub fn run<W: Write>(args: CleanupArgs, mut writer: W) -> Result<()> {
	if !io::stdin().is_terminal() {
		anyhow::bail!(
			"cannot prompt for confirmation in non-interactive mode. \
			 Run cleanup from a terminal, or use `flux-orphans find` to only list orphans."
		);
	}

	let config = args.cluster.load_config()?;
	let runtime = create_tokio_runtime()?;
	let (connection, orphans) = runtime.block_on(async {
		let connection = args.cluster.connect().await?;
		let orphans = detect(&connection, &config, args.cluster.namespace.as_deref()).await?;
		anyhow::Ok((connection, orphans))
	})?;

	if orphans.is_empty() {
		writeln!(writer, "No orphaned HelmReleases found.")?;
		return Ok(());
	}

	let plan = {
		let mut prompter = TerminalPrompter::new(io::stdin().lock(), &mut writer);
		review(&orphans, &mut prompter)?
	};

	if args.dry_run {
		write_dry_run(&plan, &mut writer)?;
		return Ok(());
	}

	let deleter = KubeDeleter::new(connection.client().clone(), &config.apis().release);
	let color = args.cluster.color.should_colorize();
	let report = runtime.block_on(apply_plan(&deleter, &plan, color, &mut writer))?;

	if report.has_failures() {
		anyhow::bail!(
			"{} HelmRelease(s) could not be deleted",
			report.failed.len()
		);
	}
	Ok(())
}

/// Ask `prompter` about every namespace in `orphans`.
pub fn review<P: Prompter>(orphans: &OrphanSet, prompter: &mut P) -> Result<CleanupPlan> {
	prompter.intro(orphans.len(), orphans.namespace_count())?;
	drive(CleanupSession::new(orphans), prompter)
}

/// Delete everything in `plan` and print the summary.
#[instrument(skip_all, fields(end = ?plan.end))]
pub async fn apply_plan<D: ReleaseDeleter, W: Write>(
	deleter: &D,
	plan: &CleanupPlan,
	color: bool,
	mut writer: W,
) -> Result<DeletionReport> {
	if plan.deletions.is_empty() {
		writeln!(writer, "\nNothing selected for deletion.")?;
	} else {
		writeln!(
			writer,
			"\nDeleting {} HelmRelease(s)...",
			plan.deletions.len()
		)?;
	}

	let report = execute_plan(deleter, plan, color, &mut writer).await?;
	write_summary(plan, &report, &mut writer)?;
	Ok(report)
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;
	use crate::{
		cleanup::{DeleteError, SessionEnd},
		orphans::{OrphanRecord, OwnerRef, ResourceRef},
	};

	struct AlwaysOk;

	impl ReleaseDeleter for AlwaysOk {
		async fn delete(&self, _release: &ResourceRef) -> Result<(), DeleteError> {
			Ok(())
		}
	}

	fn orphans() -> OrphanSet {
		[("ns1", "svc-a"), ("ns1", "svc-b"), ("ns2", "svc-c")]
			.into_iter()
			.map(|(namespace, name)| OrphanRecord {
				name: name.to_string(),
				namespace: namespace.to_string(),
				original_kustomization: OwnerRef {
					name: "apps".to_string(),
					namespace: "flux-system".to_string(),
				},
			})
			.collect()
	}

	#[tokio::test]
	async fn test_review_then_apply() {
		let orphans = orphans();
		let mut prompter = TerminalPrompter::new(Cursor::new(b"n\ny\n".to_vec()), Vec::new());

		let plan = review(&orphans, &mut prompter).unwrap();
		assert_eq!(plan.end, SessionEnd::Done);

		let mut output = Vec::new();
		let report = apply_plan(&AlwaysOk, &plan, false, &mut output).await.unwrap();
		let output = String::from_utf8(output).unwrap();

		assert_eq!(report.deleted, vec![ResourceRef::new("ns2", "svc-c")]);
		assert!(output.contains("Deleting 1 HelmRelease(s)..."));
		assert!(output.contains("CLEANUP COMPLETE"));
		assert!(output.contains("Skipped: 2\n"));
	}

	#[tokio::test]
	async fn test_quit_first_deletes_nothing() {
		let orphans = orphans();
		let mut prompter = TerminalPrompter::new(Cursor::new(b"q\n".to_vec()), Vec::new());

		let plan = review(&orphans, &mut prompter).unwrap();
		let mut output = Vec::new();
		let report = apply_plan(&AlwaysOk, &plan, false, &mut output).await.unwrap();
		let output = String::from_utf8(output).unwrap();

		assert!(report.deleted.is_empty());
		assert!(output.contains("Nothing selected for deletion."));
		assert!(output.contains("CLEANUP ABORTED"));
		assert!(output.contains("Skipped: 3\n"));
	}
}
