//! Running a cleanup plan against a deleter.

use std::{future::Future, io::Write};

use nu_ansi_term::Color;
use thiserror::Error;
use tracing::instrument;

use super::{
	prompt::RULE_WIDTH,
	session::{CleanupPlan, SessionEnd},
};
use crate::orphans::ResourceRef;

/// Failure to delete a single release.
#[derive(Debug, Error)]
#[error("deleting {release}")]
pub struct DeleteError {
	pub release: ResourceRef,
	#[source]
	pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// Something that can delete one release.
pub trait ReleaseDeleter {
	fn delete(&self, release: &ResourceRef) -> impl Future<Output = Result<(), DeleteError>> + Send;
}

/// Per-item outcome of running a plan.
#[derive(Debug, Default)]
pub struct DeletionReport {
	pub deleted: Vec<ResourceRef>,
	pub failed: Vec<DeleteError>,
}

impl DeletionReport {
	pub fn has_failures(&self) -> bool {
		!self.failed.is_empty()
	}
}

/// Delete every planned release, one at a time, in plan order.
///
/// A failed deletion is reported and the next item is attempted anyway.
#[instrument(skip_all, fields(planned = plan.deletions.len()))]
pub async fn execute_plan<D: ReleaseDeleter, W: Write>(
	deleter: &D,
	plan: &CleanupPlan,
	color: bool,
	mut writer: W,
) -> std::io::Result<DeletionReport> {
	let mut report = DeletionReport::default();

	for record in &plan.deletions {
		let release = record.reference();
		match deleter.delete(&release).await {
			Ok(()) => {
				writeln!(
					writer,
					"  {} Deleted HelmRelease {release}",
					paint(Color::Green, "✓", color)
				)?;
				report.deleted.push(release);
			}
			Err(e) => {
				tracing::warn!(%release, error = %e.source, "delete failed");
				writeln!(
					writer,
					"  {} Failed to delete HelmRelease {release}: {}",
					paint(Color::Red, "✗", color),
					e.source
				)?;
				report.failed.push(e);
			}
		}
	}

	Ok(report)
}

/// List what would be deleted without touching the cluster.
pub fn write_dry_run<W: Write>(plan: &CleanupPlan, mut writer: W) -> std::io::Result<()> {
	if plan.deletions.is_empty() {
		return writeln!(writer, "\nDry-run mode: nothing selected for deletion.");
	}
	writeln!(
		writer,
		"\nDry-run mode: {} HelmRelease(s) would be deleted:",
		plan.deletions.len()
	)?;
	for record in &plan.deletions {
		writeln!(writer, "  - {}", record.reference())?;
	}
	Ok(())
}

/// Closing summary: deleted, failed and skipped counts.
pub fn write_summary<W: Write>(
	plan: &CleanupPlan,
	report: &DeletionReport,
	mut writer: W,
) -> std::io::Result<()> {
	let rule = "=".repeat(RULE_WIDTH);
	let title = match plan.end {
		SessionEnd::Done => "CLEANUP COMPLETE",
		SessionEnd::Aborted => "CLEANUP ABORTED",
	};
	writeln!(writer, "\n{rule}")?;
	writeln!(writer, "{title}")?;
	writeln!(writer, "{rule}")?;
	writeln!(writer, "Deleted: {}", report.deleted.len())?;
	if report.has_failures() {
		writeln!(writer, "Failed: {}", report.failed.len())?;
		for failure in &report.failed {
			writeln!(writer, "  - {}", failure.release)?;
		}
	}
	writeln!(writer, "Skipped: {}", plan.skipped())
}

fn paint(color: Color, text: &str, enabled: bool) -> String {
	if enabled {
		color.paint(text).to_string()
	} else {
		text.to_string()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;

	use indoc::indoc;

	use super::*;
	use crate::{
		cleanup::session::{CleanupSession, Input},
		orphans::{OrphanRecord, OrphanSet, OwnerRef},
	};

	/// Records calls and fails for the configured names.
	#[derive(Default)]
	struct FakeDeleter {
		fail: Vec<&'static str>,
		calls: Mutex<Vec<ResourceRef>>,
	}

	impl ReleaseDeleter for FakeDeleter {
		async fn delete(&self, release: &ResourceRef) -> Result<(), DeleteError> {
			self.calls.lock().unwrap().push(release.clone());
			if self.fail.contains(&release.name.as_str()) {
				return Err(DeleteError {
					release: release.clone(),
					source: "forbidden".into(),
				});
			}
			Ok(())
		}
	}

	fn plan(records: &[(&str, &str)], inputs: &[Input]) -> CleanupPlan {
		let set: OrphanSet = records
			.iter()
			.map(|(namespace, name)| OrphanRecord {
				name: name.to_string(),
				namespace: namespace.to_string(),
				original_kustomization: OwnerRef {
					name: "apps".to_string(),
					namespace: "flux-system".to_string(),
				},
			})
			.collect();
		let mut session = CleanupSession::new(&set);
		for input in inputs {
			session.apply(*input).unwrap();
		}
		session.finish()
	}

	#[tokio::test]
	async fn test_failure_does_not_stop_remaining_items() {
		let plan = plan(&[("ns1", "a"), ("ns1", "b"), ("ns1", "c")], &[Input::DeleteAll]);
		let deleter = FakeDeleter {
			fail: vec!["b"],
			..Default::default()
		};
		let mut output = Vec::new();

		let report = execute_plan(&deleter, &plan, false, &mut output)
			.await
			.unwrap();

		assert_eq!(
			*deleter.calls.lock().unwrap(),
			vec![
				ResourceRef::new("ns1", "a"),
				ResourceRef::new("ns1", "b"),
				ResourceRef::new("ns1", "c"),
			]
		);
		assert_eq!(
			report.deleted,
			vec![ResourceRef::new("ns1", "a"), ResourceRef::new("ns1", "c")]
		);
		assert_eq!(report.failed.len(), 1);
		assert_eq!(report.failed[0].release, ResourceRef::new("ns1", "b"));
		assert_eq!(
			String::from_utf8(output).unwrap(),
			"  ✓ Deleted HelmRelease ns1/a\n  \
			 ✗ Failed to delete HelmRelease ns1/b: forbidden\n  \
			 ✓ Deleted HelmRelease ns1/c\n"
		);
	}

	#[tokio::test]
	async fn test_empty_plan_deletes_nothing() {
		let plan = plan(&[("ns1", "a")], &[Input::Skip]);
		let deleter = FakeDeleter::default();

		let report = execute_plan(&deleter, &plan, false, Vec::new()).await.unwrap();

		assert!(deleter.calls.lock().unwrap().is_empty());
		assert!(report.deleted.is_empty());
		assert!(!report.has_failures());
	}

	#[test]
	fn test_summary_after_abort() {
		let plan = plan(&[("ns1", "a"), ("ns2", "b")], &[Input::DeleteAll, Input::Quit]);
		let report = DeletionReport {
			deleted: vec![ResourceRef::new("ns1", "a")],
			failed: Vec::new(),
		};
		let mut output = Vec::new();

		write_summary(&plan, &report, &mut output).unwrap();

		let output = String::from_utf8(output).unwrap();
		let rule = "=".repeat(RULE_WIDTH);
		assert!(output.starts_with(&format!("\n{rule}\nCLEANUP ABORTED\n{rule}\n")));
		assert!(output.contains("Deleted: 1\n"));
		assert!(output.contains("Skipped: 1\n"));
		assert!(!output.contains("Failed"));
	}

	#[test]
	fn test_dry_run_lists_plan() {
		let plan = plan(&[("ns1", "a"), ("ns1", "b")], &[Input::DeleteAll]);
		let mut output = Vec::new();

		write_dry_run(&plan, &mut output).unwrap();

		assert_eq!(
			String::from_utf8(output).unwrap(),
			indoc! {"

                Dry-run mode: 2 HelmRelease(s) would be deleted:
                  - ns1/a
                  - ns1/b
            "}
		);
	}
}
