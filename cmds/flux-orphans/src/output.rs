//! Rendering an [`OrphanSet`] for `find`.

use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabwriter::TabWriter;
use thiserror::Error;

use crate::orphans::{OrphanRecord, OrphanSet};

/// Errors that can occur while writing results.
#[derive(Debug, Error)]
pub enum OutputError {
	#[error("writing output")]
	Write(#[from] std::io::Error),

	#[error("serializing output as JSON")]
	Json(#[from] serde_json::Error),

	#[error("serializing output as YAML")]
	Yaml(#[from] serde_yaml::Error),
}

/// Output format for `find`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
	/// Aligned columns with a total line
	#[default]
	Table,
	/// Array of records
	Json,
	/// Sequence of records
	Yaml,
}

/// Write `orphans` in `format`.
///
/// Records come out grouped by namespace, and sorted by name within a namespace.
pub fn write_orphans<W: Write>(
	orphans: &OrphanSet,
	format: OutputFormat,
	mut writer: W,
) -> Result<(), OutputError> {
	match format {
		OutputFormat::Table => write_table(orphans, &mut writer)?,
		OutputFormat::Json => {
			let records: Vec<&OrphanRecord> = orphans.iter().collect();
			serde_json::to_writer_pretty(&mut writer, &records)?;
			writeln!(writer)?;
		}
		OutputFormat::Yaml => {
			let records: Vec<&OrphanRecord> = orphans.iter().collect();
			serde_yaml::to_writer(&mut writer, &records)?;
		}
	}
	writer.flush()?;
	Ok(())
}

fn write_table<W: Write>(orphans: &OrphanSet, writer: &mut W) -> std::io::Result<()> {
	if orphans.is_empty() {
		return writeln!(writer, "No orphaned HelmReleases found.");
	}

	let mut tw = TabWriter::new(&mut *writer).padding(3);
	writeln!(tw, "NAMESPACE\tNAME\tORIGINAL KUSTOMIZATION")?;
	for record in orphans.iter() {
		writeln!(
			tw,
			"{}\t{}\t{}",
			record.namespace, record.name, record.original_kustomization
		)?;
	}
	tw.flush()?;
	drop(tw);

	writeln!(writer, "\nTotal orphaned HelmReleases: {}", orphans.len())
}

#[cfg(test)]
mod tests {
	use indoc::indoc;

	use super::*;
	use crate::orphans::OwnerRef;

	fn sample() -> OrphanSet {
		[("ns2", "svc-c", "infra"), ("ns1", "svc-b", "apps"), ("ns1", "svc-a", "apps")]
			.into_iter()
			.map(|(namespace, name, owner)| OrphanRecord {
				name: name.to_string(),
				namespace: namespace.to_string(),
				original_kustomization: OwnerRef {
					name: owner.to_string(),
					namespace: "flux-system".to_string(),
				},
			})
			.collect()
	}

	fn render(orphans: &OrphanSet, format: OutputFormat) -> String {
		let mut output = Vec::new();
		write_orphans(orphans, format, &mut output).unwrap();
		String::from_utf8(output).unwrap()
	}

	#[test]
	fn test_table() {
		assert_eq!(
			render(&sample(), OutputFormat::Table),
			indoc! {"
				NAMESPACE   NAME    ORIGINAL KUSTOMIZATION
				ns1         svc-a   flux-system/apps
				ns1         svc-b   flux-system/apps
				ns2         svc-c   flux-system/infra

				Total orphaned HelmReleases: 3
			"}
		);
	}

	#[test]
	fn test_table_empty() {
		assert_eq!(
			render(&OrphanSet::default(), OutputFormat::Table),
			"No orphaned HelmReleases found.\n"
		);
	}

	#[test]
	fn test_json_shape() {
		let output = render(&sample(), OutputFormat::Json);
		let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

		assert_eq!(
			parsed[0],
			serde_json::json!({
				"name": "svc-a",
				"namespace": "ns1",
				"originalKustomization": { "name": "apps", "namespace": "flux-system" }
			})
		);
		assert_eq!(parsed.as_array().unwrap().len(), 3);
	}

	#[test]
	fn test_json_empty_is_empty_array() {
		assert_eq!(render(&OrphanSet::default(), OutputFormat::Json), "[]\n");
	}

	#[test]
	fn test_yaml() {
		let orphans: OrphanSet = sample().iter().take(1).cloned().collect();
		assert_eq!(
			render(&orphans, OutputFormat::Yaml),
			indoc! {"
				- name: svc-a
				  namespace: ns1
				  originalKustomization:
				    name: apps
				    namespace: flux-system
			"}
		);
	}
}
