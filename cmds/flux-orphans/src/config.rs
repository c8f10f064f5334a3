//! Configuration file support for flux-orphans
//!
//! Supports `.flux-orphans.yaml` files placed anywhere in the directory
//! hierarchy. flux-orphans searches from the working directory upward to the
//! filesystem root, unless a file is passed with `--config`.
//!
//! ```yaml
//! ownerLabels:
//!   name: example.com/owner-name
//!   namespace: example.com/owner-namespace
//! release:
//!   version: v2beta2
//! output: json
//! ```

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
	k8s::resources::{ApiKind, FluxApis},
	orphans::{DetectionConfig, OwnerLabels},
	output::OutputFormat,
};

/// The name of the config file flux-orphans looks for
pub const CONFIG_FILE_NAME: &str = ".flux-orphans.yaml";

/// Root configuration structure for .flux-orphans.yaml
///
/// Every field is optional. Unset fields fall back to the Flux defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
	/// Label keys naming the owning Kustomization
	#[serde(default)]
	pub owner_labels: OwnerLabelsConfig,

	/// API coordinates of the release kind
	#[serde(default)]
	pub release: ApiKindConfig,

	/// API coordinates of the kind whose inventory is consulted
	#[serde(default)]
	pub bundle: ApiKindConfig,

	/// Default output format for `find`
	#[serde(default)]
	pub output: Option<OutputFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OwnerLabelsConfig {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiKindConfig {
	#[serde(default)]
	pub group: Option<String>,
	#[serde(default)]
	pub version: Option<String>,
	#[serde(default)]
	pub kind: Option<String>,
	#[serde(default)]
	pub plural: Option<String>,
}

fn override_with<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
	if value.is_some() {
		target.clone_from(value);
	}
}

impl ApiKindConfig {
	fn merge_from(&mut self, other: &ApiKindConfig) {
		override_with(&mut self.group, &other.group);
		override_with(&mut self.version, &other.version);
		override_with(&mut self.kind, &other.kind);
		override_with(&mut self.plural, &other.plural);
	}

	/// Fill unset fields from `defaults`.
	fn resolve(&self, defaults: ApiKind) -> ApiKind {
		ApiKind {
			group: self.group.clone().unwrap_or(defaults.group),
			version: self.version.clone().unwrap_or(defaults.version),
			kind: self.kind.clone().unwrap_or(defaults.kind),
			plural: self.plural.clone().unwrap_or(defaults.plural),
		}
	}
}

impl Config {
	/// Load config by searching from the given directory upward
	pub fn load_from_directory(start_dir: &Path) -> Result<Option<Self>> {
		if let Some(config_path) = find_config_file(start_dir) {
			let config = Self::load_from_file(&config_path)?;
			Ok(Some(config))
		} else {
			Ok(None)
		}
	}

	/// Load config from a specific file path
	pub fn load_from_file(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)
			.with_context(|| format!("failed to read config file: {}", path.display()))?;
		let config: Config = serde_yaml_with_quirks::from_str(&content)
			.with_context(|| format!("failed to parse config file: {}", path.display()))?;
		tracing::debug!(path = %path.display(), "loaded config file");
		Ok(config)
	}

	/// Load `explicit` if given, otherwise search upward from `start_dir`.
	pub fn discover(explicit: Option<&Path>, start_dir: &Path) -> Result<Self> {
		match explicit {
			Some(path) => Self::load_from_file(path),
			None => Ok(Self::load_from_directory(start_dir)?.unwrap_or_default()),
		}
	}

	/// Merge `other` over this config. Only fields set in `other` override.
	pub fn merge_from(&mut self, other: &Config) {
		override_with(&mut self.owner_labels.name, &other.owner_labels.name);
		override_with(&mut self.owner_labels.namespace, &other.owner_labels.namespace);
		self.release.merge_from(&other.release);
		self.bundle.merge_from(&other.bundle);
		override_with(&mut self.output, &other.output);
	}

	/// API coordinates, with defaults for anything unset.
	pub fn apis(&self) -> FluxApis {
		let defaults = FluxApis::default();
		FluxApis {
			bundle: self.bundle.resolve(defaults.bundle),
			release: self.release.resolve(defaults.release),
		}
	}

	/// Detection settings derived from the release kind and the owner labels.
	pub fn detection(&self) -> DetectionConfig {
		let defaults = OwnerLabels::default();
		DetectionConfig {
			release: self.apis().release.release_kind(),
			labels: OwnerLabels {
				name: self.owner_labels.name.clone().unwrap_or(defaults.name),
				namespace: self
					.owner_labels
					.namespace
					.clone()
					.unwrap_or(defaults.namespace),
			},
		}
	}
}

/// Search for a config file starting from `start_dir` and walking up to the filesystem root
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
	let start = start_dir
		.canonicalize()
		.unwrap_or_else(|_| start_dir.to_path_buf());

	start
		.ancestors()
		.map(|dir| dir.join(CONFIG_FILE_NAME))
		.find(|candidate| candidate.is_file())
}
