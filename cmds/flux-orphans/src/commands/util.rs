//! Utilities for command handlers.

use std::{
	io::{self, ErrorKind, IsTerminal, Write},
	path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::{config::Config, k8s::client::ClusterConnection};

/// A writer wrapper that silently handles broken pipe errors.
///
/// Lets `flux-orphans find | head -1` exit cleanly when the reader goes away.
pub struct BrokenPipeGuard<W> {
	inner: W,
}

impl<W> BrokenPipeGuard<W> {
	pub fn new(inner: W) -> Self {
		Self { inner }
	}
}

impl<W: Write> Write for BrokenPipeGuard<W> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		match self.inner.write(buf) {
			Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(buf.len()),
			other => other,
		}
	}

	fn flush(&mut self) -> io::Result<()> {
		match self.inner.flush() {
			Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
			other => other,
		}
	}
}

/// When to colour output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
	/// Colour when stdout is a terminal
	#[default]
	Auto,
	Always,
	Never,
}

impl ColorMode {
	pub fn should_colorize(self) -> bool {
		match self {
			ColorMode::Auto => io::stdout().is_terminal(),
			ColorMode::Always => true,
			ColorMode::Never => false,
		}
	}
}

/// Flags shared by `find` and `cleanup`.
#[derive(Debug, Clone, Default, Args)]
pub struct ClusterArgs {
	/// Only look at this namespace. Applies to Kustomizations and HelmReleases alike
	#[arg(short = 'n', long)]
	pub namespace: Option<String>,

	/// Kubeconfig context to use instead of the current one
	#[arg(long)]
	pub context: Option<String>,

	/// Config file to use instead of searching for .flux-orphans.yaml
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// Controls color in output, must be "auto", "always", or "never"
	#[arg(long, default_value = "auto", value_enum)]
	pub color: ColorMode,
}

impl ClusterArgs {
	/// Load the config file named by `--config`, or the nearest one above the
	/// working directory.
	pub fn load_config(&self) -> Result<Config> {
		let cwd = std::env::current_dir().context("resolving working directory")?;
		Config::discover(self.config.as_deref(), &cwd)
	}

	pub async fn connect(&self) -> Result<ClusterConnection> {
		ClusterConnection::connect(self.context.as_deref())
			.await
			.context("connecting to cluster")
	}
}

/// Create a tokio runtime for async operations.
pub fn create_tokio_runtime() -> Result<tokio::runtime::Runtime> {
	tokio::runtime::Builder::new_multi_thread()
		.enable_all()
		.build()
		.context("creating tokio runtime")
}
