use clap::{Parser, Subcommand};
use tracing::Level;

pub mod cleanup;
pub mod complete;
pub mod find;
pub mod util;

#[derive(Parser)]
#[command(name = "flux-orphans")]
#[command(about = "Find Flux HelmReleases no Kustomization inventory accounts for", long_about = None)]
#[command(version = env!("FLUX_ORPHANS_VERSION"))]
pub struct Cli {
	/// Log level (trace, debug, info, warn, error). Overrides RUST_LOG
	#[arg(long, global = true)]
	pub log_level: Option<Level>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
	/// List orphaned HelmReleases
	Find(find::FindArgs),

	/// Interactively delete orphaned HelmReleases
	Cleanup(cleanup::CleanupArgs),

	/// Print shell completions
	Complete(complete::CompleteArgs),
}
