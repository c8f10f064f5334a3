use anyhow::Result;
use clap::Parser;
use flux_orphans::{
	commands::{self, util::BrokenPipeGuard, Cli, Commands},
	telemetry,
};

#[cfg(all(
	target_os = "linux",
	feature = "mimalloc",
	not(feature = "system-alloc")
))]
#[global_allocator]
static GLOBAL: mimallocator::Mimalloc = mimallocator::Mimalloc;

fn main() -> Result<()> {
	let cli = Cli::parse();

	let _telemetry = telemetry::init(cli.log_level)?;

	let stdout = BrokenPipeGuard::new(std::io::stdout());

	match cli.command {
		Commands::Find(args) => commands::find::run(args, stdout),
		Commands::Cleanup(args) => commands::cleanup::run(args, stdout),
		Commands::Complete(args) => commands::complete::run(args, stdout),
	}
}
