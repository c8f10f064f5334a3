//! Complete command handler.

use std::io::Write;

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::Shell;

use super::Cli;

#[derive(Args)]
pub struct CompleteArgs {
	/// Shell to generate completions for
	#[arg(value_enum)]
	pub shell: Shell,
}

/// Print a completion script for `args.shell`.
pub fn run<W: Write>(args: CompleteArgs, mut writer: W) -> Result<()> {
	let mut command = Cli::command();
	let name = command.get_name().to_string();
	clap_complete::generate(args.shell, &mut command, name, &mut writer);
	Ok(())
}
