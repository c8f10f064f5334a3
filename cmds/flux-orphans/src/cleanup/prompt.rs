//! Operator prompts for the cleanup session.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::warn;

use super::session::{CleanupPlan, CleanupSession, Input, Pending};
use crate::orphans::OrphanRecord;

pub(super) const RULE_WIDTH: usize = 60;

/// Answer to a namespace-wide question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
	DeleteAll,
	Skip,
	Select,
	Quit,
}

impl From<Decision> for Input {
	fn from(decision: Decision) -> Self {
		match decision {
			Decision::DeleteAll => Input::DeleteAll,
			Decision::Skip => Input::Skip,
			Decision::Select => Input::Select,
			Decision::Quit => Input::Quit,
		}
	}
}

/// Answer to a per-release question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
	Include,
	Exclude,
	Quit,
}

impl From<Inclusion> for Input {
	fn from(inclusion: Inclusion) -> Self {
		match inclusion {
			Inclusion::Include => Input::Include,
			Inclusion::Exclude => Input::Exclude,
			Inclusion::Quit => Input::Quit,
		}
	}
}

/// Source of operator answers.
pub trait Prompter {
	/// Called once before the first question.
	fn intro(&mut self, _total: usize, _namespaces: usize) -> io::Result<()> {
		Ok(())
	}

	fn decide(&mut self, namespace: &str, records: &[OrphanRecord]) -> io::Result<Decision>;

	fn include(&mut self, record: &OrphanRecord) -> io::Result<Inclusion>;
}

/// Feed prompter answers into `session` until it reaches a terminal state.
pub fn drive<P: Prompter>(mut session: CleanupSession, prompter: &mut P) -> Result<CleanupPlan> {
	while let Some(pending) = session.pending() {
		let input: Input = match pending {
			Pending::Decision { namespace, records } => prompter.decide(namespace, records)?.into(),
			Pending::Include { record, .. } => prompter.include(record)?.into(),
		};
		session.apply(input)?;
	}
	Ok(session.finish())
}

/// Line-based prompter, reading answers from `input` and writing questions to `output`.
///
/// Unknown answers are asked again. End of input counts as quit.
pub struct TerminalPrompter<R, W> {
	input: R,
	output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
	pub fn new(input: R, output: W) -> Self {
		Self { input, output }
	}

	pub fn into_output(self) -> W {
		self.output
	}

	/// Ask `question` until `parse` accepts the answer. `None` on end of input.
	fn ask<T>(
		&mut self,
		question: &str,
		retry: &str,
		parse: impl Fn(&str) -> Option<T>,
	) -> io::Result<Option<T>> {
		loop {
			write!(self.output, "{question}")?;
			self.output.flush()?;

			let mut line = Vec::new();
			if self.input.read_until(b'\n', &mut line)? == 0 {
				writeln!(self.output)?;
				return Ok(None);
			}

			let line = String::from_utf8_lossy(&line);
			if let Some(answer) = parse(line.trim().to_lowercase().as_str()) {
				return Ok(Some(answer));
			}
			writeln!(self.output, "{retry}")?;
		}
	}
}

fn parse_decision(answer: &str) -> Option<Decision> {
	match answer {
		"y" | "yes" => Some(Decision::DeleteAll),
		"n" | "no" => Some(Decision::Skip),
		"s" | "select" => Some(Decision::Select),
		"q" | "quit" => Some(Decision::Quit),
		_ => None,
	}
}

fn parse_inclusion(answer: &str) -> Option<Inclusion> {
	match answer {
		"y" | "yes" => Some(Inclusion::Include),
		"n" | "no" => Some(Inclusion::Exclude),
		"q" | "quit" => Some(Inclusion::Quit),
		_ => None,
	}
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
	fn intro(&mut self, total: usize, namespaces: usize) -> io::Result<()> {
		let rule = "=".repeat(RULE_WIDTH);
		writeln!(self.output, "\n{rule}")?;
		writeln!(self.output, "ORPHANED HELMRELEASE CLEANUP")?;
		writeln!(self.output, "{rule}")?;
		writeln!(
			self.output,
			"\nFound {total} orphaned HelmReleases in {namespaces} namespaces."
		)?;
		writeln!(self.output, "\nYou will be prompted for each namespace.")?;
		writeln!(
			self.output,
			"Options: [y]es delete all in namespace, [n]o skip namespace, [s]elect individual, [q]uit"
		)
	}

	fn decide(&mut self, namespace: &str, records: &[OrphanRecord]) -> io::Result<Decision> {
		writeln!(self.output, "\n{}", "─".repeat(RULE_WIDTH))?;
		writeln!(self.output, "Namespace: {namespace}")?;
		writeln!(self.output, "Orphaned HelmReleases ({}):", records.len())?;
		for record in records {
			writeln!(
				self.output,
				"  - {} (was managed by: {})",
				record.name, record.original_kustomization
			)?;
		}

		let question = format!(
			"\nDelete all {} HelmReleases in '{namespace}'? [y/n/s/q]: ",
			records.len()
		);
		let answer = self.ask(
			&question,
			"Invalid choice. Please enter y, n, s, or q.",
			parse_decision,
		)?;
		Ok(answer.unwrap_or_else(|| {
			warn!(namespace, "input closed, stopping cleanup");
			Decision::Quit
		}))
	}

	fn include(&mut self, record: &OrphanRecord) -> io::Result<Inclusion> {
		let question = format!(
			"  Delete '{}' (was managed by: {})? [y/n/q]: ",
			record.name, record.original_kustomization
		);
		let answer = self.ask(
			&question,
			"  Invalid choice. Please enter y, n, or q.",
			parse_inclusion,
		)?;
		Ok(answer.unwrap_or_else(|| {
			warn!(release = %record.reference(), "input closed, stopping cleanup");
			Inclusion::Quit
		}))
	}
}
