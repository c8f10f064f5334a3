//! Per-namespace review state machine.
//!
//! The session never blocks on input itself. Callers ask [`CleanupSession::pending`]
//! what needs answering, collect the answer however they like and feed it back
//! through [`CleanupSession::apply`]. Scripted inputs drive it just as well
//! as a terminal.

use std::fmt;

use thiserror::Error;

use crate::orphans::{OrphanRecord, OrphanSet};

/// Operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
	/// Delete every orphan in the namespace under review.
	DeleteAll,
	/// Leave the namespace alone.
	Skip,
	/// Decide record by record.
	Select,
	/// Include the record under selection.
	Include,
	/// Exclude the record under selection.
	Exclude,
	/// Stop reviewing. Already resolved namespaces are kept.
	Quit,
}

impl fmt::Display for Input {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Input::DeleteAll => write!(f, "delete-all"),
			Input::Skip => write!(f, "skip"),
			Input::Select => write!(f, "select"),
			Input::Include => write!(f, "include"),
			Input::Exclude => write!(f, "exclude"),
			Input::Quit => write!(f, "quit"),
		}
	}
}

/// Outcome of reviewing one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupDecision {
	DeleteAll,
	Skip,
	DeleteSelected(Vec<OrphanRecord>),
	Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecision {
	pub namespace: String,
	pub decision: CleanupDecision,
}

/// Where the session is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
	/// Waiting for a decision on `groups[group]`.
	Reviewing { group: usize },
	/// Walking `groups[group]` record by record. `selected` only becomes
	/// part of the plan once the last record has been answered.
	Selecting {
		group: usize,
		cursor: usize,
		selected: Vec<OrphanRecord>,
	},
	/// Every namespace was reviewed.
	Done,
	/// The operator quit while reviewing `groups[group]`.
	Aborted { group: usize },
}

impl SessionState {
	fn describe(&self) -> &'static str {
		match self {
			SessionState::Reviewing { .. } => "reviewing a namespace",
			SessionState::Selecting { .. } => "selecting releases",
			SessionState::Done => "done",
			SessionState::Aborted { .. } => "aborted",
		}
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, SessionState::Done | SessionState::Aborted { .. })
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{input}` is not accepted while {state}")]
pub struct TransitionError {
	pub input: Input,
	pub state: &'static str,
}

/// What the session is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending<'a> {
	/// One of delete-all, skip, select or quit for a whole namespace.
	Decision {
		namespace: &'a str,
		records: &'a [OrphanRecord],
	},
	/// Include, exclude or quit for a single record.
	Include {
		record: &'a OrphanRecord,
		/// Zero-based position inside the namespace.
		position: usize,
		total: usize,
	},
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
	Done,
	Aborted,
}

/// Result of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupPlan {
	/// Releases to delete, in review order.
	pub deletions: Vec<OrphanRecord>,
	/// One entry per namespace that got an answer, in review order.
	pub decisions: Vec<NamespaceDecision>,
	pub end: SessionEnd,
	/// Number of orphans that were up for review.
	pub total: usize,
}

impl CleanupPlan {
	/// Orphans that won't be deleted, including namespaces never reviewed.
	pub fn skipped(&self) -> usize {
		self.total - self.deletions.len()
	}
}

#[derive(Debug)]
pub struct CleanupSession {
	groups: Vec<(String, Vec<OrphanRecord>)>,
	state: SessionState,
	deletions: Vec<OrphanRecord>,
	decisions: Vec<NamespaceDecision>,
}

impl CleanupSession {
	/// Queue every namespace of `orphans` for review, in namespace order.
	pub fn new(orphans: &OrphanSet) -> Self {
		let groups: Vec<_> = orphans
			.groups()
			.map(|(namespace, records)| (namespace.to_string(), records.to_vec()))
			.collect();
		let state = if groups.is_empty() {
			SessionState::Done
		} else {
			SessionState::Reviewing { group: 0 }
		};
		Self {
			groups,
			state,
			deletions: Vec::new(),
			decisions: Vec::new(),
		}
	}

	pub fn state(&self) -> &SessionState {
		&self.state
	}

	pub fn is_finished(&self) -> bool {
		self.state.is_terminal()
	}

	/// Releases confirmed for deletion so far.
	pub fn deletions(&self) -> &[OrphanRecord] {
		&self.deletions
	}

	/// The question the session needs answered next, `None` once finished.
	pub fn pending(&self) -> Option<Pending<'_>> {
		match &self.state {
			SessionState::Reviewing { group } => {
				let (namespace, records) = &self.groups[*group];
				Some(Pending::Decision {
					namespace,
					records,
				})
			}
			SessionState::Selecting { group, cursor, .. } => {
				let records = &self.groups[*group].1;
				Some(Pending::Include {
					record: &records[*cursor],
					position: *cursor,
					total: records.len(),
				})
			}
			SessionState::Done | SessionState::Aborted { .. } => None,
		}
	}

	/// Advance the session by one input.
	///
	/// On error the session is left untouched.
	pub fn apply(&mut self, input: Input) -> Result<(), TransitionError> {
		let rejected = TransitionError {
			input,
			state: self.state.describe(),
		};

		self.state = match (std::mem::replace(&mut self.state, SessionState::Done), input) {
			(SessionState::Reviewing { group }, Input::DeleteAll) => {
				self.deletions.extend(self.groups[group].1.iter().cloned());
				self.record(group, CleanupDecision::DeleteAll);
				self.next_after(group)
			}
			(SessionState::Reviewing { group }, Input::Skip) => {
				self.record(group, CleanupDecision::Skip);
				self.next_after(group)
			}
			(SessionState::Reviewing { group }, Input::Select) => SessionState::Selecting {
				group,
				cursor: 0,
				selected: Vec::new(),
			},
			(
				SessionState::Selecting {
					group,
					cursor,
					mut selected,
				},
				Input::Include | Input::Exclude,
			) => {
				let records = &self.groups[group].1;
				if input == Input::Include {
					selected.push(records[cursor].clone());
				}
				if cursor + 1 < records.len() {
					SessionState::Selecting {
						group,
						cursor: cursor + 1,
						selected,
					}
				} else {
					self.deletions.extend(selected.iter().cloned());
					self.record(group, CleanupDecision::DeleteSelected(selected));
					self.next_after(group)
				}
			}
			(SessionState::Reviewing { group } | SessionState::Selecting { group, .. }, Input::Quit) => {
				self.record(group, CleanupDecision::Abort);
				SessionState::Aborted { group }
			}
			(state, _) => {
				self.state = state;
				return Err(rejected);
			}
		};

		Ok(())
	}

	/// Close the session.
	///
	/// A session that is still waiting for input counts as aborted: the
	/// namespace under review contributes nothing.
	pub fn finish(self) -> CleanupPlan {
		let end = match self.state {
			SessionState::Done => SessionEnd::Done,
			_ => SessionEnd::Aborted,
		};
		CleanupPlan {
			total: self.groups.iter().map(|(_, records)| records.len()).sum(),
			deletions: self.deletions,
			decisions: self.decisions,
			end,
		}
	}

	fn record(&mut self, group: usize, decision: CleanupDecision) {
		self.decisions.push(NamespaceDecision {
			namespace: self.groups[group].0.clone(),
			decision,
		});
	}

	fn next_after(&self, group: usize) -> SessionState {
		if group + 1 < self.groups.len() {
			SessionState::Reviewing { group: group + 1 }
		} else {
			SessionState::Done
		}
	}
}
