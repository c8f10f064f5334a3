//! Interactive cleanup: review orphans namespace by namespace, then delete
//! what the operator confirmed.

pub mod execute;
pub mod prompt;
pub mod session;

pub use self::{
	execute::{execute_plan, DeleteError, DeletionReport, ReleaseDeleter},
	prompt::{drive, Decision, Inclusion, Prompter, TerminalPrompter},
	session::{CleanupDecision, CleanupPlan, CleanupSession, Input, SessionEnd, SessionState},
};
