//! Git invocation layer for history replay
//!
//! Handles:
//! - Identity/date injection per invocation
//! - Branch switching with create-on-missing
//! - Staging, removal, commits, merges and annotated tags
//! - In-memory recording for dry runs and tests

mod context;
mod operations;
mod recording;

pub use context::InvocationContext;
pub use operations::GitCli;
pub use recording::{Invocation, RecordingTool};

use anyhow::Result;

/// Env var that turns on stderr diagnostics for the whole crate
pub const LOG_ENV_VAR: &str = "HISTORY_REPLAY_LOG";

pub(crate) fn log_debug(module: &str, msg: &str) {
    if std::env::var(LOG_ENV_VAR).is_ok() {
        eprintln!("[DEBUG {}] {}", module, msg);
    }
}

/// Result of one external tool step.
///
/// A non-zero exit is a value, not an error: the replay driver decides
/// whether to keep going. `Err` from a [`VcsTool`] method is reserved for
/// faults such as git not being spawnable at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Success,
    Failure { step: String, stderr: String },
}

impl ToolOutcome {
    pub fn failure(step: impl Into<String>, stderr: impl Into<String>) -> Self {
        ToolOutcome::Failure {
            step: step.into(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success)
    }

    /// One-line description for console output
    pub fn describe(&self) -> Option<String> {
        match self {
            ToolOutcome::Success => None,
            ToolOutcome::Failure { step, stderr } => {
                let first = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
                if first.is_empty() {
                    Some(format!("{} failed", step))
                } else {
                    Some(format!("{} failed: {}", step, first.trim()))
                }
            }
        }
    }
}

/// The invocation shapes a replay needs from a version-control tool
pub trait VcsTool {
    /// Check out `branch`, creating it from HEAD if it does not exist yet
    fn switch_branch(&mut self, branch: &str) -> Result<ToolOutcome>;

    /// Stage exactly the given paths
    fn stage(&mut self, paths: &[String]) -> Result<ToolOutcome>;

    /// Stage every modified/untracked path, then unstage `excluded`
    fn stage_all_except(&mut self, excluded: &[String]) -> Result<ToolOutcome>;

    /// Remove a path from the working tree and the index
    fn remove(&mut self, path: &str) -> Result<ToolOutcome>;

    fn commit(
        &mut self,
        message: &str,
        ctx: &InvocationContext,
        allow_empty: bool,
    ) -> Result<ToolOutcome>;

    /// Non-fast-forward merge of `source` into the current branch
    fn merge(&mut self, source: &str, message: &str, ctx: &InvocationContext)
        -> Result<ToolOutcome>;

    /// Annotated tag on the current HEAD
    fn tag(&mut self, name: &str, message: &str, ctx: &InvocationContext) -> Result<ToolOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_uses_first_stderr_line() {
        let outcome = ToolOutcome::failure("commit", "\nnothing to commit\nmore detail\n");
        assert_eq!(
            outcome.describe().as_deref(),
            Some("commit failed: nothing to commit")
        );
    }

    #[test]
    fn test_describe_without_stderr() {
        let outcome = ToolOutcome::failure("merge", "");
        assert_eq!(outcome.describe().as_deref(), Some("merge failed"));
        assert_eq!(ToolOutcome::Success.describe(), None);
    }
}
