//! In-memory [`VcsTool`] used for dry runs and tests
//!
//! Tracks just enough repository state (branches, working-tree paths,
//! index) to fail the way git would for missing paths and empty commits.

use super::{InvocationContext, ToolOutcome, VcsTool};
use anyhow::Result;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// One recorded tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    SwitchBranch {
        branch: String,
        created: bool,
    },
    Stage {
        paths: Vec<String>,
    },
    StageAllExcept {
        excluded: Vec<String>,
    },
    Remove {
        path: String,
    },
    Commit {
        message: String,
        ctx: InvocationContext,
        allow_empty: bool,
        staged: Vec<String>,
    },
    Merge {
        source: String,
        message: String,
        ctx: InvocationContext,
    },
    Tag {
        name: String,
        message: String,
        ctx: InvocationContext,
    },
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::SwitchBranch { branch, created } => {
                if *created {
                    write!(f, "git checkout -b {}", branch)
                } else {
                    write!(f, "git checkout {}", branch)
                }
            }
            Invocation::Stage { paths } => write!(f, "git add -- {}", paths.join(" ")),
            Invocation::StageAllExcept { excluded } => {
                write!(f, "git add -A")?;
                if !excluded.is_empty() {
                    write!(f, " && git reset -- {}", excluded.join(" "))?;
                }
                Ok(())
            }
            Invocation::Remove { path } => write!(f, "git rm -- {}", path),
            Invocation::Commit {
                message,
                ctx,
                allow_empty,
                ..
            } => write!(
                f,
                "git commit{} -m {:?}  # {} <{}> @ {}",
                if *allow_empty { " --allow-empty" } else { "" },
                first_line(message),
                ctx.author_name,
                ctx.author_email,
                ctx.timestamp
            ),
            Invocation::Merge {
                source,
                message,
                ctx,
            } => write!(
                f,
                "git merge --no-ff {} -m {:?}  # {} @ {}",
                source, message, ctx.author_name, ctx.timestamp
            ),
            Invocation::Tag { name, message, ctx } => write!(
                f,
                "git tag -a {} -m {:?}  # {} @ {}",
                name,
                first_line(message),
                ctx.author_name,
                ctx.timestamp
            ),
        }
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Records every call instead of touching a repository
#[derive(Debug, Default)]
pub struct RecordingTool {
    invocations: Vec<Invocation>,
    branches: BTreeSet<String>,
    current: Option<String>,
    worktree: BTreeSet<String>,
    staged: BTreeSet<String>,
    assume_present: bool,
    failing_steps: HashSet<String>,
}

impl RecordingTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder for a dry run: every path is assumed present, so staging
    /// and removal succeed the way they would in a populated checkout.
    pub fn permissive() -> Self {
        Self {
            assume_present: true,
            ..Self::default()
        }
    }

    /// Pretend these paths exist (modified or untracked) in the working tree
    pub fn with_files<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.worktree.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branches.insert(branch.to_string());
        if self.current.is_none() {
            self.current = Some(branch.to_string());
        }
        self
    }

    /// Make every invocation of `step` ("commit", "merge", ...) fail
    pub fn failing(mut self, step: &str) -> Self {
        self.failing_steps.insert(step.to_string());
        self
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    pub fn current_branch(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn has_path(&self, path: &str) -> bool {
        self.assume_present || self.worktree.contains(path)
    }

    fn forced_failure(&self, step: &str) -> Option<ToolOutcome> {
        self.failing_steps
            .contains(step)
            .then(|| ToolOutcome::failure(step, "simulated failure"))
    }
}

impl VcsTool for RecordingTool {
    fn switch_branch(&mut self, branch: &str) -> Result<ToolOutcome> {
        let created = self.branches.insert(branch.to_string());
        self.invocations.push(Invocation::SwitchBranch {
            branch: branch.to_string(),
            created,
        });
        if let Some(failure) = self.forced_failure("checkout") {
            return Ok(failure);
        }
        self.current = Some(branch.to_string());
        Ok(ToolOutcome::Success)
    }

    fn stage(&mut self, paths: &[String]) -> Result<ToolOutcome> {
        self.invocations.push(Invocation::Stage {
            paths: paths.to_vec(),
        });

        let missing: Vec<String> = paths
            .iter()
            .filter(|p| !self.has_path(p))
            .map(|p| format!("fatal: pathspec '{}' did not match any files", p))
            .collect();
        let present: Vec<String> = paths.iter().filter(|p| self.has_path(p)).cloned().collect();
        self.staged.extend(present);

        if missing.is_empty() {
            Ok(ToolOutcome::Success)
        } else {
            Ok(ToolOutcome::failure("add", missing.join("\n")))
        }
    }

    fn stage_all_except(&mut self, excluded: &[String]) -> Result<ToolOutcome> {
        self.invocations.push(Invocation::StageAllExcept {
            excluded: excluded.to_vec(),
        });

        let everything: Vec<String> = self
            .worktree
            .iter()
            .filter(|p| !excluded.contains(p))
            .cloned()
            .collect();
        self.staged.extend(everything);
        Ok(ToolOutcome::Success)
    }

    fn remove(&mut self, path: &str) -> Result<ToolOutcome> {
        self.invocations.push(Invocation::Remove {
            path: path.to_string(),
        });

        if !self.has_path(path) {
            return Ok(ToolOutcome::failure(
                "rm",
                format!("fatal: pathspec '{}' did not match any files", path),
            ));
        }
        self.worktree.remove(path);
        self.staged.insert(path.to_string());
        Ok(ToolOutcome::Success)
    }

    fn commit(
        &mut self,
        message: &str,
        ctx: &InvocationContext,
        allow_empty: bool,
    ) -> Result<ToolOutcome> {
        let staged: Vec<String> = std::mem::take(&mut self.staged).into_iter().collect();
        let empty = staged.is_empty();
        self.invocations.push(Invocation::Commit {
            message: message.to_string(),
            ctx: ctx.clone(),
            allow_empty,
            staged,
        });

        if let Some(failure) = self.forced_failure("commit") {
            return Ok(failure);
        }
        if empty && !allow_empty {
            return Ok(ToolOutcome::failure("commit", "nothing to commit, working tree clean"));
        }
        Ok(ToolOutcome::Success)
    }

    fn merge(
        &mut self,
        source: &str,
        message: &str,
        ctx: &InvocationContext,
    ) -> Result<ToolOutcome> {
        self.invocations.push(Invocation::Merge {
            source: source.to_string(),
            message: message.to_string(),
            ctx: ctx.clone(),
        });

        if let Some(failure) = self.forced_failure("merge") {
            return Ok(failure);
        }
        if !self.branches.contains(source) {
            return Ok(ToolOutcome::failure(
                "merge",
                format!("merge: {} - not something we can merge", source),
            ));
        }
        Ok(ToolOutcome::Success)
    }

    fn tag(&mut self, name: &str, message: &str, ctx: &InvocationContext) -> Result<ToolOutcome> {
        self.invocations.push(Invocation::Tag {
            name: name.to_string(),
            message: message.to_string(),
            ctx: ctx.clone(),
        });
        Ok(self.forced_failure("tag").unwrap_or(ToolOutcome::Success))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> InvocationContext {
        InvocationContext::new("Ada", "ada@example.com", "2025-10-18 09:00:00")
    }

    #[test]
    fn test_switch_records_creation_once() {
        let mut tool = RecordingTool::new();
        tool.switch_branch("main").unwrap();
        tool.switch_branch("main").unwrap();

        assert_eq!(
            tool.invocations(),
            &[
                Invocation::SwitchBranch { branch: "main".into(), created: true },
                Invocation::SwitchBranch { branch: "main".into(), created: false },
            ]
        );
        assert_eq!(tool.current_branch(), Some("main"));
    }

    #[test]
    fn test_commit_without_staged_changes_needs_allow_empty() {
        let mut tool = RecordingTool::new();
        assert!(tool.commit("empty", &ctx(), true).unwrap().is_success());
        assert!(!tool.commit("empty", &ctx(), false).unwrap().is_success());
    }

    #[test]
    fn test_remove_missing_path_fails() {
        let mut tool = RecordingTool::new().with_files(["a.txt"]);
        assert!(tool.remove("a.txt").unwrap().is_success());
        assert!(!tool.remove("a.txt").unwrap().is_success());
    }

    #[test]
    fn test_permissive_accepts_any_path() {
        let mut tool = RecordingTool::permissive();
        assert!(tool.stage(&["whatever.rs".to_string()]).unwrap().is_success());
        assert!(tool.remove("gone.rs").unwrap().is_success());
    }

    #[test]
    fn test_display_renders_git_command() {
        let inv = Invocation::Commit {
            message: "feat: X\n\nbody".into(),
            ctx: ctx(),
            allow_empty: true,
            staged: vec![],
        };
        assert_eq!(
            inv.to_string(),
            "git commit --allow-empty -m \"feat: X\"  # Ada <ada@example.com> @ 2025-10-18 09:00:00"
        );
    }
}
