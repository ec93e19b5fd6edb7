//! Low-level git operations

use super::{log_debug, InvocationContext, ToolOutcome, VcsTool};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, Output};

/// [`VcsTool`] backed by the `git` binary, run inside one working directory
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    fn output(&self, args: &[&str], ctx: Option<&InvocationContext>) -> Result<Output> {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.workdir).args(args);
        if let Some(ctx) = ctx {
            cmd.envs(ctx.env_pairs());
        }

        log_debug("git", &format!("git {}", args.join(" ")));

        cmd.output()
            .with_context(|| format!("Failed to run git {}", args.first().unwrap_or(&"")))
    }

    fn run(
        &self,
        step: &str,
        args: &[&str],
        ctx: Option<&InvocationContext>,
    ) -> Result<ToolOutcome> {
        let output = self.output(args, ctx)?;

        if output.status.success() {
            Ok(ToolOutcome::Success)
        } else {
            let mut detail = String::from_utf8_lossy(&output.stderr).to_string();
            if detail.trim().is_empty() {
                // `git commit` reports "nothing to commit" on stdout
                detail = String::from_utf8_lossy(&output.stdout).to_string();
            }
            log_debug(
                "git",
                &format!("{} exited with {}: {}", step, output.status, detail.trim()),
            );
            Ok(ToolOutcome::failure(step, detail))
        }
    }

    /// Check if the working directory is inside a git repository
    pub fn is_repo(&self) -> Result<bool> {
        let output = self.output(&["rev-parse", "--git-dir"], None)?;
        Ok(output.status.success())
    }

    /// Check if a local branch exists
    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        let refname = format!("refs/heads/{}", name);
        let output = self.output(&["rev-parse", "--verify", "--quiet", &refname], None)?;
        Ok(output.status.success())
    }

    /// Get the current branch name (empty on detached HEAD)
    pub fn current_branch(&self) -> Result<String> {
        let output = self.output(&["branch", "--show-current"], None)?;

        if !output.status.success() {
            anyhow::bail!("Failed to get current branch");
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl VcsTool for GitCli {
    fn switch_branch(&mut self, branch: &str) -> Result<ToolOutcome> {
        // Trailing `--` keeps git from reading the name as a pathspec
        let outcome = self.run("checkout", &["checkout", "-q", branch, "--"], None)?;
        if outcome.is_success() {
            return Ok(outcome);
        }

        // Only a missing branch is tolerated; anything else (dirty tree,
        // invalid name) is the event's failure.
        if self.branch_exists(branch)? {
            return Ok(outcome);
        }

        log_debug("git", &format!("branch {} missing, creating it", branch));
        self.run("checkout -b", &["checkout", "-q", "-b", branch], None)
    }

    fn stage(&mut self, paths: &[String]) -> Result<ToolOutcome> {
        let mut failures = Vec::new();

        // One path at a time so a single missing file doesn't drop the rest
        for path in paths {
            let outcome = self.run("add", &["add", "--", path], None)?;
            if let ToolOutcome::Failure { stderr, .. } = outcome {
                failures.push(format!("{}: {}", path, stderr.trim()));
            }
        }

        if failures.is_empty() {
            Ok(ToolOutcome::Success)
        } else {
            Ok(ToolOutcome::failure("add", failures.join("\n")))
        }
    }

    fn stage_all_except(&mut self, excluded: &[String]) -> Result<ToolOutcome> {
        let outcome = self.run("add", &["add", "-A", "--", "."], None)?;
        if !outcome.is_success() {
            return Ok(outcome);
        }

        for path in excluded {
            // Excluded paths that were never staged make reset a no-op
            let reset = self.run("reset", &["reset", "-q", "--", path], None)?;
            if !reset.is_success() {
                return Ok(reset);
            }
        }

        Ok(ToolOutcome::Success)
    }

    fn remove(&mut self, path: &str) -> Result<ToolOutcome> {
        self.run("rm", &["rm", "-q", "-r", "--", path], None)
    }

    fn commit(
        &mut self,
        message: &str,
        ctx: &InvocationContext,
        allow_empty: bool,
    ) -> Result<ToolOutcome> {
        let mut args = vec!["commit", "-q", "-m", message];
        if allow_empty {
            args.push("--allow-empty");
        }
        self.run("commit", &args, Some(ctx))
    }

    fn merge(
        &mut self,
        source: &str,
        message: &str,
        ctx: &InvocationContext,
    ) -> Result<ToolOutcome> {
        let output = self.output(&["merge", "--no-ff", "-m", message, source], Some(ctx))?;
        if output.status.success() {
            return Ok(ToolOutcome::Success);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if stdout.contains("CONFLICT") || stderr.contains("CONFLICT") {
            // Leave the tree clean for the next event
            let abort = self.run("merge --abort", &["merge", "--abort"], None)?;
            if let Some(detail) = abort.describe() {
                log_debug("git", &detail);
            }
            let conflicts: Vec<&str> = stdout
                .lines()
                .filter(|l| l.starts_with("CONFLICT"))
                .collect();
            return Ok(ToolOutcome::failure("merge", conflicts.join("\n")));
        }

        let detail = if stderr.trim().is_empty() { stdout } else { stderr };
        Ok(ToolOutcome::failure("merge", detail.to_string()))
    }

    fn tag(&mut self, name: &str, message: &str, ctx: &InvocationContext) -> Result<ToolOutcome> {
        self.run("tag", &["tag", "-a", name, "-m", message], Some(ctx))
    }
}
