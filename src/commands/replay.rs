use anyhow::{Context, Result};
use colored::*;
use history_replay::git::{GitCli, RecordingTool, VcsTool};
use history_replay::history::{render_event, render_summary, HistoryReplayer, ReplaySummary};
use history_replay::plan::{self, Plan};
use std::path::{Path, PathBuf};

pub fn execute(plan_path: &Path, repo: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let plan = plan::load(plan_path)?;

    let repo = match repo {
        Some(repo) => repo,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let mut exclude = plan.exclude.clone();
    if let Some(relative) = plan::relative_to_repo(plan_path, &repo) {
        exclude.push(relative);
    }

    print_header(&plan, &repo, dry_run);

    if dry_run {
        let tool = RecordingTool::permissive();
        let replayer =
            HistoryReplayer::new(plan.anchor, plan.authors.clone(), tool).with_excluded(exclude);
        let (summary, replayer) = run(&plan, replayer)?;

        println!("\n{}", "Invocations:".bold());
        for invocation in replayer.tool().invocations() {
            println!("  {}", invocation);
        }
        println!("\n{}", render_summary(&summary));
        return Ok(());
    }

    which::which("git").context("git not found in PATH")?;
    let git = GitCli::new(&repo);
    if !git.is_repo()? {
        anyhow::bail!("{} is not a git repository", repo.display());
    }

    install_interrupt_handler();

    let replayer =
        HistoryReplayer::new(plan.anchor, plan.authors.clone(), git).with_excluded(exclude);
    let (summary, replayer) = run(&plan, replayer)?;

    if let Ok(branch) = replayer.tool().current_branch() {
        println!("\nLeft on branch: {}", branch);
    }
    println!("\n{}", render_summary(&summary));
    Ok(())
}

fn print_header(plan: &Plan, repo: &Path, dry_run: bool) {
    println!("{}", "=".repeat(50));
    println!("{}", "History Replay".bold());
    println!("{}", "=".repeat(50));
    println!();
    println!("Start date: {}", plan.anchor.start().format("%Y-%m-%d %H:%M"));
    println!("First author: {}", plan.authors.first);
    println!("Second author: {}", plan.authors.second);
    println!("Repository: {}", repo.display());
    if dry_run {
        println!("{}", "Dry run: git will not be invoked".yellow());
    }
}

fn run<T: VcsTool>(
    plan: &Plan,
    mut replayer: HistoryReplayer<T>,
) -> Result<(ReplaySummary, HistoryReplayer<T>)> {
    let mut summary = ReplaySummary::default();
    let mut section: Option<&str> = None;

    for entry in &plan.entries {
        if let Some(next) = entry.section.as_deref() {
            if section != Some(next) {
                println!("\n{}", format!("=== {} ===", next).bold());
                section = Some(next);
            }
        }

        let report = replayer.apply(&entry.event)?;
        println!("{}", render_event(&report));
        summary.record(&report);
    }

    println!();
    Ok((summary, replayer))
}

/// Ctrl+C ends the run with exit code 1; commits made so far stay
#[cfg(unix)]
fn install_interrupt_handler() {
    unsafe {
        libc::signal(libc::SIGINT, sigint_handler as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
fn install_interrupt_handler() {}

#[cfg(unix)]
extern "C" fn sigint_handler(_: libc::c_int) {
    const MSG: &[u8] = b"\n\nAborted by user\n";
    unsafe {
        libc::write(libc::STDERR_FILENO, MSG.as_ptr() as *const libc::c_void, MSG.len());
        libc::_exit(1);
    }
}
