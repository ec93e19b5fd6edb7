use anyhow::Result;
use colored::*;
use history_replay::history::{Author, HistoricalEvent};
use history_replay::plan;
use std::path::Path;

pub fn execute(plan_path: &Path) -> Result<()> {
    let plan = plan::load(plan_path)?;

    let mut changes = 0;
    let mut deletions = 0;
    let mut merges = 0;
    let mut tags = 0;
    let mut first_author = 0;
    let mut second_author = 0;
    for event in plan.events() {
        match event {
            HistoricalEvent::Change { .. } => changes += 1,
            HistoricalEvent::Deletion { .. } => deletions += 1,
            HistoricalEvent::Merge { .. } => merges += 1,
            HistoricalEvent::Tag { .. } => tags += 1,
        }
        match event.author() {
            Author::First => first_author += 1,
            Author::Second => second_author += 1,
        }
    }

    // Plan loading already resolved every timestamp
    let mut range = plan.events().filter_map(|e| plan.anchor.resolve(e.time()).ok());
    let first = range.next();
    let (earliest, latest) = range.fold((first, first), |(lo, hi), ts| {
        (lo.map(|l| l.min(ts)), hi.map(|h| h.max(ts)))
    });

    println!("{} {}", "✓".green().bold(), plan_path.display());
    println!("  Anchor:  {}", plan.anchor);
    println!("  First:   {}", plan.authors.first);
    println!("  Second:  {}", plan.authors.second);
    println!(
        "  Events:  {} ({} changes, {} deletions, {} merges, {} tags)",
        plan.entries.len(),
        changes,
        deletions,
        merges,
        tags
    );
    println!("  Split:   first {} / second {}", first_author, second_author);
    if let (Some(earliest), Some(latest)) = (earliest, latest) {
        println!("  Range:   {} to {}", earliest, latest);
    }
    if !plan.exclude.is_empty() {
        println!("  Exclude: {}", plan.exclude.join(", "));
    }

    Ok(())
}
