//! The shipped demo plan parses and dry-runs cleanly

use history_replay::git::{Invocation, RecordingTool};
use history_replay::history::HistoryReplayer;
use history_replay::plan;
use std::path::Path;

fn demo_plan() -> plan::Plan {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/history.toml");
    plan::load(&path).unwrap()
}

#[test]
fn test_demo_plan_loads() {
    let plan = demo_plan();
    assert_eq!(plan.anchor.to_string(), "2025-10-18 09:00:00");
    assert_eq!(plan.entries.len(), 8);
    assert_eq!(plan.exclude, vec!["demos/history.toml".to_string()]);
}

#[test]
fn test_demo_plan_dry_run() {
    let plan = demo_plan();
    let tool = RecordingTool::permissive();
    let mut replayer = HistoryReplayer::new(plan.anchor, plan.authors.clone(), tool)
        .with_excluded(plan.exclude.clone());

    let summary = replayer.replay(plan.events(), |_, _| {}).unwrap();

    assert_eq!(summary.events, 8);
    assert_eq!(summary.commits, 5);
    assert_eq!(summary.merges, 2);
    assert_eq!(summary.tags, vec!["v1.0".to_string()]);
    assert_eq!(summary.failures, 0);
    assert_eq!(
        summary.first_timestamp.map(|t| t.to_string()).as_deref(),
        Some("2025-10-18 10:30:00")
    );
    assert_eq!(
        summary.last_timestamp.map(|t| t.to_string()).as_deref(),
        Some("2025-11-03 16:00:00")
    );

    let merges: Vec<&str> = replayer
        .tool()
        .invocations()
        .iter()
        .filter_map(|inv| match inv {
            Invocation::Merge { message, .. } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        merges,
        vec![
            "Merge branch 'feature/grid-model' into main",
            "Merge branch 'feature/position' into main",
        ]
    );
}
