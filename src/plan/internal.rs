//! Internal implementation for plan module
//!
//! Handles the TOML plan file: raw serde schema, validation and conversion
//! into typed [`HistoricalEvent`]s.

use crate::history::{Author, Authors, EventTime, HistoricalEvent, PathSelection, TimeAnchor};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path};

// =============================================================================
// Raw Schema
// =============================================================================

/// Plan file as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanFile {
    pub anchor: AnchorSection,
    pub authors: Authors,
    #[serde(default)]
    pub replay: ReplaySection,
    #[serde(default)]
    pub events: Vec<EventSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorSection {
    /// Day 0 at 09:00, e.g. "2025-10-18T09:00:00"
    pub start: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaySection {
    /// Extra paths stage-everything never commits
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EventSpec {
    Change {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        section: Option<String>,
        branch: String,
        author: Author,
        day: u32,
        hour: u8,
        #[serde(default)]
        minute: u8,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        paths: Option<Vec<String>>,
        #[serde(default)]
        stage_all: bool,
    },
    Deletion {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        section: Option<String>,
        branch: String,
        author: Author,
        day: u32,
        hour: u8,
        #[serde(default)]
        minute: u8,
        message: String,
        paths: Vec<String>,
    },
    Merge {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        section: Option<String>,
        target: String,
        source: String,
        author: Author,
        day: u32,
        hour: u8,
        #[serde(default)]
        minute: u8,
    },
    Tag {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        section: Option<String>,
        name: String,
        #[serde(default = "default_tag_branch")]
        branch: String,
        author: Author,
        day: u32,
        hour: u8,
        #[serde(default)]
        minute: u8,
        message: String,
    },
}

fn default_tag_branch() -> String {
    "main".to_string()
}

// =============================================================================
// Typed Plan
// =============================================================================

/// One event plus the console section it is printed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub section: Option<String>,
    pub event: HistoricalEvent,
}

/// Validated plan, ready to replay
#[derive(Debug, Clone)]
pub struct Plan {
    pub anchor: TimeAnchor,
    pub authors: Authors,
    pub exclude: Vec<String>,
    pub entries: Vec<PlanEntry>,
}

impl Plan {
    pub fn events(&self) -> impl Iterator<Item = &HistoricalEvent> {
        self.entries.iter().map(|e| &e.event)
    }
}

// =============================================================================
// Validation
// =============================================================================

fn check_time(day: u32, hour: u8, minute: u8) -> Result<EventTime> {
    if hour > 23 {
        bail!("hour {} is not a valid hour of day (0-23)", hour);
    }
    if minute > 59 {
        bail!("minute {} is not a valid minute (0-59)", minute);
    }
    Ok(EventTime::new(day, hour, minute))
}

fn check_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{} must not be empty", field);
    }
    Ok(())
}

fn check_paths(paths: &[String]) -> Result<()> {
    for path in paths {
        check_non_empty("path", path)?;
        if Path::new(path).is_absolute() {
            bail!("path '{}' must be relative to the repository root", path);
        }
    }
    Ok(())
}

fn convert(spec: EventSpec) -> Result<PlanEntry> {
    let (section, event) = match spec {
        EventSpec::Change {
            section,
            branch,
            author,
            day,
            hour,
            minute,
            message,
            paths,
            stage_all,
        } => {
            check_non_empty("branch", &branch)?;
            check_non_empty("message", &message)?;
            let paths = match (paths, stage_all) {
                (Some(_), true) => bail!("'paths' and 'stage_all' are mutually exclusive"),
                (Some(paths), false) => {
                    check_paths(&paths)?;
                    PathSelection::Paths(paths)
                }
                (None, true) => PathSelection::Everything,
                (None, false) => PathSelection::Nothing,
            };
            let event = HistoricalEvent::Change {
                branch,
                author,
                time: check_time(day, hour, minute)?,
                message,
                paths,
            };
            (section, event)
        }
        EventSpec::Deletion {
            section,
            branch,
            author,
            day,
            hour,
            minute,
            message,
            paths,
        } => {
            check_non_empty("branch", &branch)?;
            check_non_empty("message", &message)?;
            if paths.is_empty() {
                bail!("deletion must list at least one path");
            }
            check_paths(&paths)?;
            let event = HistoricalEvent::Deletion {
                branch,
                author,
                time: check_time(day, hour, minute)?,
                message,
                paths,
            };
            (section, event)
        }
        EventSpec::Merge {
            section,
            target,
            source,
            author,
            day,
            hour,
            minute,
        } => {
            check_non_empty("target", &target)?;
            check_non_empty("source", &source)?;
            if target == source {
                bail!("cannot merge branch '{}' into itself", source);
            }
            let event = HistoricalEvent::Merge {
                target,
                source,
                time: check_time(day, hour, minute)?,
                author,
            };
            (section, event)
        }
        EventSpec::Tag {
            section,
            name,
            branch,
            author,
            day,
            hour,
            minute,
            message,
        } => {
            check_non_empty("tag name", &name)?;
            check_non_empty("branch", &branch)?;
            check_non_empty("message", &message)?;
            let event = HistoricalEvent::Tag {
                name,
                branch,
                author,
                time: check_time(day, hour, minute)?,
                message,
            };
            (section, event)
        }
    };

    Ok(PlanEntry { section, event })
}

fn check_authors(authors: &Authors) -> Result<()> {
    for (tag, identity) in [("first", &authors.first), ("second", &authors.second)] {
        check_non_empty(&format!("authors.{}.name", tag), &identity.name)?;
        if !identity.email.contains('@') {
            bail!("authors.{}.email '{}' is not an email address", tag, identity.email);
        }
    }
    Ok(())
}

// =============================================================================
// Load
// =============================================================================

/// Parse and validate plan text
pub fn parse(contents: &str) -> Result<Plan> {
    let raw: PlanFile = toml::from_str(contents).context("Failed to parse plan")?;

    let anchor = TimeAnchor::parse(&raw.anchor.start)?;
    check_authors(&raw.authors)?;
    check_paths(&raw.replay.exclude)?;

    let mut entries = Vec::with_capacity(raw.events.len());
    for (index, spec) in raw.events.into_iter().enumerate() {
        let entry = convert(spec).with_context(|| format!("Invalid event #{}", index + 1))?;
        // Surface calendar overflow before touching the repository
        anchor
            .resolve(entry.event.time())
            .with_context(|| format!("Invalid event #{}", index + 1))?;
        entries.push(entry);
    }

    Ok(Plan {
        anchor,
        authors: raw.authors,
        exclude: raw.replay.exclude,
        entries,
    })
}

/// Load and validate a plan file
pub fn load(path: &Path) -> Result<Plan> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan: {}", path.display()))?;

    parse(&contents).with_context(|| format!("Invalid plan: {}", path.display()))
}

/// Path of `file` relative to `repo`, with `/` separators, when it lives inside it
pub fn relative_to_repo(file: &Path, repo: &Path) -> Option<String> {
    let file = fs::canonicalize(file).ok()?;
    let repo = fs::canonicalize(repo).ok()?;
    let relative = file.strip_prefix(&repo).ok()?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = r#"
[anchor]
start = "2025-10-18T09:00:00"

[authors.first]
name = "Ada Example"
email = "ada@example.com"

[authors.second]
name = "Grace Example"
email = "grace@example.com"
"#;

    fn plan_with(events: &str) -> Result<Plan> {
        parse(&format!("{}\n{}", HEADER, events))
    }

    #[test]
    fn test_parse_all_event_kinds() {
        let plan = plan_with(
            r#"
[[events]]
kind = "change"
section = "Week 1: Day 1"
branch = "feature/x"
author = "second"
day = 0
hour = 10
minute = 30
message = "feat: X"
paths = ["src/x.rs"]

[[events]]
kind = "change"
branch = "main"
author = "first"
day = 1
hour = 9
message = "chore: everything"
stage_all = true

[[events]]
kind = "deletion"
branch = "main"
author = "first"
day = 2
hour = 11
message = "chore: drop old file"
paths = ["old.rs"]

[[events]]
kind = "merge"
target = "main"
source = "feature/x"
author = "second"
day = 2
hour = 9

[[events]]
kind = "tag"
name = "v2.0"
author = "first"
day = 25
hour = 16
message = "Release"
"#,
        )
        .unwrap();

        assert_eq!(plan.entries.len(), 5);
        assert_eq!(plan.entries[0].section.as_deref(), Some("Week 1: Day 1"));
        assert_eq!(
            plan.entries[0].event,
            HistoricalEvent::Change {
                branch: "feature/x".into(),
                author: Author::Second,
                time: EventTime::new(0, 10, 30),
                message: "feat: X".into(),
                paths: PathSelection::Paths(vec!["src/x.rs".into()]),
            }
        );
        assert!(matches!(
            &plan.entries[1].event,
            HistoricalEvent::Change { paths: PathSelection::Everything, .. }
        ));
        assert!(matches!(
            &plan.entries[4].event,
            HistoricalEvent::Tag { branch, .. } if branch == "main"
        ));
        assert_eq!(plan.authors.second.name, "Grace Example");
    }

    #[test]
    fn test_change_without_paths_is_metadata_only() {
        let plan = plan_with(
            r#"
[[events]]
kind = "change"
branch = "main"
author = "first"
day = 0
hour = 9
message = "chore: empty"
"#,
        )
        .unwrap();
        assert!(matches!(
            &plan.entries[0].event,
            HistoricalEvent::Change { paths: PathSelection::Nothing, .. }
        ));
    }

    #[test]
    fn test_unknown_author_rejected() {
        let err = plan_with(
            r#"
[[events]]
kind = "change"
branch = "main"
author = "student3"
day = 0
hour = 9
message = "x"
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_invalid_hour_rejected() {
        let err = plan_with(
            r#"
[[events]]
kind = "merge"
target = "main"
source = "dev"
author = "first"
day = 0
hour = 24
"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid event #1"));
    }

    #[test]
    fn test_paths_and_stage_all_conflict() {
        let err = plan_with(
            r#"
[[events]]
kind = "change"
branch = "main"
author = "first"
day = 0
hour = 9
message = "x"
paths = ["a"]
stage_all = true
"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("mutually exclusive"));
    }

    #[test]
    fn test_empty_deletion_rejected() {
        let err = plan_with(
            r#"
[[events]]
kind = "deletion"
branch = "main"
author = "first"
day = 0
hour = 9
message = "x"
paths = []
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_self_merge_rejected() {
        let err = plan_with(
            r#"
[[events]]
kind = "merge"
target = "main"
source = "main"
author = "first"
day = 0
hour = 9
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(load(&tmp.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.toml");
        fs::write(&path, HEADER).unwrap();

        let plan = load(&path).unwrap();
        assert!(plan.entries.is_empty());
        assert_eq!(plan.anchor.to_string(), "2025-10-18 09:00:00");
    }

    #[test]
    fn test_relative_to_repo() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("plans");
        fs::create_dir_all(&nested).unwrap();
        let plan = nested.join("history.toml");
        fs::write(&plan, HEADER).unwrap();

        assert_eq!(
            relative_to_repo(&plan, tmp.path()).as_deref(),
            Some("plans/history.toml")
        );

        let outside = TempDir::new().unwrap();
        assert_eq!(relative_to_repo(&plan, outside.path()), None);
    }
}
