//! History module - replay declarative events as backdated git commits
//!
//! Every event carries a branch, one of two authors and a time relative to
//! a fixed anchor. [`HistoryReplayer`] resolves those into an
//! [`InvocationContext`](crate::git::InvocationContext) and drives a
//! [`VcsTool`](crate::git::VcsTool).
//!
//! # Example
//!
//! ```
//! use history_replay::git::RecordingTool;
//! use history_replay::history::{
//!     Author, AuthorIdentity, Authors, EventTime, HistoryReplayer, PathSelection, TimeAnchor,
//! };
//!
//! let authors = Authors::new(
//!     AuthorIdentity::new("Ada Example", "ada@example.com"),
//!     AuthorIdentity::new("Grace Example", "grace@example.com"),
//! );
//! let anchor = TimeAnchor::parse("2025-10-18T09:00:00")?;
//! let mut replayer = HistoryReplayer::new(anchor, authors, RecordingTool::new());
//!
//! let report = replayer.record_change(
//!     "feature/x",
//!     Author::Second,
//!     EventTime::new(0, 10, 30),
//!     "feat: X",
//!     &PathSelection::Nothing,
//! )?;
//! assert_eq!(report.timestamp.to_string(), "2025-10-18 10:30:00");
//! # Ok::<(), anyhow::Error>(())
//! ```

mod replayer;
mod report;
mod time;

pub use replayer::{merge_message, EventKind, EventReport, HistoryReplayer, ReplaySummary};
pub use report::{render_event, render_summary, truncate_message};
pub use time::{EventTime, ResolvedTimestamp, TimeAnchor, BASELINE_HOUR, TIMESTAMP_FORMAT};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two configured identities an event is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    First,
    Second,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::First => write!(f, "first"),
            Author::Second => write!(f, "second"),
        }
    }
}

/// Name and email used as both author and committer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorIdentity {
    pub name: String,
    pub email: String,
}

impl AuthorIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for AuthorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// The two identities of a replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authors {
    pub first: AuthorIdentity,
    pub second: AuthorIdentity,
}

impl Authors {
    pub fn new(first: AuthorIdentity, second: AuthorIdentity) -> Self {
        Self { first, second }
    }

    pub fn resolve(&self, author: Author) -> &AuthorIdentity {
        match author {
            Author::First => &self.first,
            Author::Second => &self.second,
        }
    }
}

/// What a change event stages before committing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PathSelection {
    /// Metadata-only commit
    #[default]
    Nothing,
    /// Every modified/untracked path except the replayer's exclusions
    Everything,
    Paths(Vec<String>),
}

/// One action to replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoricalEvent {
    Change {
        branch: String,
        author: Author,
        time: EventTime,
        message: String,
        paths: PathSelection,
    },
    Deletion {
        branch: String,
        author: Author,
        time: EventTime,
        message: String,
        paths: Vec<String>,
    },
    Merge {
        target: String,
        source: String,
        time: EventTime,
        author: Author,
    },
    Tag {
        name: String,
        branch: String,
        author: Author,
        time: EventTime,
        message: String,
    },
}

impl HistoricalEvent {
    pub fn time(&self) -> EventTime {
        match self {
            HistoricalEvent::Change { time, .. }
            | HistoricalEvent::Deletion { time, .. }
            | HistoricalEvent::Merge { time, .. }
            | HistoricalEvent::Tag { time, .. } => *time,
        }
    }

    pub fn author(&self) -> Author {
        match self {
            HistoricalEvent::Change { author, .. }
            | HistoricalEvent::Deletion { author, .. }
            | HistoricalEvent::Merge { author, .. }
            | HistoricalEvent::Tag { author, .. } => *author,
        }
    }
}
