//! Event replay against a [`VcsTool`]

use super::{
    Author, AuthorIdentity, Authors, EventTime, HistoricalEvent, PathSelection, ResolvedTimestamp,
    TimeAnchor,
};
use crate::git::{log_debug, InvocationContext, ToolOutcome, VcsTool};
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Change,
    Deletion,
    Merge,
    Tag,
}

/// Outcome of replaying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReport {
    pub kind: EventKind,
    pub timestamp: ResolvedTimestamp,
    pub author: Author,
    /// Commit message, or a description for merges and tags
    pub label: String,
    pub outcome: ToolOutcome,
    /// Tolerated step failures (unmatched paths and the like)
    pub warnings: Vec<String>,
}

impl EventReport {
    /// Changes and deletions count as commits whether or not git accepted them
    pub fn counts_as_commit(&self) -> bool {
        matches!(self.kind, EventKind::Change | EventKind::Deletion)
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Totals folded from [`EventReport`]s by the replay driver
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub commits: usize,
    pub merges: usize,
    pub tags: Vec<String>,
    pub failures: usize,
    pub first_timestamp: Option<ResolvedTimestamp>,
    pub last_timestamp: Option<ResolvedTimestamp>,
}

impl ReplaySummary {
    pub fn record(&mut self, report: &EventReport) {
        self.events += 1;
        if report.counts_as_commit() {
            self.commits += 1;
        }
        if !report.succeeded() {
            self.failures += 1;
        } else {
            match report.kind {
                EventKind::Merge => self.merges += 1,
                EventKind::Tag => self.tags.push(report.label.clone()),
                _ => {}
            }
        }

        let ts = report.timestamp;
        self.first_timestamp = Some(self.first_timestamp.map_or(ts, |t| t.min(ts)));
        self.last_timestamp = Some(self.last_timestamp.map_or(ts, |t| t.max(ts)));
    }
}

/// Message of a replayed merge commit
pub fn merge_message(source: &str, target: &str) -> String {
    format!("Merge branch '{}' into {}", source, target)
}

/// Owns the anchor, both identities and the tool for one replay run
pub struct HistoryReplayer<T: VcsTool> {
    anchor: TimeAnchor,
    authors: Authors,
    excluded: Vec<String>,
    tool: T,
}

impl<T: VcsTool> HistoryReplayer<T> {
    pub fn new(anchor: TimeAnchor, authors: Authors, tool: T) -> Self {
        Self {
            anchor,
            authors,
            excluded: Vec::new(),
            tool,
        }
    }

    /// Paths that stage-everything must never leave in the index
    pub fn with_excluded<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn resolve_timestamp(&self, time: EventTime) -> Result<ResolvedTimestamp> {
        self.anchor.resolve(time)
    }

    pub fn resolve_author(&self, author: Author) -> &AuthorIdentity {
        self.authors.resolve(author)
    }

    fn context(&self, author: Author, timestamp: ResolvedTimestamp) -> InvocationContext {
        let identity = self.authors.resolve(author);
        InvocationContext::new(&identity.name, &identity.email, &timestamp.to_string())
    }

    pub fn record_change(
        &mut self,
        branch: &str,
        author: Author,
        time: EventTime,
        message: &str,
        paths: &PathSelection,
    ) -> Result<EventReport> {
        let timestamp = self.resolve_timestamp(time)?;
        let ctx = self.context(author, timestamp);
        let mut report = EventReport {
            kind: EventKind::Change,
            timestamp,
            author,
            label: message.to_string(),
            outcome: ToolOutcome::Success,
            warnings: Vec::new(),
        };

        let switched = self.tool.switch_branch(branch)?;
        if !switched.is_success() {
            report.outcome = switched;
            return Ok(report);
        }

        let staged = match paths {
            PathSelection::Nothing => ToolOutcome::Success,
            PathSelection::Everything => self.tool.stage_all_except(&self.excluded)?,
            PathSelection::Paths(paths) => self.tool.stage(paths)?,
        };
        report.warnings.extend(staged.describe());

        report.outcome = self.tool.commit(message, &ctx, true)?;
        Ok(report)
    }

    pub fn record_deletion(
        &mut self,
        branch: &str,
        author: Author,
        time: EventTime,
        message: &str,
        paths: &[String],
    ) -> Result<EventReport> {
        let timestamp = self.resolve_timestamp(time)?;
        let ctx = self.context(author, timestamp);
        let mut report = EventReport {
            kind: EventKind::Deletion,
            timestamp,
            author,
            label: message.to_string(),
            outcome: ToolOutcome::Success,
            warnings: Vec::new(),
        };

        let switched = self.tool.switch_branch(branch)?;
        if !switched.is_success() {
            report.outcome = switched;
            return Ok(report);
        }

        for path in paths {
            report.warnings.extend(self.tool.remove(path)?.describe());
        }

        // No --allow-empty: removing nothing is this event's failure
        report.outcome = self.tool.commit(message, &ctx, false)?;
        Ok(report)
    }

    pub fn record_merge(
        &mut self,
        target: &str,
        source: &str,
        time: EventTime,
        author: Author,
    ) -> Result<EventReport> {
        let timestamp = self.resolve_timestamp(time)?;
        let ctx = self.context(author, timestamp);
        let mut report = EventReport {
            kind: EventKind::Merge,
            timestamp,
            author,
            label: format!("Merged {} into {}", source, target),
            outcome: ToolOutcome::Success,
            warnings: Vec::new(),
        };

        let switched = self.tool.switch_branch(target)?;
        if !switched.is_success() {
            report.outcome = switched;
            return Ok(report);
        }

        report.outcome = self.tool.merge(source, &merge_message(source, target), &ctx)?;
        Ok(report)
    }

    pub fn record_tag(
        &mut self,
        name: &str,
        branch: &str,
        author: Author,
        time: EventTime,
        message: &str,
    ) -> Result<EventReport> {
        let timestamp = self.resolve_timestamp(time)?;
        let ctx = self.context(author, timestamp);
        let mut report = EventReport {
            kind: EventKind::Tag,
            timestamp,
            author,
            label: name.to_string(),
            outcome: ToolOutcome::Success,
            warnings: Vec::new(),
        };

        let switched = self.tool.switch_branch(branch)?;
        if !switched.is_success() {
            report.outcome = switched;
            return Ok(report);
        }

        report.outcome = self.tool.tag(name, message, &ctx)?;
        Ok(report)
    }

    pub fn apply(&mut self, event: &HistoricalEvent) -> Result<EventReport> {
        let report = match event {
            HistoricalEvent::Change {
                branch,
                author,
                time,
                message,
                paths,
            } => self.record_change(branch, *author, *time, message, paths)?,
            HistoricalEvent::Deletion {
                branch,
                author,
                time,
                message,
                paths,
            } => self.record_deletion(branch, *author, *time, message, paths)?,
            HistoricalEvent::Merge {
                target,
                source,
                time,
                author,
            } => self.record_merge(target, source, *time, *author)?,
            HistoricalEvent::Tag {
                name,
                branch,
                author,
                time,
                message,
            } => self.record_tag(name, branch, *author, *time, message)?,
        };

        if let Some(detail) = report.outcome.describe() {
            log_debug("history", &format!("[{}] {}", report.timestamp, detail));
        }
        Ok(report)
    }

    /// Replay `events` in order, handing each report to `observe`.
    ///
    /// Tool failures never stop the run; only faults (`Err`) do.
    pub fn replay<'a, I, F>(&mut self, events: I, mut observe: F) -> Result<ReplaySummary>
    where
        I: IntoIterator<Item = &'a HistoricalEvent>,
        F: FnMut(&HistoricalEvent, &EventReport),
    {
        let mut summary = ReplaySummary::default();
        for event in events {
            let report = self.apply(event)?;
            observe(event, &report);
            summary.record(&report);
        }
        Ok(summary)
    }
}
