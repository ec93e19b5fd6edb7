//! Plan module - declarative replay input
//!
//! A plan is a TOML file holding the time anchor, the two author
//! identities and the ordered event list.
//!
//! # Example
//!
//! ```no_run
//! use history_replay::plan;
//! use std::path::Path;
//!
//! let plan = plan::load(Path::new("history.toml"))?;
//! println!("Anchor: {}", plan.anchor);
//! println!("Events: {}", plan.entries.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

mod internal;

use anyhow::Result;
use std::path::Path;

pub use internal::{AnchorSection, EventSpec, Plan, PlanEntry, PlanFile, ReplaySection};

/// Load and validate a plan file.
///
/// Malformed input is an error; nothing has touched a repository yet.
pub fn load(path: &Path) -> Result<Plan> {
    internal::load(path)
}

/// Parse and validate plan text
pub fn parse(contents: &str) -> Result<Plan> {
    internal::parse(contents)
}

/// Repository-relative path of `file` if it lives inside `repo`
pub fn relative_to_repo(file: &Path, repo: &Path) -> Option<String> {
    internal::relative_to_repo(file, repo)
}
