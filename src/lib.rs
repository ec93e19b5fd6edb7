pub mod git;
pub mod history;
pub mod plan;

// Re-export commonly used types
pub use git::{GitCli, InvocationContext, ToolOutcome, VcsTool};
pub use history::{Author, AuthorIdentity, Authors, HistoricalEvent, HistoryReplayer};
pub use plan::Plan;
