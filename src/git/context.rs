//! Identity and timestamp bound to a single git invocation

/// Author/committer identity and date handed to one tool invocation.
///
/// All four identity fields are normally filled from the same
/// [`AuthorIdentity`](crate::history::AuthorIdentity), but they stay
/// separate so the tool layer never has to know that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub author_name: String,
    pub author_email: String,
    pub committer_name: String,
    pub committer_email: String,
    /// `YYYY-MM-DD HH:MM:SS`, interpreted by git in the local timezone
    pub timestamp: String,
}

impl InvocationContext {
    /// Same identity as author and committer
    pub fn new(name: &str, email: &str, timestamp: &str) -> Self {
        Self {
            author_name: name.to_string(),
            author_email: email.to_string(),
            committer_name: name.to_string(),
            committer_email: email.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    /// Environment overrides for the child `git` process
    pub fn env_pairs(&self) -> [(&'static str, &str); 6] {
        [
            ("GIT_AUTHOR_NAME", self.author_name.as_str()),
            ("GIT_AUTHOR_EMAIL", self.author_email.as_str()),
            ("GIT_COMMITTER_NAME", self.committer_name.as_str()),
            ("GIT_COMMITTER_EMAIL", self.committer_email.as_str()),
            ("GIT_AUTHOR_DATE", self.timestamp.as_str()),
            ("GIT_COMMITTER_DATE", self.timestamp.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_pairs_share_identity_and_date() {
        let ctx = InvocationContext::new("Ada", "ada@example.com", "2025-10-18 10:30:00");
        let env = ctx.env_pairs();

        assert_eq!(env.len(), 6);
        assert!(env.contains(&("GIT_AUTHOR_NAME", "Ada")));
        assert!(env.contains(&("GIT_COMMITTER_NAME", "Ada")));
        assert!(env.contains(&("GIT_AUTHOR_EMAIL", "ada@example.com")));
        assert!(env.contains(&("GIT_COMMITTER_EMAIL", "ada@example.com")));
        assert!(env.contains(&("GIT_AUTHOR_DATE", "2025-10-18 10:30:00")));
        assert!(env.contains(&("GIT_COMMITTER_DATE", "2025-10-18 10:30:00")));
    }
}
