/// Strata error types
#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    /// A required precondition does not hold (dirty tree, rebase in
    /// progress, missing parent meta, no current branch)
    #[error("{0}")]
    Preconditions(String),

    /// The recorded stack diverges from Git's actual commit graph
    #[error("branch '{branch}' is not based on its recorded parent '{expected_parent}' (actual base: {actual_base})")]
    Validation {
        branch: String,
        expected_parent: String,
        actual_base: String,
    },

    /// Structural error in branch metadata (unknown parent, cycle)
    #[error("invalid stack: {0}")]
    StackBuild(String),

    /// A git subprocess exited non-zero
    #[error("git {command} failed (exit code {code}): {stderr}")]
    GitCommand {
        command: String,
        code: i32,
        stderr: String,
    },

    /// libgit2 errors
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// A rebase stopped on conflicts; Git's rebase state is the recovery point
    #[error("rebase of '{branch}' stopped on conflicts:\n{stderr}")]
    RebaseConflict { branch: String, stderr: String },

    /// Submit refused because a PR in the batch was merged remotely
    #[error("the pull request for '{branch}' has been merged. Run 'strata sync' to prune merged branches, then resubmit")]
    PullRequestMerged { branch: String },

    /// Submit refused because a PR in the batch was closed remotely
    #[error("the pull request for '{branch}' has been closed. Reopen it on the review host or run 'strata sync' to prune it, then resubmit")]
    PullRequestClosed { branch: String },

    /// The review host rejected our token
    #[error("authentication expired. Visit {activation_url} to issue a new token, then run 'strata config set auth.token <token>'")]
    AuthExpired { activation_url: String },

    /// Any non-2xx, non-401 response from the review host
    #[error("unexpected response from the review host (status {status}, request id {request_id})")]
    UnexpectedServerResponse { status: u16, request_id: String },

    /// Per-branch error in a submit batch response
    #[error("failed to submit '{branch}': {message}")]
    Submit { branch: String, message: String },

    /// The user cancelled an interactive prompt
    #[error("aborted")]
    Killed,

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl StrataError {
    pub fn preconditions<S: Into<String>>(msg: S) -> Self {
        StrataError::Preconditions(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        StrataError::Config(msg.into())
    }

    pub fn stack<S: Into<String>>(msg: S) -> Self {
        StrataError::StackBuild(msg.into())
    }

    /// Process exit code for this error: 1 validation, 2 preconditions,
    /// 3 remote, 4 user abort. Everything else exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            StrataError::Preconditions(_) => 2,
            StrataError::AuthExpired { .. }
            | StrataError::UnexpectedServerResponse { .. }
            | StrataError::Submit { .. }
            | StrataError::Http(_) => 3,
            StrataError::Killed => 4,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, StrataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(StrataError::preconditions("dirty tree").exit_code(), 2);
        assert_eq!(
            StrataError::Validation {
                branch: "a".into(),
                expected_parent: "main".into(),
                actual_base: "(none)".into(),
            }
            .exit_code(),
            1
        );
        assert_eq!(
            StrataError::AuthExpired {
                activation_url: "https://app.example.com/activate".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(
            StrataError::UnexpectedServerResponse {
                status: 502,
                request_id: "abc".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(StrataError::Killed.exit_code(), 4);
        assert_eq!(
            StrataError::PullRequestMerged { branch: "a".into() }.exit_code(),
            1
        );
    }

    #[test]
    fn test_messages_carry_remediation() {
        let err = StrataError::AuthExpired {
            activation_url: "https://app.example.com/activate".into(),
        };
        assert!(err.to_string().contains("https://app.example.com/activate"));

        let err = StrataError::PullRequestMerged {
            branch: "feature".into(),
        };
        assert!(err.to_string().contains("strata sync"));
    }
}
