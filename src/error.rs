use rmcp::model::ErrorData;

use crate::registry::Namespace;

/// Fallback text when a failure carries no message of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

#[derive(Debug, thiserror::Error)]
pub enum GithubMcpError {
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),

    #[error("{0}")]
    Upstream(String),

    #[error("{namespace} not found: {name}")]
    CapabilityNotFound { namespace: Namespace, name: String },

    #[error("Invalid arguments for {capability}: {reason}")]
    InvalidArguments { capability: String, reason: String },

    #[error("{0}")]
    InvalidName(String),

    #[error("Inconsistent capability registry: {0}")]
    InconsistentRegistry(String),
}

impl GithubMcpError {
    pub fn to_mcp_error(&self) -> ErrorData {
        match self {
            GithubMcpError::CapabilityNotFound { .. }
            | GithubMcpError::InvalidArguments { .. }
            | GithubMcpError::InvalidName(_) => ErrorData::invalid_params(self.to_string(), None),
            GithubMcpError::GitHub(_)
            | GithubMcpError::Upstream(_)
            | GithubMcpError::InconsistentRegistry(_) => {
                ErrorData::internal_error(self.to_string(), None)
            }
        }
    }

    /// The human-readable part of a failure, as shown to the calling agent.
    ///
    /// GitHub API errors report the API's own message (`Not Found`,
    /// `Bad credentials`, ...) rather than the wrapped display string.
    pub fn user_message(&self) -> String {
        let message = match self {
            GithubMcpError::GitHub(octocrab::Error::GitHub { source, .. }) => {
                source.message.clone()
            }
            GithubMcpError::GitHub(e) => e.to_string(),
            GithubMcpError::Upstream(message) | GithubMcpError::InvalidName(message) => {
                message.clone()
            }
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        }
    }
}
