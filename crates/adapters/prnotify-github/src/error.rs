use thiserror::Error;

/// Errors from talking to the GitHub REST API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Network-level failure, including timeouts.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GitHub rejected the API token (401)")]
    Unauthorized,

    #[error("token lacks access to this repository (403)")]
    Forbidden,

    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    #[error("repository not found or not visible to this token (404)")]
    NotFound,

    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response from GitHub: {0}")]
    InvalidResponse(String),
}

impl GitHubError {
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
