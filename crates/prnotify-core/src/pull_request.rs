use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repo::RepositoryReference;

/// An open pull request as reported by a [`PullRequestSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    /// Source-specific identifier.
    pub id: u64,
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Canonical web link. May be missing in a malformed upstream response.
    #[serde(default)]
    pub url: Option<String>,
}

impl PullRequestSummary {
    /// The canonical link, if present and non-empty.
    pub fn link(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}

/// A failed query for one repository's pull requests.
#[derive(Debug, Error)]
#[error("couldn't get pull requests for {repo}: {source}")]
pub struct FetchError {
    pub repo: RepositoryReference,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl FetchError {
    pub fn new(
        repo: &RepositoryReference,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            repo: repo.clone(),
            source: source.into(),
        }
    }
}

/// Anything that can list the open pull requests of a repository.
///
/// Implementations make a single attempt per call; callers never retry.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn list_open_pull_requests(
        &self,
        repo: &RepositoryReference,
    ) -> Result<Vec<PullRequestSummary>, FetchError>;
}
