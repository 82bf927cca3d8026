use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use prnotify_core::{FetchError, PullRequestSource, PullRequestSummary, RepositoryReference};

use crate::config::{GitHubSourceConfig, MAX_PER_PAGE};
use crate::error::GitHubError;

/// Lists open pull requests through the GitHub REST API.
///
/// The HTTP client and its credentials are set up once and shared by every
/// query in a pass.
pub struct GitHubSource {
    config: GitHubSourceConfig,
    client: reqwest::Client,
}

/// Partial GitHub API response for a pull request.
#[derive(Debug, Deserialize)]
struct PullRequest {
    id: u64,
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    state: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    html_url: Option<String>,
}

impl From<PullRequest> for PullRequestSummary {
    fn from(pr: PullRequest) -> Self {
        Self {
            id: pr.id,
            number: pr.number,
            title: pr.title,
            created_at: pr.created_at,
            url: pr.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GitHubSource {
    pub fn new(config: GitHubSourceConfig) -> Result<Self, GitHubError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(GitHubError::Client)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GitHubSourceConfig {
        &self.config
    }

    /// Fetch every open pull request of `repo`, following pages until a short
    /// page or `max_pages`.
    pub async fn list_open(
        &self,
        repo: &RepositoryReference,
    ) -> Result<Vec<PullRequestSummary>, GitHubError> {
        let per_page = self.config.per_page.clamp(1, MAX_PER_PAGE);
        let max_pages = self.config.max_pages.max(1);
        let mut all = Vec::new();

        for page in 1..=max_pages {
            let batch = self.fetch_page(repo, per_page, page).await?;
            let fetched = batch.len();

            all.extend(
                batch
                    .into_iter()
                    .filter(|pr| pr.state.as_deref().is_none_or(|s| s == "open"))
                    .map(PullRequestSummary::from),
            );

            if fetched < per_page as usize {
                break;
            }
            if page == max_pages {
                tracing::warn!(
                    repo = %repo,
                    pages = page,
                    "Reached max_pages with a full last page; further pull requests may not have been checked"
                );
            }
        }

        Ok(all)
    }

    async fn fetch_page(
        &self,
        repo: &RepositoryReference,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<PullRequest>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/pulls",
            self.config.api_url.trim_end_matches('/'),
            repo.owner(),
            repo.name()
        );

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("state", "open".to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ])
            .header("Authorization", format!("Bearer {}", self.config.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| GitHubError::InvalidResponse(e.to_string()))
    }
}

/// Turn a non-success response into the matching [`GitHubError`].
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GitHubError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let rate_limit_exhausted = resp
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "0");

    match status {
        StatusCode::UNAUTHORIZED => Err(GitHubError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => Err(GitHubError::RateLimited),
        StatusCode::FORBIDDEN if rate_limit_exhausted => Err(GitHubError::RateLimited),
        StatusCode::FORBIDDEN => Err(GitHubError::Forbidden),
        StatusCode::NOT_FOUND => Err(GitHubError::NotFound),
        _ => {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or(text);
            Err(GitHubError::api_error(status.as_u16(), message))
        },
    }
}

#[async_trait]
impl PullRequestSource for GitHubSource {
    async fn list_open_pull_requests(
        &self,
        repo: &RepositoryReference,
    ) -> Result<Vec<PullRequestSummary>, FetchError> {
        self.list_open(repo)
            .await
            .map_err(|e| FetchError::new(repo, e))
    }
}
