use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::pull_request::{FetchError, PullRequestSource, PullRequestSummary};
use crate::repo::RepositoryReference;
use crate::staleness::{DEFAULT_STALE_THRESHOLD, select_stale};

/// Default number of repository queries allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Stale pull requests found across every watched repository.
///
/// `stale_urls` is ordered by repository (watch-list order), then by the order
/// the source returned pull requests within that repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StaleReport {
    pub stale_urls: Vec<String>,
    /// Repositories whose query failed during this pass.
    pub failed_repos: Vec<RepositoryReference>,
}

impl StaleReport {
    pub fn stale_count(&self) -> usize {
        self.stale_urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stale_urls.is_empty()
    }

    /// The link to surface in a notification, if there is anything stale.
    pub fn representative_url(&self) -> Option<&str> {
        self.stale_urls.first().map(String::as_str)
    }

    fn record_failure(&mut self, err: FetchError) {
        tracing::error!(repo = %err.repo, error = %err.source, "Couldn't get pull requests");
        self.failed_repos.push(err.repo);
    }

    fn record_stale(&mut self, repo: &RepositoryReference, stale: Vec<PullRequestSummary>) {
        for pr in stale {
            match pr.link() {
                Some(url) => self.stale_urls.push(url.to_string()),
                None => tracing::warn!(
                    repo = %repo,
                    number = pr.number,
                    "Stale pull request has no URL, leaving it out of the report"
                ),
            }
        }
    }
}

/// Queries every watched repository and folds the stale pull requests into a
/// single [`StaleReport`].
pub struct StaleReportAggregator<S> {
    source: S,
    threshold: Duration,
    concurrency: usize,
}

impl<S: PullRequestSource> StaleReportAggregator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            threshold: DEFAULT_STALE_THRESHOLD,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    /// Cap the number of in-flight queries. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run one pass over `repos`.
    ///
    /// Every repository is attempted exactly once. A failing repository is
    /// logged and recorded in `failed_repos` but never stops the others.
    /// Results are merged in `repos` order regardless of which query finishes
    /// first.
    pub async fn run(&self, repos: &[RepositoryReference], now: DateTime<Utc>) -> StaleReport {
        let results: Vec<_> = stream::iter(repos)
            .map(|repo| async move { (repo, self.source.list_open_pull_requests(repo).await) })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = StaleReport::default();
        for (repo, result) in results {
            match result {
                Ok(prs) => {
                    let open = prs.len();
                    let stale = select_stale(now, self.threshold, prs);
                    tracing::debug!(repo = %repo, open, stale = stale.len(), "Checked repository");
                    report.record_stale(repo, stale);
                },
                Err(e) => report.record_failure(e),
            }
        }

        tracing::debug!(urls = ?report.stale_urls, "Collected stale pull requests");
        report
    }
}
