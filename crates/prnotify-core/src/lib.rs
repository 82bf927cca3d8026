pub mod notify;
pub mod pull_request;
pub mod repo;
pub mod report;
pub mod staleness;

pub use notify::{Notification, NotificationPresenter, NotificationTemplate, PresentationError};
pub use pull_request::{FetchError, PullRequestSource, PullRequestSummary};
pub use repo::{InvalidRepository, RepositoryReference, WatchList, parse_watch_list};
pub use report::{DEFAULT_CONCURRENCY, StaleReport, StaleReportAggregator};
pub use staleness::{DEFAULT_STALE_THRESHOLD, is_stale, select_stale};

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use crate::notify::{Notification, NotificationPresenter, PresentationError};
    use crate::pull_request::{FetchError, PullRequestSource, PullRequestSummary};
    use crate::repo::RepositoryReference;

    /// Parse an `owner/name` string, panicking on malformed input.
    pub fn repo(s: &str) -> RepositoryReference {
        RepositoryReference::parse(s).expect("test repository must be owner/name")
    }

    /// Build a pull request summary with the given creation time and link.
    pub fn make_pr(number: u64, created_at: DateTime<Utc>, url: &str) -> PullRequestSummary {
        PullRequestSummary {
            id: 1000 + number,
            number,
            title: format!("Test PR {number}"),
            created_at,
            url: Some(url.to_string()),
        }
    }

    /// In-memory source answering from a fixed script. Repositories without a
    /// scripted answer fail with "not found".
    #[derive(Default)]
    pub struct ScriptedSource {
        responses: HashMap<RepositoryReference, Result<Vec<PullRequestSummary>, String>>,
        calls: Mutex<Vec<RepositoryReference>>,
    }

    impl ScriptedSource {
        pub fn respond(mut self, repo_name: &str, prs: Vec<PullRequestSummary>) -> Self {
            self.responses.insert(repo(repo_name), Ok(prs));
            self
        }

        pub fn fail(mut self, repo_name: &str, message: &str) -> Self {
            self.responses
                .insert(repo(repo_name), Err(message.to_string()));
            self
        }

        /// Repositories queried so far, in call order.
        pub fn calls(&self) -> Vec<RepositoryReference> {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }
    }

    #[async_trait]
    impl PullRequestSource for ScriptedSource {
        async fn list_open_pull_requests(
            &self,
            repo: &RepositoryReference,
        ) -> Result<Vec<PullRequestSummary>, FetchError> {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(repo.clone());
            match self.responses.get(repo) {
                Some(Ok(prs)) => Ok(prs.clone()),
                Some(Err(message)) => Err(FetchError::new(repo, message.clone())),
                None => Err(FetchError::new(repo, "not found")),
            }
        }
    }

    /// Presenter that remembers every notification, optionally failing.
    #[derive(Default)]
    pub struct RecordingPresenter {
        pub fail: bool,
        shown: Mutex<Vec<Notification>>,
    }

    impl RecordingPresenter {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn shown(&self) -> Vec<Notification> {
            self.shown
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }
    }

    #[async_trait]
    impl NotificationPresenter for RecordingPresenter {
        async fn present(&self, notification: &Notification) -> Result<(), PresentationError> {
            self.shown
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(notification.clone());
            if self.fail {
                return Err(PresentationError::Failed {
                    program: "recording".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "simulated failure".to_string(),
                });
            }
            Ok(())
        }
    }
}
