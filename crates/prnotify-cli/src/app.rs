use chrono::{DateTime, Utc};
use thiserror::Error;

use prnotify_core::{
    Notification, NotificationPresenter, PullRequestSource, StaleReport, StaleReportAggregator,
};
use prnotify_github::GitHubError;

use crate::config::{ConfigError, PrNotifyConfig};

/// Problems that stop the process before any repository is queried.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to set up GitHub client: {0}")]
    Client(#[from] GitHubError),
}

/// Process exit status: 1 if startup failed, 0 once a pass has run, whatever
/// the pass found or failed to query.
pub fn exit_status(result: &Result<PassOutcome, StartupError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

/// What one pass did.
#[derive(Debug)]
pub struct PassOutcome {
    pub report: StaleReport,
    /// Watch-list entries skipped because they were not `owner/repo`.
    pub invalid_entries: Vec<String>,
    /// Whether a notification was handed to the presenter and accepted.
    pub notified: bool,
}

/// Run one pass: parse the watch-list, query every repository, and present a
/// single notification. Only configuration problems are fatal, and those are
/// caught before this is called; everything here is logged and absorbed.
pub async fn run_pass<S, P>(
    config: &PrNotifyConfig,
    source: S,
    presenter: &P,
    now: DateTime<Utc>,
) -> PassOutcome
where
    S: PullRequestSource,
    P: NotificationPresenter + ?Sized,
{
    let watch_list = config.watch_list();
    for entry in &watch_list.invalid {
        tracing::error!(
            entry = %entry,
            "Invalid repo name supplied. If repo name is github.com/owner/repo, supplied format is 'owner/repo'"
        );
    }

    let repos: Vec<String> = watch_list.valid.iter().map(ToString::to_string).collect();
    tracing::info!(?repos, "Starting prnotify, watching repos");

    let aggregator = StaleReportAggregator::new(source)
        .with_threshold(config.stale_threshold())
        .with_concurrency(config.max_concurrent_requests);
    let report = aggregator.run(&watch_list.valid, now).await;

    tracing::info!(
        stale_count = report.stale_count(),
        failed = report.failed_repos.len(),
        "Finished checking repositories"
    );

    let notified = notify(config, &report, presenter).await;

    PassOutcome {
        report,
        invalid_entries: watch_list.invalid,
        notified,
    }
}

async fn notify<P>(config: &PrNotifyConfig, report: &StaleReport, presenter: &P) -> bool
where
    P: NotificationPresenter + ?Sized,
{
    if report.is_empty() && !config.notification.notify_when_empty {
        tracing::info!("No stale pull requests, skipping notification");
        return false;
    }

    let notification = Notification::from_report(report, &config.notification.template);
    match presenter.present(&notification).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, urls = ?report.stale_urls, "Problem making notification");
            false
        },
    }
}
