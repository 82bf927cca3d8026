use chrono::{DateTime, Duration, Utc};

use crate::pull_request::PullRequestSummary;

/// How long a pull request may stay open before it counts as stale: two days.
pub const DEFAULT_STALE_THRESHOLD: Duration = Duration::hours(48);

/// True if `pr` was created strictly before `now - threshold`.
///
/// A cutoff outside the representable date range means nothing is old enough.
pub fn is_stale(now: DateTime<Utc>, threshold: Duration, pr: &PullRequestSummary) -> bool {
    now.checked_sub_signed(threshold)
        .is_some_and(|cutoff| pr.created_at < cutoff)
}

/// Keep only the stale pull requests, preserving their order.
pub fn select_stale(
    now: DateTime<Utc>,
    threshold: Duration,
    prs: Vec<PullRequestSummary>,
) -> Vec<PullRequestSummary> {
    prs.into_iter()
        .filter(|pr| is_stale(now, threshold, pr))
        .collect()
}
