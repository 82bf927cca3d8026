use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::StaleReport;

/// Fixed text used when turning a report into a notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotificationTemplate {
    pub title: String,
    pub subtitle: String,
    /// Sound name passed through to the presenter untouched.
    pub sound: Option<String>,
}

impl Default for NotificationTemplate {
    fn default() -> Self {
        Self {
            title: "Stale Pull Requests".to_string(),
            subtitle: "Click to see newest stale PR".to_string(),
            sound: Some("Basso".to_string()),
        }
    }
}

/// A single desktop alert summarizing a [`StaleReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    /// Opened when the alert is clicked. Absent when nothing is stale.
    pub link: Option<String>,
    pub sound: Option<String>,
}

impl Notification {
    pub fn from_report(report: &StaleReport, template: &NotificationTemplate) -> Self {
        let body = match report.stale_count() {
            1 => "There is 1 stale pull request".to_string(),
            n => format!("There are {n} stale pull requests"),
        };
        Self {
            title: template.title.clone(),
            subtitle: template.subtitle.clone(),
            body,
            link: report.representative_url().map(String::from),
            sound: template.sound.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("failed to launch notifier `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("notifier `{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Renders a [`Notification`] to the user.
#[async_trait]
pub trait NotificationPresenter: Send + Sync {
    async fn present(&self, notification: &Notification) -> Result<(), PresentationError>;
}
