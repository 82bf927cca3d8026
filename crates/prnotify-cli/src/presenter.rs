use async_trait::async_trait;
use tokio::process::Command;

use prnotify_core::{Notification, NotificationPresenter, PresentationError};

use crate::config::{NotificationConfig, NotifierBackend};

/// Shows notifications through the `terminal-notifier` command line tool.
pub struct TerminalNotifierPresenter {
    program: String,
}

impl TerminalNotifierPresenter {
    pub fn new() -> Self {
        Self::with_program("terminal-notifier")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for TerminalNotifierPresenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Command line arguments for one notification.
pub fn notifier_args(notification: &Notification) -> Vec<String> {
    let mut args = vec![
        "-title".to_string(),
        notification.title.clone(),
        "-subtitle".to_string(),
        notification.subtitle.clone(),
        "-message".to_string(),
        notification.body.clone(),
    ];
    if let Some(link) = &notification.link {
        args.push("-open".to_string());
        args.push(link.clone());
    }
    if let Some(sound) = &notification.sound {
        args.push("-sound".to_string());
        args.push(sound.clone());
    }
    args
}

#[async_trait]
impl NotificationPresenter for TerminalNotifierPresenter {
    async fn present(&self, notification: &Notification) -> Result<(), PresentationError> {
        tracing::debug!(program = %self.program, "Showing notification");
        let output = Command::new(&self.program)
            .args(notifier_args(notification))
            .output()
            .await
            .map_err(|source| PresentationError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PresentationError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Writes the notification as a log record instead of showing it.
pub struct LogPresenter;

#[async_trait]
impl NotificationPresenter for LogPresenter {
    async fn present(&self, notification: &Notification) -> Result<(), PresentationError> {
        tracing::info!(
            title = %notification.title,
            subtitle = %notification.subtitle,
            link = notification.link.as_deref().unwrap_or(""),
            "{}",
            notification.body
        );
        Ok(())
    }
}

/// Build the presenter selected in the config.
pub fn build_presenter(config: &NotificationConfig) -> Box<dyn NotificationPresenter> {
    match config.backend {
        NotifierBackend::TerminalNotifier => Box::new(TerminalNotifierPresenter::new()),
        NotifierBackend::Log => Box::new(LogPresenter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(link: Option<&str>, sound: Option<&str>) -> Notification {
        Notification {
            title: "Stale Pull Requests".to_string(),
            subtitle: "Click to see newest stale PR".to_string(),
            body: "There are 3 stale pull requests".to_string(),
            link: link.map(String::from),
            sound: sound.map(String::from),
        }
    }

    #[test]
    fn args_include_link_and_sound() {
        let args = notifier_args(&notification(
            Some("https://github.com/a/b/pull/1"),
            Some("Basso"),
        ));
        assert_eq!(
            args,
            vec![
                "-title",
                "Stale Pull Requests",
                "-subtitle",
                "Click to see newest stale PR",
                "-message",
                "There are 3 stale pull requests",
                "-open",
                "https://github.com/a/b/pull/1",
                "-sound",
                "Basso",
            ]
        );
    }

    #[test]
    fn args_omit_missing_link() {
        let args = notifier_args(&notification(None, None));
        assert!(!args.contains(&"-open".to_string()));
        assert!(!args.contains(&"-sound".to_string()));
        assert_eq!(args.len(), 6);
    }

    #[tokio::test]
    async fn log_presenter_always_succeeds() {
        assert!(LogPresenter.present(&notification(None, None)).await.is_ok());
    }

    #[tokio::test]
    async fn missing_program_is_launch_error() {
        let presenter = TerminalNotifierPresenter::with_program("prnotify-no-such-notifier");
        let err = presenter
            .present(&notification(None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, PresentationError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_program_is_ok() {
        let presenter = TerminalNotifierPresenter::with_program("true");
        assert!(presenter.present(&notification(None, None)).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_program_is_reported() {
        let presenter = TerminalNotifierPresenter::with_program("false");
        let err = presenter
            .present(&notification(Some("https://github.com/a/b/pull/1"), None))
            .await
            .unwrap_err();
        match err {
            PresentationError::Failed { program, .. } => assert_eq!(program, "false"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
