use std::process::ExitCode;

use prnotify_cli::app::{PassOutcome, StartupError, exit_status, run_pass};
use prnotify_cli::config::PrNotifyConfig;
use prnotify_cli::logging::{self, LogFormat};
use prnotify_cli::presenter::build_presenter;
use prnotify_github::GitHubSource;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init(LogFormat::from_env());

    let result = run().await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "prnotify could not start");
    }
    ExitCode::from(exit_status(&result))
}

async fn run() -> Result<PassOutcome, StartupError> {
    let config = PrNotifyConfig::load()?;
    config.validate()?;

    let source = GitHubSource::new(config.github.clone())?;
    let presenter = build_presenter(&config.notification);

    Ok(run_pass(&config, source, presenter.as_ref(), chrono::Utc::now()).await)
}
