use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

use prnotify_core::{DEFAULT_CONCURRENCY, NotificationTemplate, WatchList, parse_watch_list};
use prnotify_github::GitHubSourceConfig;
use prnotify_github::config::MAX_PER_PAGE;

/// Config file read from the working directory when `PRNOTIFY_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "prnotify.toml";

/// Largest accepted threshold: one hundred years.
const MAX_THRESHOLD_HOURS: u64 = 24 * 365 * 100;

/// Errors that stop the process before any repository is queried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no repos have been set, nothing to watch (set PRNOTIFY_REPOS_TO_WATCH)")]
    MissingWatchList,

    #[error("github api token is not configured (set PRNOTIFY_GITHUB_API_TOKEN)")]
    MissingToken,

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Which presenter renders the final notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotifierBackend {
    #[default]
    TerminalNotifier,
    Log,
}

impl NotifierBackend {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "terminal-notifier" => Some(Self::TerminalNotifier),
            "log" => Some(Self::Log),
            _ => None,
        }
    }
}

/// `[notification]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub backend: NotifierBackend,
    /// Still notify when nothing is stale (the alert then carries no link).
    pub notify_when_empty: bool,
    #[serde(flatten)]
    pub template: NotificationTemplate,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            backend: NotifierBackend::default(),
            notify_when_empty: true,
            template: NotificationTemplate::default(),
        }
    }
}

/// Top-level configuration, built once at startup and passed down.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrNotifyConfig {
    /// Semicolon separated `owner/repo` list.
    pub repos_to_watch: String,
    pub stale_threshold_hours: u64,
    pub max_concurrent_requests: usize,
    pub github: GitHubSourceConfig,
    pub notification: NotificationConfig,
}

impl Default for PrNotifyConfig {
    fn default() -> Self {
        Self {
            repos_to_watch: String::new(),
            stale_threshold_hours: 48,
            max_concurrent_requests: DEFAULT_CONCURRENCY,
            github: GitHubSourceConfig::default(),
            notification: NotificationConfig::default(),
        }
    }
}

impl PrNotifyConfig {
    /// Load from the process environment: config file first, then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `env` for variable lookups.
    ///
    /// `PRNOTIFY_CONFIG` names an explicit file, which must exist and parse.
    /// Otherwise `prnotify.toml` is used if present; a broken default file is
    /// logged and replaced by defaults.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match env("PRNOTIFY_CONFIG").filter(|p| !p.is_empty()) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::from_default_file(Path::new(DEFAULT_CONFIG_FILE)),
        };
        config.apply_env(env);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    fn from_default_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<PrNotifyConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "Loaded configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    PrNotifyConfig::default()
                },
            },
            Err(_) => {
                tracing::debug!("No {} found, using defaults", path.display());
                PrNotifyConfig::default()
            },
        }
    }

    /// Apply `PRNOTIFY_*` overrides. Unparseable numbers are logged and ignored.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(repos) = env("PRNOTIFY_REPOS_TO_WATCH")
            && !repos.is_empty()
        {
            self.repos_to_watch = repos;
        }
        if let Some(token) = env("PRNOTIFY_GITHUB_API_TOKEN")
            && !token.is_empty()
        {
            self.github.token = token;
        }
        if let Some(url) = env("PRNOTIFY_GITHUB_API_URL")
            && !url.is_empty()
        {
            self.github.api_url = url;
        }
        if let Some(val) = env("PRNOTIFY_STALE_THRESHOLD_HOURS") {
            match val.parse::<u64>() {
                Ok(n) => self.stale_threshold_hours = n,
                Err(_) => tracing::warn!(value = %val, "Ignoring PRNOTIFY_STALE_THRESHOLD_HOURS"),
            }
        }
        if let Some(val) = env("PRNOTIFY_MAX_CONCURRENCY") {
            match val.parse::<usize>() {
                Ok(n) => self.max_concurrent_requests = n,
                Err(_) => tracing::warn!(value = %val, "Ignoring PRNOTIFY_MAX_CONCURRENCY"),
            }
        }
        if let Some(val) = env("PRNOTIFY_NOTIFIER") {
            match NotifierBackend::from_name(&val) {
                Some(backend) => self.notification.backend = backend,
                None => tracing::warn!(value = %val, "Ignoring unknown PRNOTIFY_NOTIFIER"),
            }
        }
    }

    /// Check everything the pass depends on. Any error here is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repos_to_watch.is_empty() {
            return Err(ConfigError::MissingWatchList);
        }
        if self.github.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.stale_threshold_hours == 0 {
            return Err(ConfigError::invalid("stale_threshold_hours", "must be > 0"));
        }
        if self.stale_threshold_hours > MAX_THRESHOLD_HOURS {
            return Err(ConfigError::invalid(
                "stale_threshold_hours",
                format!("must be <= {MAX_THRESHOLD_HOURS}"),
            ));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::invalid("max_concurrent_requests", "must be > 0"));
        }
        if self.github.per_page == 0 || self.github.per_page > MAX_PER_PAGE {
            return Err(ConfigError::invalid(
                "github.per_page",
                format!("must be between 1 and {MAX_PER_PAGE}"),
            ));
        }
        if self.github.max_pages == 0 {
            return Err(ConfigError::invalid("github.max_pages", "must be > 0"));
        }
        if self.github.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("github.request_timeout_secs", "must be > 0"));
        }
        if self.github.api_url.is_empty() {
            return Err(ConfigError::invalid("github.api_url", "must not be empty"));
        }
        Ok(())
    }

    pub fn watch_list(&self) -> WatchList {
        parse_watch_list(&self.repos_to_watch)
    }

    pub fn stale_threshold(&self) -> Duration {
        // Bounded by validate().
        Duration::hours(self.stale_threshold_hours.min(MAX_THRESHOLD_HOURS) as i64)
    }
}
