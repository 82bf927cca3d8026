use serde::Deserialize;

/// Public GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub caps `per_page` at this value.
pub const MAX_PER_PAGE: u32 = 100;

/// Configuration for the GitHub pull request source.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GitHubSourceConfig {
    /// Personal access token for API authentication.
    pub token: String,
    /// API base URL. Override for GitHub Enterprise.
    pub api_url: String,
    /// Page size for the pull request listing.
    pub per_page: u32,
    /// Upper bound on pages fetched per repository.
    pub max_pages: u32,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for GitHubSourceConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            per_page: MAX_PER_PAGE,
            max_pages: 10,
            request_timeout_secs: 30,
            user_agent: concat!("prnotify/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl std::fmt::Debug for GitHubSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSourceConfig")
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("api_url", &self.api_url)
            .field("per_page", &self.per_page)
            .field("max_pages", &self.max_pages)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
