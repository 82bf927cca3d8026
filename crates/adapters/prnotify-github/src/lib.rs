pub mod config;
pub mod error;
pub mod source;

pub use config::GitHubSourceConfig;
pub use error::GitHubError;
pub use source::GitHubSource;
