use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Separator between entries of a watch-list string.
pub const WATCH_LIST_DELIMITER: char = ';';

/// A watch-list entry that is not of the form `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid repository `{entry}`: expected `owner/repo` (for github.com/owner/repo)")]
pub struct InvalidRepository {
    pub entry: String,
}

/// One repository to inspect, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryReference {
    owner: String,
    name: String,
}

impl RepositoryReference {
    /// Parse an `owner/name` string. Both parts must be non-empty and there
    /// must be exactly one `/`.
    pub fn parse(entry: &str) -> Result<Self, InvalidRepository> {
        let mut parts = entry.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(InvalidRepository {
                entry: entry.to_string(),
            }),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepositoryReference {
    type Err = InvalidRepository;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Result of parsing a watch-list: valid repositories and rejected entries,
/// each in the order they appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchList {
    pub valid: Vec<RepositoryReference>,
    pub invalid: Vec<String>,
}

impl WatchList {
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty() && self.invalid.is_empty()
    }
}

/// Split a `;`-separated watch-list into repository references.
///
/// A malformed entry is collected into `invalid` and never stops the entries
/// after it from being parsed. An empty string yields an empty list; whether
/// that is acceptable is up to the caller.
pub fn parse_watch_list(raw: &str) -> WatchList {
    let mut list = WatchList::default();
    if raw.is_empty() {
        return list;
    }

    for entry in raw.split(WATCH_LIST_DELIMITER) {
        match RepositoryReference::parse(entry) {
            Ok(repo) => list.valid.push(repo),
            Err(e) => list.invalid.push(e.entry),
        }
    }

    list
}
