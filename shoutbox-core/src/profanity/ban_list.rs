use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BanListError {
    #[error("Failed to read ban list from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Ban list source unavailable: {0}")]
    Unavailable(String),
}

/// Lowercase tokens that are not allowed in submitted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanList {
    tokens: HashSet<String>,
}

impl BanList {
    /// Parse a word list delimited by commas or line breaks.
    ///
    /// Entries are trimmed and lowercased; blank entries are ignored, so a
    /// trailing comma or newline never bans the empty token.
    pub fn parse(raw: &str) -> Self {
        let tokens = raw
            .split([',', '\n', '\r'])
            .map(|entry| entry.trim().to_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();
        Self { tokens }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Where the raw ban list comes from.
pub trait BanListSource: Send + Sync + std::fmt::Debug {
    fn load(&self) -> Result<String, BanListError>;
}

/// Reads the ban list from a text file.
#[derive(Debug, Clone)]
pub struct FileBanListSource {
    path: PathBuf,
}

impl FileBanListSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BanListSource for FileBanListSource {
    fn load(&self) -> Result<String, BanListError> {
        std::fs::read_to_string(&self.path).map_err(|source| BanListError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// An in-memory ban list, handy for fixed deployments and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticBanListSource(pub String);

impl BanListSource for StaticBanListSource {
    fn load(&self) -> Result<String, BanListError> {
        Ok(self.0.clone())
    }
}
