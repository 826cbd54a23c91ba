//! Error types for the scraping pipeline.
//!
//! Storage failures abort the whole run, fetch and parse failures abort a
//! single title. Unmapped filler list rows are not errors and only logged.

use thiserror::Error;

/// Failure of the persisted response cache
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("cache entry for {url} is corrupt: {reason}")]
    Corrupt { url: String, reason: String },
}

/// Failure of a single HTTP request
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Network failure with no cached copy to fall back on
#[derive(Debug, Error)]
#[error("failed to fetch {url}: {source}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub source: TransportError,
}

/// Page did not have the expected structure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected season and episode lists under #stream, found {found} list(s)")]
    MissingContainers { found: usize },

    #[error("invalid link {link:?}: {reason}")]
    InvalidLink { link: String, reason: String },
}

/// Any failure while scraping one title
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to parse {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: ParseError,
    },
}

impl ScrapeError {
    /// Whether the error must abort the whole run instead of one title
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScrapeError::Store(_))
    }

    pub(crate) fn parse(url: impl Into<String>, source: ParseError) -> Self {
        ScrapeError::Parse {
            url: url.into(),
            source,
        }
    }
}
