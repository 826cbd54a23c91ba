//! Filler scraper library.
//!
//! Builds a per-anime list of filler episodes by correlating the flat
//! episode numbers of a filler list site with the season/episode layout of a
//! streaming site. Fetched pages are kept in a persisted cache so repeated
//! runs stay off the network while the cache is fresh.

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod index;
pub mod merger;
pub mod parser;
pub mod pipeline;

pub use cache::{CacheStats, CacheStore, MemoryCacheStore, SqliteCacheStore};
pub use error::{FetchError, ParseError, ScrapeError, StoreError, TransportError};
pub use fetcher::{Fetcher, HttpTransport, ReqwestTransport};
pub use index::EpisodeIndex;
pub use pipeline::{FillerScraper, ScraperStats, SourceSettings};
