//! Main scraper orchestrator.
//!
//! Coordinates the per-title pipeline: streaming page, season pages, filler
//! list, and the merge into the final dataset.

use crate::error::{ParseError, ScrapeError, StoreError};
use crate::fetcher::Fetcher;
use crate::index::EpisodeIndex;
use crate::{merger, parser};
use futures::future::join_all;
use shared::config::ScraperConfig;
use shared::{FillerDataset, FillerRecord};
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

/// Where to find the two sources and how long their pages stay fresh
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub primary_base_url: String,
    pub secondary_base_url: String,
    pub max_age: Duration,
}

impl From<&ScraperConfig> for SourceSettings {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            primary_base_url: config.primary_base_url.clone(),
            secondary_base_url: config.secondary_base_url.clone(),
            max_age: config.cache_max_age(),
        }
    }
}

impl SourceSettings {
    fn primary_url(&self, slug: &str) -> String {
        format!("{}/{}", self.primary_base_url.trim_end_matches('/'), slug)
    }

    fn secondary_url(&self, slug: &str) -> String {
        format!("{}/{}", self.secondary_base_url.trim_end_matches('/'), slug)
    }
}

/// Statistics for a scraping run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScraperStats {
    pub titles: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub records: usize,
    pub fillers: usize,
}

/// Main scraper coordinator
pub struct FillerScraper {
    fetcher: Fetcher,
    sources: SourceSettings,
}

impl FillerScraper {
    /// Create a new filler scraper
    pub fn new(fetcher: Fetcher, sources: SourceSettings) -> Self {
        Self { fetcher, sources }
    }

    /// Scrape every title in `slugs`
    ///
    /// A title that fails to fetch or parse is logged and left out of the
    /// dataset. Cache storage failures abort the run.
    pub async fn run(&self, slugs: &[String]) -> Result<(FillerDataset, ScraperStats), StoreError> {
        info!(titles = slugs.len(), "Starting filler scraper");

        let mut dataset = FillerDataset::new();
        let mut stats = ScraperStats {
            titles: slugs.len(),
            ..Default::default()
        };

        for (idx, slug) in slugs.iter().enumerate() {
            info!(
                progress = format!("{}/{}", idx + 1, slugs.len()),
                slug = %slug,
                "Processing title"
            );

            match self.scrape_title(slug).await {
                Ok(records) => {
                    let fillers = records.iter().filter(|r| r.is_filler).count();
                    info!(slug = %slug, records = records.len(), fillers = fillers, "Title complete");

                    stats.succeeded += 1;
                    stats.records += records.len();
                    stats.fillers += fillers;
                    dataset.insert(slug.as_str(), records);
                }
                Err(ScrapeError::Store(e)) => {
                    error!(slug = %slug, error = %e, "Cache storage failed, aborting run");
                    return Err(e);
                }
                Err(e) => {
                    error!(slug = %slug, error = %e, "Failed to scrape title");
                    stats.failed += 1;
                }
            }
        }

        info!(
            titles = stats.titles,
            succeeded = stats.succeeded,
            failed = stats.failed,
            records = stats.records,
            fillers = stats.fillers,
            "Filler scraper complete"
        );

        Ok((dataset, stats))
    }

    /// Run the full pipeline for one title
    pub async fn scrape_title(&self, slug: &str) -> Result<Vec<FillerRecord>, ScrapeError> {
        let page_url = self.sources.primary_url(slug);
        let counts = self.season_episode_counts(&page_url).await?;

        let index = EpisodeIndex::build(&counts);
        info!(
            slug = %slug,
            seasons = counts.len(),
            episodes = index.len(),
            "Built episode index"
        );

        let list_url = self.sources.secondary_url(slug);
        let html = self.fetcher.fetch(&list_url, self.sources.max_age).await?;

        Ok(merger::merge(&html, &index))
    }

    /// Episode count of every numbered season, in season list order
    async fn season_episode_counts(&self, page_url: &str) -> Result<Vec<u32>, ScrapeError> {
        let html = self.fetcher.fetch(page_url, self.sources.max_age).await?;
        let info = parser::parse_page(&html).map_err(|e| ScrapeError::parse(page_url, e))?;

        let base = Url::parse(page_url).map_err(|e| {
            ScrapeError::parse(
                page_url,
                ParseError::InvalidLink {
                    link: page_url.to_string(),
                    reason: e.to_string(),
                },
            )
        })?;

        let season_urls = info
            .seasons
            .iter()
            .map(|season| {
                base.join(&season.link).map(String::from).map_err(|e| {
                    ScrapeError::parse(
                        page_url,
                        ParseError::InvalidLink {
                            link: season.link.clone(),
                            reason: e.to_string(),
                        },
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if season_urls.is_empty() {
            warn!(url = %page_url, "No numbered seasons found");
        }

        // Every season page is requested; the first failure is reported
        // once all of them have finished.
        let results = join_all(season_urls.iter().map(|url| self.season_size(url))).await;
        first_error(results)
    }

    async fn season_size(&self, url: &str) -> Result<u32, ScrapeError> {
        let html = self.fetcher.fetch(url, self.sources.max_age).await?;
        let info = parser::parse_page(&html).map_err(|e| ScrapeError::parse(url, e))?;

        Ok(info.episodes.len() as u32)
    }
}

/// Collect results, preferring a fatal error over any other
fn first_error<T>(results: Vec<Result<T, ScrapeError>>) -> Result<Vec<T>, ScrapeError> {
    let mut values = Vec::with_capacity(results.len());
    let mut failure = None;

    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(values),
    }
}
