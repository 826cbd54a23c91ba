//! Data models for the project.
//!
//! This module defines the data structures used throughout the pipeline:
//! cached HTTP responses, parsed page listings, episode coordinates and the
//! filler records written to the output file.

use anyhow::{Context, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A cached response body keyed by its request URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url: String,
    pub data: String,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Build an entry cached at `now` that stays fresh for `max_age`
    ///
    /// Both timestamps are truncated to whole milliseconds, the resolution
    /// the cache table stores.
    pub fn new(
        url: impl Into<String>,
        data: impl Into<String>,
        now: DateTime<Utc>,
        max_age: std::time::Duration,
    ) -> Self {
        let now = now.trunc_subsecs(3);
        let expires_at = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .trunc_subsecs(3);
        Self {
            url: url.into(),
            data: data.into(),
            cached_at: now,
            expires_at,
        }
    }

    /// Whether the entry is still inside its freshness window
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// A numbered link from a season or episode list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub num: u32,
    pub link: String,
}

/// Season and episode links found on a streaming page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub seasons: Vec<PageLink>,
    pub episodes: Vec<PageLink>,
}

/// Position of an episode inside its season (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EpisodeCoordinate {
    pub season: u32,
    pub episode: u32,
}

/// One row of a filler list table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRow {
    pub id: u32,
    pub title: String,
    pub date: String,
    pub is_filler: bool,
}

/// A filler list row joined with its season/episode coordinate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillerRecord {
    pub id: u32,
    pub title: String,
    pub date: String,
    pub is_filler: bool,
    pub season: u32,
    pub episode: u32,
}

impl FillerRecord {
    pub fn new(row: ClassificationRow, coordinate: EpisodeCoordinate) -> Self {
        Self {
            id: row.id,
            title: row.title,
            date: row.date,
            is_filler: row.is_filler,
            season: coordinate.season,
            episode: coordinate.episode,
        }
    }
}

/// Filler records of every successfully scraped anime, keyed by slug
///
/// Serialized as a JSON object mapping slug to its ordered record list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FillerDataset {
    animes: BTreeMap<String, Vec<FillerRecord>>,
}

impl FillerDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the records of one anime, replacing any previous list
    pub fn insert(&mut self, slug: impl Into<String>, records: Vec<FillerRecord>) {
        self.animes.insert(slug.into(), records);
    }

    pub fn get(&self, slug: &str) -> Option<&[FillerRecord]> {
        self.animes.get(slug).map(Vec::as_slice)
    }

    /// Find the record for a season/episode pair of an anime
    pub fn find(&self, slug: &str, season: u32, episode: u32) -> Option<&FillerRecord> {
        self.get(slug)?
            .iter()
            .find(|record| record.season == season && record.episode == episode)
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.animes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.animes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animes.is_empty()
    }

    /// Total number of records across all animes
    pub fn record_count(&self) -> usize {
        self.animes.values().map(Vec::len).sum()
    }

    /// Serialize the dataset to a JSON file
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize filler dataset")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write filler dataset: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            animes = self.len(),
            records = self.record_count(),
            "Filler dataset written"
        );

        Ok(())
    }

    /// Load a dataset previously written with [`FillerDataset::write`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read filler dataset: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse filler dataset: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;
    use tempfile::TempDir;

    fn record(id: u32, season: u32, episode: u32, is_filler: bool) -> FillerRecord {
        FillerRecord {
            id,
            title: format!("Episode {}", id),
            date: "1999-10-20".to_string(),
            is_filler,
            season,
            episode,
        }
    }

    #[test]
    fn test_cache_entry_freshness() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let entry = CacheEntry::new("https://example.com", "body", now, Duration::from_secs(60));

        assert_eq!(entry.expires_at - entry.cached_at, chrono::Duration::seconds(60));
        assert!(entry.is_fresh(now));
        assert!(entry.is_fresh(now + chrono::Duration::seconds(59)));
        assert!(!entry.is_fresh(now + chrono::Duration::seconds(60)));
    }

    #[test]
    fn test_cache_entry_millisecond_resolution() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(958_554_906);
        let entry = CacheEntry::new("https://example.com", "body", now, Duration::from_secs(60));

        assert_eq!(entry.cached_at.timestamp_subsec_nanos(), 958_000_000);
        assert_eq!(entry.expires_at - entry.cached_at, chrono::Duration::seconds(60));
        assert!(entry.is_fresh(now));
    }

    #[test]
    fn test_zero_max_age_is_never_fresh() {
        let now = Utc::now();
        let entry = CacheEntry::new("https://example.com", "body", now, Duration::ZERO);
        assert!(!entry.is_fresh(now));
    }

    #[test]
    fn test_filler_record_field_names() {
        let json = serde_json::to_value(record(1, 1, 1, true)).unwrap();
        let object = json.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["date", "episode", "id", "isFiller", "season", "title"]);
        assert_eq!(object["isFiller"], serde_json::Value::Bool(true));
    }

    #[test]
    fn test_record_from_row() {
        let row = ClassificationRow {
            id: 5,
            title: "Romance Dawn".to_string(),
            date: "1999-10-20".to_string(),
            is_filler: false,
        };
        let record = FillerRecord::new(row, EpisodeCoordinate { season: 2, episode: 3 });

        assert_eq!(record.id, 5);
        assert_eq!(record.title, "Romance Dawn");
        assert_eq!((record.season, record.episode), (2, 3));
    }

    #[test]
    fn test_dataset_find() {
        let mut dataset = FillerDataset::new();
        dataset.insert("bleach", vec![record(1, 1, 1, false), record(2, 1, 2, true)]);

        assert_eq!(dataset.find("bleach", 1, 2).map(|r| r.id), Some(2));
        assert!(dataset.find("bleach", 2, 1).is_none());
        assert!(dataset.find("naruto", 1, 1).is_none());
        assert_eq!(dataset.record_count(), 2);
    }

    #[test]
    fn test_dataset_write_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("fillers.json");

        let mut dataset = FillerDataset::new();
        dataset.insert("one-piece", vec![record(1, 1, 1, false)]);
        dataset.insert("bleach", vec![record(64, 2, 1, true)]);
        dataset.write(&path)?;

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert!(raw["bleach"].is_array());
        assert_eq!(raw["bleach"][0]["isFiller"], serde_json::Value::Bool(true));

        let loaded = FillerDataset::load(&path)?;
        assert_eq!(loaded, dataset);
        assert_eq!(loaded.slugs().collect::<Vec<_>>(), ["bleach", "one-piece"]);

        Ok(())
    }
}
