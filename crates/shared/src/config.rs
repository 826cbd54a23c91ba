//! Configuration management for the filler scraper.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Database settings
    pub database: DatabaseConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Scraper settings
    pub scraper: ScraperConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Request cache file path (relative to data directory or absolute)
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Base URL of the streaming site listing seasons and episodes
    pub primary_base_url: String,

    /// Base URL of the filler list site
    pub secondary_base_url: String,

    /// Anime slugs to process, shared by both sites
    pub animes: Vec<String>,

    /// Freshness window for cached responses
    pub cache_max_age_seconds: u64,

    /// Pause after every successful network request
    pub request_delay_ms: u64,

    /// HTTP client timeout
    pub timeout_seconds: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Output file (relative to data directory or absolute)
    pub output_file: String,
}

impl ScraperConfig {
    /// Cache freshness window as a duration
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_seconds)
    }

    /// Inter-request delay as a duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// HTTP timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            primary_base_url: "https://aniworld.to/anime/stream".to_string(),
            secondary_base_url: "https://www.animefillerlist.com/shows".to_string(),
            animes: vec![
                "one-piece".to_string(),
                "bleach".to_string(),
                "naruto-shippuden".to_string(),
            ],
            cache_max_age_seconds: 3600,
            request_delay_ms: 1000,
            timeout_seconds: 30,
            user_agent: "filler-scraper/0.1.0".to_string(),
            output_file: "fillers.json".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            database: DatabaseConfig {
                path: "request_cache.sqlite".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: true,
                json_format: false,
            },
            scraper: ScraperConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Get the path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the path for the request cache database
    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.database.path)
    }

    /// Get the path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    /// Get the path for the filler dataset
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.scraper.output_file)
    }

    /// Create the data directory and the parents of every configured file
    pub fn create_dirs(&self) -> Result<()> {
        let dirs = [
            self.data_dir(),
            self.log_dir(),
            parent_or_self(self.database_path()),
            parent_or_self(self.output_path()),
        ];

        for dir in dirs {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        Ok(())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}

fn parent_or_self(path: PathBuf) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.root_dir, "data");
        assert_eq!(config.database.path, "request_cache.sqlite");
        assert_eq!(config.scraper.cache_max_age_seconds, 3600);
        assert_eq!(config.scraper.request_delay(), Duration::from_secs(1));
        assert_eq!(config.scraper.animes.len(), 3);
    }

    #[test]
    fn test_load_written_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.scraper.animes = vec!["bleach".to_string()];
        std::fs::write(&config_path, toml::to_string_pretty(&original_config)?)?;

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.data.root_dir, original_config.data.root_dir);
        assert_eq!(loaded_config.scraper.animes, vec!["bleach".to_string()]);
        assert_eq!(
            loaded_config.scraper.primary_base_url,
            original_config.scraper.primary_base_url
        );

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.data.root_dir, "data");
    }

    #[test]
    fn test_load_invalid_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "scraper = 12")?;

        assert!(Config::from_file(&config_path).is_err());

        Ok(())
    }

    #[test]
    fn test_path_resolution() {
        let mut config = Config::default();

        assert!(config.database_path().ends_with("data/request_cache.sqlite"));
        assert!(config.log_dir().ends_with("data/logs"));
        assert!(config.output_path().ends_with("data/fillers.json"));

        config.scraper.output_file = "/tmp/fillers.json".to_string();
        assert_eq!(config.output_path(), PathBuf::from("/tmp/fillers.json"));
    }

    #[test]
    fn test_create_dirs() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut config = Config::default();
        config.data.root_dir = temp_dir.path().join("data").to_string_lossy().to_string();
        config.scraper.output_file = "out/fillers.json".to_string();

        config.create_dirs()?;

        assert!(temp_dir.path().join("data/logs").is_dir());
        assert!(temp_dir.path().join("data/out").is_dir());
        Ok(())
    }
}
