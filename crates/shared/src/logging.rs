//! Tracing setup for the scraper binary.
//!
//! Events go to stdout and, when enabled, to a daily log file under the
//! configured directory. `RUST_LOG` overrides the configured level.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Number of daily log files kept on disk
const RETAINED_LOG_FILES: usize = 7;

/// Crates whose events are noise below `warn` during a scrape
const QUIET_TARGETS: &[&str] = &["hyper", "reqwest", "h2", "html5ever", "selectors"];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_dir: String,
    /// Prefix of the log file names
    pub component: String,
    pub default_level: Level,
    pub console: bool,
    pub file: bool,
    /// Write file logs as JSON lines
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "data/logs".to_string(),
            component: "filler-scraper".to_string(),
            default_level: Level::INFO,
            console: true,
            file: true,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Filter directives used when `RUST_LOG` is not set
    fn directives(&self) -> String {
        let level = self.default_level.as_str().to_lowercase();
        let mut directives = vec![
            format!("filler_scraper={level}"),
            format!("shared={level}"),
        ];
        directives.extend(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")));
        directives.join(",")
    }

    fn file_layer(&self) -> Result<BoxedLayer> {
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(&self.component)
            .filename_suffix("log")
            .max_log_files(RETAINED_LOG_FILES)
            .build(&self.log_dir)
            .with_context(|| format!("Failed to create log file in {}", self.log_dir))?;

        let layer = fmt::layer().with_writer(appender).with_ansi(false);
        Ok(if self.json_format {
            layer.json().with_current_span(true).with_span_list(false).boxed()
        } else {
            layer.with_span_events(FmtSpan::CLOSE).boxed()
        })
    }
}

/// Install the global subscriber
pub fn init(config: LogConfig) -> Result<()> {
    std::fs::create_dir_all(Path::new(&config.log_dir))
        .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.directives()));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.console {
        layers.push(fmt::layer().with_writer(std::io::stdout).boxed());
    }
    if config.file {
        layers.push(config.file_layer()?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        log_dir = %config.log_dir,
        console = config.console,
        file = config.file,
        "Logging initialized"
    );

    Ok(())
}

/// Parse a level name from the config file (`trace` through `error`)
pub fn parse_level(level: &str) -> Result<Level> {
    match level.trim().parse() {
        Ok(level) => Ok(level),
        Err(_) => bail!("Unknown log level: {:?}", level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.component, "filler-scraper");
        assert_eq!(config.default_level, Level::INFO);
        assert!(config.console && config.file);
    }

    #[test]
    fn test_directives() {
        let config = LogConfig {
            default_level: Level::DEBUG,
            ..LogConfig::default()
        };

        let directives = config.directives();
        assert!(directives.starts_with("filler_scraper=debug,shared=debug,"));
        assert!(directives.contains("reqwest=warn"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_level(" WARN ").unwrap(), Level::WARN);
        assert!(parse_level("loud").is_err());
    }
}
