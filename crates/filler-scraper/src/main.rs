//! Filler scraper CLI application.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use filler_scraper::{
    Fetcher, FillerScraper, ReqwestTransport, SourceSettings, SqliteCacheStore,
};
use shared::{Config, Database, FillerDataset};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape all configured animes and write the filler dataset (default)
    Run {
        /// Clear cache before running
        #[arg(long)]
        clear_cache: bool,
    },

    /// Look up one episode in the written filler dataset
    Lookup {
        /// Anime slug, e.g. one-piece
        slug: String,
        /// Season number
        season: u32,
        /// Episode number within the season
        episode: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    config
        .create_dirs()
        .context("Failed to create data directories")?;

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        shared::logging::parse_level(&config.logging.default_level)
            .context("Invalid logging.default_level")?
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "filler-scraper".to_string(),
        default_level: log_level,
        console: config.logging.console,
        file: config.logging.file,
        json_format: config.logging.json_format,
    })?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    let command = args.command.unwrap_or(Command::Run { clear_cache: false });
    match command {
        Command::Run { clear_cache } => run(&config, clear_cache).await,
        Command::Lookup {
            slug,
            season,
            episode,
        } => lookup(&config, &slug, season, episode),
    }
}

async fn run(config: &Config, clear_cache: bool) -> Result<()> {
    info!("Filler scraper starting");

    // Initialize cache
    let db_path = config.database_path();
    info!(db_path = %db_path.display(), "Opening request cache");
    let database = Database::open(&db_path).context("Failed to open request cache")?;
    let store = Arc::new(SqliteCacheStore::new(database));

    if clear_cache {
        info!("Clearing cache");
        store.clear().await.context("Failed to clear cache")?;
    }

    let cache_stats = store.stats(Utc::now()).await.context("Failed to get cache stats")?;
    info!(
        cached_entries = cache_stats.total_entries,
        stale_entries = cache_stats.stale_entries,
        cache_size_mb = cache_stats.total_size_bytes / 1_000_000,
        "Cache statistics"
    );

    // Initialize HTTP transport
    let transport = ReqwestTransport::new(config.scraper.timeout(), &config.scraper.user_agent)
        .context("Failed to create HTTP transport")?;

    let fetcher = Fetcher::new(store, Arc::new(transport), config.scraper.request_delay());
    let scraper = FillerScraper::new(fetcher, SourceSettings::from(&config.scraper));

    let (dataset, stats) = scraper
        .run(&config.scraper.animes)
        .await
        .context("Scraper aborted")?;

    let output_path = config.output_path();
    dataset
        .write(&output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    info!("=== Scraping Complete ===");
    info!("Titles: {}", stats.titles);
    info!("Succeeded: {}", stats.succeeded);
    info!("Failed: {}", stats.failed);
    info!("Records: {}", stats.records);
    info!("Filler episodes: {}", stats.fillers);
    info!("Output: {}", output_path.display());

    Ok(())
}

fn lookup(config: &Config, slug: &str, season: u32, episode: u32) -> Result<()> {
    let dataset = FillerDataset::load(config.output_path())?;

    if dataset.get(slug).is_none() {
        bail!("No filler data for {}", slug);
    }

    match dataset.find(slug, season, episode) {
        Some(record) => {
            let kind = if record.is_filler { "filler" } else { "canon" };
            println!(
                "{} S{:02}E{:02} (#{}) {}: {} [{}]",
                slug, record.season, record.episode, record.id, kind, record.title, record.date
            );
        }
        None => println!("{} S{:02}E{:02}: not listed", slug, season, episode),
    }

    Ok(())
}
