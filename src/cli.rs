//! Command-line interface parsing for imgdock
//!
//! This module handles parsing of CLI arguments using clap, layering the
//! cache flags over the environment configuration, and the one-shot
//! `fetch`, `clear` and `stats` commands.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::cache::{CacheError, ImageCache};
use crate::config::CacheConfig;

/// Error types for CLI handling
#[derive(Debug, Error)]
pub enum CliError {
    /// A timeout flag was zero
    #[error("Invalid {0}: timeout must be at least 1 second")]
    InvalidTimeout(&'static str),

    /// The URL list file could not be read
    #[error("Failed to read URL file '{path}': {source}")]
    UrlsFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Cache operation failed
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Writing output failed
    #[error("Output error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding failed
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// imgdock - cache remote images locally and browse them in the terminal
#[derive(Parser, Debug)]
#[command(name = "imgdock")]
#[command(about = "Local image cache with de-duplicated downloads and a terminal viewer")]
#[command(version)]
pub struct Cli {
    /// Folder for cached images (default: platform cache dir, or IMGDOCK_CACHE_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Only cache URLs whose host contains this text (default: any host)
    #[arg(long, global = true, value_name = "HOST")]
    pub allowed_host: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    /// Read timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub read_timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands; `view` is used when none is given
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Browse images in the terminal viewer
    View {
        /// Image URLs to show
        urls: Vec<String>,

        /// File with one URL per line (blank lines and # comments are skipped)
        #[arg(long, value_name = "FILE")]
        urls_file: Option<PathBuf>,
    },
    /// Resolve URLs through the cache and print where each one lives
    Fetch {
        /// Image URLs to resolve
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Delete every cached file
    Clear,
    /// Show cache statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Returns the subcommand, defaulting to an empty `view`
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::View {
            urls: Vec::new(),
            urls_file: None,
        })
    }

    /// Applies command-line flags on top of `base`.
    ///
    /// # Returns
    /// * `Ok(CacheConfig)` with flags applied
    /// * `Err(CliError::InvalidTimeout)` if a timeout flag is zero
    pub fn cache_config(&self, base: CacheConfig) -> Result<CacheConfig, CliError> {
        let mut config = base;

        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(host) = &self.allowed_host {
            config.allowed_host = host.clone();
        }
        if let Some(secs) = self.connect_timeout {
            config.connect_timeout = timeout_from_secs(secs, "--connect-timeout")?;
        }
        if let Some(secs) = self.read_timeout {
            config.read_timeout = timeout_from_secs(secs, "--read-timeout")?;
        }

        Ok(config)
    }
}

fn timeout_from_secs(secs: u64, flag: &'static str) -> Result<Duration, CliError> {
    if secs == 0 {
        return Err(CliError::InvalidTimeout(flag));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a URL list: one per line, trimmed, skipping blanks and `#` comments
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Reads a URL list file
pub fn read_url_file(path: &Path) -> Result<Vec<String>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::UrlsFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_url_list(&text))
}

/// Collects the URLs for the viewer: positional ones first, then the file's
pub fn view_urls(urls: &[String], urls_file: Option<&Path>) -> Result<Vec<String>, CliError> {
    let mut all = urls.to_vec();
    if let Some(path) = urls_file {
        all.extend(read_url_file(path)?);
    }
    Ok(all)
}

/// Resolves every URL concurrently and prints `<url>\t<source>` in input order
pub async fn run_fetch<W: Write>(
    cache: &ImageCache,
    urls: &[String],
    out: &mut W,
) -> Result<(), CliError> {
    let sources = futures::future::join_all(urls.iter().map(|url| cache.get(url))).await;
    for (url, source) in urls.iter().zip(sources) {
        writeln!(out, "{}\t{}", url, source)?;
    }
    Ok(())
}

/// Clears the cache folder and reports how many files were removed
pub async fn run_clear<W: Write>(cache: &ImageCache, out: &mut W) -> Result<(), CliError> {
    let removed = cache.clear().await?;
    writeln!(out, "Removed {} cached files", removed)?;
    Ok(())
}

/// Prints cache statistics as text or JSON
pub async fn run_stats<W: Write>(
    cache: &ImageCache,
    json: bool,
    out: &mut W,
) -> Result<(), CliError> {
    let stats = cache.stats().await?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
        return Ok(());
    }

    let fmt_time = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string())
    };
    writeln!(out, "Cache dir: {}", cache.cache_dir().display())?;
    writeln!(out, "Files:     {}", stats.entries)?;
    writeln!(out, "Size:      {} bytes", stats.total_size)?;
    writeln!(out, "Oldest:    {}", fmt_time(stats.oldest))?;
    writeln!(out, "Newest:    {}", fmt_time(stats.newest))?;
    Ok(())
}
