//! Cache configuration
//!
//! Settings come from three layers: built-in defaults, `IMGDOCK_*` environment
//! variables, and finally command-line flags (applied in `cli`).

use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

/// Default connect and read timeout for image downloads
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variable overriding the cache directory
pub const ENV_CACHE_DIR: &str = "IMGDOCK_CACHE_DIR";
/// Environment variable holding the host whitelist substring
pub const ENV_ALLOWED_HOST: &str = "IMGDOCK_ALLOWED_HOST";
/// Environment variable for the connect timeout in seconds
pub const ENV_CONNECT_TIMEOUT: &str = "IMGDOCK_CONNECT_TIMEOUT_SECS";
/// Environment variable for the read timeout in seconds
pub const ENV_READ_TIMEOUT: &str = "IMGDOCK_READ_TIMEOUT_SECS";

/// Configuration for the image cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Folder holding cached image files
    pub cache_dir: PathBuf,
    /// Substring that must appear in a URL's host for it to be cached.
    /// An empty string matches every host.
    pub allowed_host: String,
    /// Timeout for establishing the HTTP connection
    pub connect_timeout: Duration,
    /// Timeout for reading the response
    pub read_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir().unwrap_or_else(|| PathBuf::from("./cache/images")),
            allowed_host: String::new(),
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl CacheConfig {
    /// Builds a configuration from the process environment on top of the defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Unparseable timeout values are ignored and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|s| !s.is_empty()) {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup(ENV_ALLOWED_HOST) {
            config.allowed_host = host;
        }
        if let Some(secs) = lookup(ENV_CONNECT_TIMEOUT).and_then(|s| parse_secs(&s)) {
            config.connect_timeout = secs;
        }
        if let Some(secs) = lookup(ENV_READ_TIMEOUT).and_then(|s| parse_secs(&s)) {
            config.read_timeout = secs;
        }

        config
    }
}

fn parse_secs(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Returns the XDG-compliant image cache directory
///
/// Uses `~/.cache/imgdock/images` on Linux, or the platform equivalent.
/// Returns `None` if no home directory can be determined.
pub fn default_cache_dir() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "imgdock")?;
    Some(project_dirs.cache_dir().join("images"))
}

/// Returns the directory the TUI writes its log file to
pub fn default_log_dir() -> PathBuf {
    ProjectDirs::from("", "", "imgdock")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir)
}
