//! Tracing subscriber setup
//!
//! One-shot commands log to stderr. The viewer owns the terminal, so it logs
//! to `imgdock.log` in the platform data directory instead.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// File name of the viewer log
pub const LOG_FILE_NAME: &str = "imgdock.log";

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Log file inside the platform data directory
    pub fn default_file() -> Self {
        LogTarget::File(crate::config::default_log_dir().join(LOG_FILE_NAME))
    }
}

/// Filter used when `RUST_LOG` is not set
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "imgdock=debug"
    } else {
        "imgdock=info"
    }
}

fn wants_json(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("json"))
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the default filter and `LOG_FORMAT=json` switches to
/// JSON lines. Calling this twice keeps the first subscriber.
pub fn init_logging(verbose: bool, target: &LogTarget) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let (writer, ansi) = match target {
        LogTarget::Stderr => (BoxMakeWriter::new(io::stderr), true),
        LogTarget::File(path) => (BoxMakeWriter::new(Mutex::new(open_log_file(path)?)), false),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false);

    let json = wants_json(std::env::var("LOG_FORMAT").ok().as_deref());
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
    Ok(())
}
