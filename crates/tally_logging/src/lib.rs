//! Shared logging utilities for Tallyflow binaries.
//!
//! Library crates only emit `tracing` events; a binary calls `init_logging`
//! once to install the subscriber: an env-filtered stderr layer plus a
//! size-capped plain-text log file under the Tallyflow home directory.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "tally=info,tally_reconcile=info,tally_protocol=info";
const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Logging configuration shared by Tallyflow binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Initialize tracing with a capped file writer and stderr output.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let file_writer = CappedFileWriter::open(&log_dir, config.app_name, MAX_LOG_FILE_SIZE)
        .with_context(|| format!("Failed to open log file for {}", config.app_name))?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    Ok(())
}

/// The Tallyflow home directory: `$TALLY_HOME` or `~/.tallyflow`.
pub fn tally_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("TALLY_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tallyflow")
}

/// The logs directory: `<home>/logs`.
pub fn logs_dir() -> PathBuf {
    tally_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

// ============================================================================
// Capped file writer
// ============================================================================

/// Append-only log file capped at `max_size`.
///
/// When the cap is hit the current file is renamed to `<name>.log.old`
/// (replacing any previous one) and a fresh file is started: at most two
/// generations on disk.
struct CappedFile {
    path: PathBuf,
    old_path: PathBuf,
    file: File,
    size: u64,
    max_size: u64,
}

impl CappedFile {
    fn open(dir: &Path, app_name: &str, max_size: u64) -> io::Result<Self> {
        let path = dir.join(format!("{}.log", sanitize_name(app_name)));
        let old_path = path.with_extension("log.old");
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            old_path,
            file,
            size,
            max_size,
        })
    }

    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.old_path.exists() {
            fs::remove_file(&self.old_path)?;
        }
        fs::rename(&self.path, &self.old_path)?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.size = 0;
        Ok(())
    }
}

impl Write for CappedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size + buf.len() as u64 > self.max_size {
            self.roll()?;
        }
        let bytes = self.file.write(buf)?;
        self.size += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Clonable `MakeWriter` handle over the shared capped file.
#[derive(Clone)]
struct CappedFileWriter {
    inner: Arc<Mutex<CappedFile>>,
}

impl CappedFileWriter {
    fn open(dir: &Path, app_name: &str, max_size: u64) -> io::Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(CappedFile::open(dir, app_name, max_size)?)),
        })
    }
}

impl Write for CappedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.inner.lock() {
            Ok(mut file) => file.write(buf),
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "log writer poisoned")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.lock() {
            Ok(mut file) => file.flush(),
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "log writer poisoned")),
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CappedFileWriter {
    type Writer = CappedFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Keep log file names filesystem-safe.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "tally".to_string()
    } else {
        cleaned
    }
}

// ============================================================================
// Tests
// ============================================================================
