//! Dev-mode subscriber: JSONL file output plus optional stderr.

use crate::json_layer::JsonLayer;
use crate::LogConfig;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".storage-guard")
        .join("logs")
        .join("guard.jsonl")
}

/// Append-only log file handle shared by every event.
///
/// Each write is flushed immediately so concurrent `tail -f` readers
/// always see whole lines.
#[derive(Clone)]
pub struct LogFileWriter {
    file: Arc<Mutex<BufWriter<File>>>,
}

impl LogFileWriter {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock();
        let written = file.write(buf)?;
        file.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn env_filter_or(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Open the JSONL file, or warn on stderr and return `None`.
fn open_log_writer(path: &Path) -> Option<LogFileWriter> {
    match LogFileWriter::open(path) {
        Ok(writer) => Some(writer),
        Err(e) => {
            eprintln!(
                "warning: cannot open log file {}: {}; logging to stderr only",
                path.display(),
                e
            );
            None
        }
    }
}

/// Install the global subscriber.
///
/// When the log file cannot be opened, events go to stderr instead.
pub fn init_dev_subscriber(config: &LogConfig) {
    let log_path = config.log_path.clone().unwrap_or_else(default_log_path);
    let writer = open_log_writer(&log_path);
    let file_logging = writer.is_some();

    let json_layer = writer.map(|writer| {
        JsonLayer::new(config.service_name.clone(), writer)
            .with_filter(env_filter_or(&config.default_level))
    });

    let stderr_layer = (config.also_stderr || !file_logging).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .compact()
            .with_writer(io::stderr)
            .with_filter(env_filter_or(&config.default_level))
    });

    tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .init();

    if file_logging {
        tracing::debug!(log_path = %log_path.display(), "logging initialized");
    }
}
