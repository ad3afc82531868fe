//! Log sink: timestamped lines on stdout, appended to a local file.
//!
//! A log file that cannot be opened or written is reported on stderr and
//! otherwise ignored; logging never aborts the run.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::{GovernanceDemoError, Result};

/// `MakeWriter` that appends every event to `path`.
#[derive(Clone, Debug)]
pub struct AppendFileWriter {
    path: Arc<PathBuf>,
}

impl AppendFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: Arc::new(path.into()) }
    }
}

/// One event's worth of file output.
pub struct AppendFile {
    file: Option<File>,
}

impl<'a> MakeWriter<'a> for AppendFileWriter {
    type Writer = AppendFile;

    fn make_writer(&'a self) -> Self::Writer {
        let file = match OpenOptions::new().create(true).append(true).open(self.path.as_path()) {
            Ok(file) => Some(file),
            Err(e) => {
                report_write_error(&self.path, &e);
                None
            }
        };
        AppendFile { file }
    }
}

impl Write for AppendFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.write_all(buf) {
                eprintln!("Error writing to log file: {}", e);
                self.file = None;
            }
        }
        // swallowed so the subscriber keeps going
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.flush() {
                eprintln!("Error writing to log file: {}", e);
            }
        }
        Ok(())
    }
}

fn report_write_error(path: &Path, e: &io::Error) {
    eprintln!("Error writing to log file {}: {}", path.display(), e);
}

/// Plain-text, timestamped layer appending to `log_file`.
pub fn file_layer<S>(log_file: &Path) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(AppendFileWriter::new(log_file))
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `level` when set.
pub fn init(log_file: &Path, level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("governance_demo={},warn", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer(log_file))
        .try_init()
        .map_err(|e| GovernanceDemoError::InvalidInput {
            reason: format!("Logging already initialised: {}", e),
        })
}
