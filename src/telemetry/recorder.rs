//! # Telemetry Recorder
//!
//! Appends parsed records to JSONL (JSON Lines) files with rotation.
//!
//! - One JSON object per record, stamped with the host receive time
//! - A new file is started after `max_records_per_file` records
//! - Only the newest `max_files_to_keep` files are retained

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::types::TelemetryRecord;
use crate::config::RecordingConfig;
use crate::error::Result;

/// File name prefix for recording files
const FILE_PREFIX: &str = "telemetry_";

/// File extension for recording files
const FILE_EXTENSION: &str = "jsonl";

#[derive(Serialize)]
struct RecordLine<'a> {
    timestamp: String,
    #[serde(flatten)]
    record: &'a TelemetryRecord,
}

/// Rotating JSONL writer for telemetry records
pub struct TelemetryRecorder {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    files_started: u32,
}

impl std::fmt::Debug for TelemetryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryRecorder")
            .field("dir", &self.dir)
            .field("records_in_file", &self.records_in_file)
            .finish_non_exhaustive()
    }
}

impl TelemetryRecorder {
    /// Create a recorder writing into `config.log_dir`
    ///
    /// The directory is created if missing. No file is opened until the
    /// first record arrives.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new(config: &RecordingConfig) -> Result<Self> {
        let dir = PathBuf::from(&config.log_dir);
        fs::create_dir_all(&dir)?;
        info!("Recording telemetry to {}", dir.display());

        Ok(Self {
            dir,
            max_records_per_file: config.max_records_per_file.max(1),
            max_files_to_keep: config.max_files_to_keep.max(1),
            writer: None,
            records_in_file: 0,
            files_started: 0,
        })
    }

    /// Append one record
    ///
    /// Empty records are skipped.
    ///
    /// # Errors
    ///
    /// Returns error on serialization or file I/O failure
    pub fn record(&mut self, record: &TelemetryRecord) -> Result<()> {
        self.record_at(record, Local::now())
    }

    fn record_at(&mut self, record: &TelemetryRecord, now: DateTime<Local>) -> Result<()> {
        if record.is_empty() {
            return Ok(());
        }

        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate(now)?;
        }

        let line = serde_json::to_string(&RecordLine {
            timestamp: now.to_rfc3339(),
            record,
        })?;

        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
            writer.flush()?;
        }
        self.records_in_file += 1;

        Ok(())
    }

    fn rotate(&mut self, now: DateTime<Local>) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let name = format!(
            "{}{}_{:04}.{}",
            FILE_PREFIX,
            now.format("%Y%m%d_%H%M%S"),
            self.files_started,
            FILE_EXTENSION
        );
        let path = self.dir.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Opened recording file {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;
        self.files_started += 1;

        self.prune()
    }

    /// Delete the oldest recording files beyond the retention limit
    fn prune(&self) -> Result<()> {
        let mut files = recording_files(&self.dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove old recording {}: {}", path.display(), e);
            } else {
                debug!("Removed old recording {}", path.display());
            }
        }

        Ok(())
    }
}

fn recording_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_recording = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(FILE_PREFIX))
            .unwrap_or(false)
            && path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION);
        if is_recording {
            files.push(path);
        }
    }
    Ok(files)
}
