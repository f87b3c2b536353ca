//! Write-Ahead Log (WAL) for completion records.
//!
//! Completions are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::{CompletionRecord, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Sink trait for persisting completion records
pub trait CompletionSink {
    fn append(&mut self, record: &CompletionRecord) -> Result<()>;
}

/// JSONL-based completion sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CompletionSink for JsonlSink {
    fn append(&mut self, record: &CompletionRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;
        let torn = ends_mid_line(&mut file)?;

        let mut writer = std::io::BufWriter::new(&file);
        if torn {
            // Start on a fresh line so the torn fragment stays isolated
            writer.write_all(b"\n")?;
        }
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended completion {} ({}) to WAL", record.id, record.exercise_id);
        Ok(())
    }
}

/// True if the file is non-empty and its last byte is not a newline
fn ends_mid_line(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Read all completion records from a WAL file
pub fn read_records(path: &Path) -> Result<Vec<CompletionRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;
    let records = parse_records(BufReader::new(&file));
    file.unlock()?;

    let records = records?;
    tracing::debug!("Read {} completions from WAL", records.len());
    Ok(records)
}

/// Parse JSONL completions from a reader the caller has already locked
pub(crate) fn parse_records(reader: impl BufRead) -> Result<Vec<CompletionRecord>> {
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<CompletionRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                // Keep going: a torn last line must not hide earlier completions
                tracing::warn!("Failed to parse completion at line {}: {}", line_num + 1, e);
            }
        }
    }

    Ok(records)
}
