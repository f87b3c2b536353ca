//! CSV rollup for archiving journal completions.
//!
//! The whole rollup runs under an exclusive lock on the journal. Rolled-up
//! lines are copied to `completions.wal.processed` and the journal is then
//! truncated in place, so writers holding an open handle keep appending to
//! the live file.

use crate::{CompletionRecord, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct CsvRow {
    pub(crate) id: String,
    pub(crate) exercise_id: String,
    pub(crate) completed_on: String,
    pub(crate) completed_at: String,
    pub(crate) started_at: Option<String>,
    pub(crate) duration: Option<u32>,
}

impl From<&CompletionRecord> for CsvRow {
    fn from(record: &CompletionRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            exercise_id: record.exercise_id.clone(),
            completed_on: record.completed_on.to_string(),
            completed_at: record.completed_at.to_rfc3339(),
            started_at: record.started_at.map(|t| t.to_rfc3339()),
            duration: record.duration_seconds,
        }
    }
}

/// Roll up WAL completions into CSV and archive the WAL
///
/// This function, holding the journal's exclusive lock throughout:
/// 1. Reads all records from the WAL
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Appends the raw journal to `.wal.processed` and truncates the WAL
/// 5. Returns the number of records processed
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    if !wal_path.exists() {
        return Ok(0);
    }

    let mut wal = OpenOptions::new().read(true).write(true).open(wal_path)?;
    wal.lock_exclusive()?;
    let result = roll_up_locked(&mut wal, wal_path, csv_path);
    wal.unlock()?;

    result
}

fn roll_up_locked(wal: &mut File, wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let mut raw = Vec::new();
    wal.read_to_end(&mut raw)?;
    let records = crate::wal::parse_records(raw.as_slice())?;

    if records.is_empty() {
        tracing::info!("No completions in WAL to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in &records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} completions to CSV", records.len());

    let processed_path = wal_path.with_extension("wal.processed");
    let mut archive = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&processed_path)?;
    archive.write_all(&raw)?;
    if !raw.ends_with(b"\n") {
        archive.write_all(b"\n")?;
    }
    archive.sync_all()?;

    wal.set_len(0)?;
    wal.sync_all()?;

    tracing::info!("Archived WAL to {:?}", processed_path);

    Ok(records.len())
}

/// Clean up old processed WAL files
///
/// This removes all .wal.processed files in the given directory.
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed WAL: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed WAL files", count);
    }

    Ok(count)
}
