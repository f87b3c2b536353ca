//! Completion history from the journal and its CSV archive.

use crate::csv_rollup::CsvRow;
use crate::{CompletionRecord, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use csv::ReaderBuilder;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use uuid::Uuid;

impl TryFrom<CsvRow> for CompletionRecord {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let completed_on = NaiveDate::parse_from_str(&row.completed_on, "%Y-%m-%d")
            .map_err(|e| crate::Error::Other(format!("Invalid day: {}", e)))?;

        let completed_at = DateTime::parse_from_rfc3339(&row.completed_at)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        let started_at = row
            .started_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(CompletionRecord {
            id,
            exercise_id: row.exercise_id,
            completed_on,
            completed_at,
            started_at,
            duration_seconds: row.duration,
        })
    }
}

/// Load completions from the last N days from both WAL and CSV
///
/// Returns records sorted by completed_at (newest first), deduplicated by id.
pub fn load_recent_completions(
    wal_path: &Path,
    csv_path: &Path,
    days: i64,
) -> Result<Vec<CompletionRecord>> {
    let cutoff = Utc::now() - Duration::days(days);
    let mut records = Vec::new();
    let mut seen_ids = HashSet::new();

    if wal_path.exists() {
        for record in crate::wal::read_records(wal_path)? {
            if record.completed_at >= cutoff && seen_ids.insert(record.id) {
                records.push(record);
            }
        }
        tracing::debug!("Loaded {} completions from WAL", records.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for record in load_completions_from_csv(csv_path)? {
            if record.completed_at >= cutoff && seen_ids.insert(record.id) {
                records.push(record);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} completions from CSV", csv_count);
    }

    records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

    tracing::info!(
        "Loaded {} completions from last {} days",
        records.len(),
        days
    );

    Ok(records)
}

/// Load all completions from a CSV file, skipping rows that fail to parse
fn load_completions_from_csv(path: &Path) -> Result<Vec<CompletionRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut records = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result.map_err(crate::Error::from).and_then(CompletionRecord::try_from) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("Skipping CSV row: {}", e),
        }
    }

    Ok(records)
}

/// Exercise ids completed on a given day
pub fn completed_on(records: &[CompletionRecord], day: NaiveDate) -> HashSet<String> {
    records
        .iter()
        .filter(|r| r.completed_on == day)
        .map(|r| r.exercise_id.clone())
        .collect()
}

/// Completion count per exercise id, sorted by id
pub fn summarize(records: &[CompletionRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.exercise_id.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::{CompletionSink, JsonlSink};

    fn create_test_record(exercise_id: &str, days_ago: i64) -> CompletionRecord {
        let at = Utc::now() - Duration::days(days_ago);
        CompletionRecord::new(exercise_id, at.date_naive(), at)
    }

    #[test]
    fn test_load_recent_completions_from_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("completions.wal");
        let csv_path = temp_dir.path().join("completions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_record("body_scan", 1)).unwrap();
        sink.append(&create_test_record("box_breathing", 3)).unwrap();
        sink.append(&create_test_record("senses_54321", 10)).unwrap();

        let records = load_recent_completions(&wal_path, &csv_path, 7).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_csv_rows_roundtrip_into_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("completions.wal");
        let csv_path = temp_dir.path().join("completions.csv");

        let record = create_test_record("body_scan", 0);
        let record_id = record.id;
        JsonlSink::new(&wal_path).append(&record).unwrap();
        crate::csv_rollup::wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        let records = load_recent_completions(&wal_path, &csv_path, 7).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record_id);
        assert_eq!(records[0].completed_on, record.completed_on);
    }

    #[test]
    fn test_deduplication_across_wal_and_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("completions.wal");
        let csv_path = temp_dir.path().join("completions.csv");
        let copy_path = temp_dir.path().join("copy.wal");

        let record = create_test_record("body_scan", 1);
        JsonlSink::new(&wal_path).append(&record).unwrap();
        JsonlSink::new(&copy_path).append(&record).unwrap();
        crate::csv_rollup::wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        // Same record now lives in the CSV archive and a second journal
        let records = load_recent_completions(&copy_path, &csv_path, 7).unwrap();
        assert_eq!(records.iter().filter(|r| r.id == record.id).count(), 1);
    }

    #[test]
    fn test_records_sorted_newest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("completions.wal");
        let csv_path = temp_dir.path().join("completions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_record("old", 5)).unwrap();
        sink.append(&create_test_record("new", 1)).unwrap();

        let records = load_recent_completions(&wal_path, &csv_path, 7).unwrap();
        assert_eq!(records[0].exercise_id, "new");
        assert_eq!(records[1].exercise_id, "old");
    }

    #[test]
    fn test_completed_on_filters_by_day() {
        let today = create_test_record("body_scan", 0);
        let day = today.completed_on;
        let records = vec![
            today,
            create_test_record("box_breathing", 2),
            create_test_record("body_scan", 0),
        ];

        let done = completed_on(&records, day);
        assert_eq!(done.len(), 1);
        assert!(done.contains("body_scan"));
    }

    #[test]
    fn test_summarize_counts_per_exercise() {
        let records = vec![
            create_test_record("body_scan", 0),
            create_test_record("body_scan", 1),
            create_test_record("senses_54321", 2),
        ];
        let counts = summarize(&records);
        assert_eq!(counts["body_scan"], 2);
        assert_eq!(counts["senses_54321"], 1);
    }
}
