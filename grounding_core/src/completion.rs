//! Completion reporting: which exercises have been done today.
//!
//! The controller only sees the `CompletionReporter` trait. `LocalReporter`
//! keeps the set in memory; `JournalReporter` backs it with the JSONL journal
//! so completions survive between runs of the CLI.

use crate::wal::{CompletionSink, JsonlSink};
use crate::{CompletionRecord, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Collaborator that records and answers "completed today?"
pub trait CompletionReporter {
    fn is_complete(&self, exercise_id: &str) -> bool;

    /// Record a completion. Failures are the reporter's to surface; callers
    /// are expected to log and carry on.
    fn mark_complete(&mut self, exercise_id: &str) -> Result<()>;

    /// Optional hint: when the finished session started
    fn mark_complete_since(
        &mut self,
        exercise_id: &str,
        _started_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.mark_complete(exercise_id)
    }
}

impl<R: CompletionReporter + ?Sized> CompletionReporter for &mut R {
    fn is_complete(&self, exercise_id: &str) -> bool {
        (**self).is_complete(exercise_id)
    }

    fn mark_complete(&mut self, exercise_id: &str) -> Result<()> {
        (**self).mark_complete(exercise_id)
    }

    fn mark_complete_since(
        &mut self,
        exercise_id: &str,
        started_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        (**self).mark_complete_since(exercise_id, started_at)
    }
}

/// In-memory reporter (local only, nothing persisted)
#[derive(Clone, Debug, Default)]
pub struct LocalReporter {
    completed: HashSet<String>,
}

impl LocalReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed(&self) -> &HashSet<String> {
        &self.completed
    }
}

impl CompletionReporter for LocalReporter {
    fn is_complete(&self, exercise_id: &str) -> bool {
        self.completed.contains(exercise_id)
    }

    fn mark_complete(&mut self, exercise_id: &str) -> Result<()> {
        self.completed.insert(exercise_id.to_string());
        Ok(())
    }
}

/// Journal-backed reporter for one local day at a time
///
/// Reporters opened with a clock follow it: the day is re-resolved when a
/// completion is recorded, so a session finished after midnight counts for
/// the new day.
pub struct JournalReporter {
    sink: JsonlSink,
    csv_path: PathBuf,
    today: NaiveDate,
    clock: Option<fn() -> NaiveDate>,
    completed: HashSet<String>,
}

impl JournalReporter {
    /// Open the reporter pinned to `today`, preloading completions already
    /// recorded in the journal or its CSV archive for that day
    pub fn open(wal_path: &Path, csv_path: &Path, today: NaiveDate) -> Result<Self> {
        Self::build(wal_path, csv_path, today, None)
    }

    /// Open for the day `clock` reports, following it on later completions
    pub fn open_with_clock(
        wal_path: &Path,
        csv_path: &Path,
        clock: fn() -> NaiveDate,
    ) -> Result<Self> {
        Self::build(wal_path, csv_path, clock(), Some(clock))
    }

    /// Open for the current local day
    pub fn open_today(wal_path: &Path, csv_path: &Path) -> Result<Self> {
        Self::open_with_clock(wal_path, csv_path, local_today)
    }

    fn build(
        wal_path: &Path,
        csv_path: &Path,
        today: NaiveDate,
        clock: Option<fn() -> NaiveDate>,
    ) -> Result<Self> {
        let completed = load_day(wal_path, csv_path, today)?;

        tracing::debug!(
            "Journal reporter for {}: {} exercises already complete",
            today,
            completed.len()
        );

        Ok(Self {
            sink: JsonlSink::new(wal_path),
            csv_path: csv_path.to_path_buf(),
            today,
            clock,
            completed,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn completed(&self) -> &HashSet<String> {
        &self.completed
    }

    /// Move to the clock's current day, reloading that day's completions
    fn follow_clock(&mut self) -> Result<()> {
        let Some(clock) = self.clock else {
            return Ok(());
        };
        let day = clock();
        if day == self.today {
            return Ok(());
        }

        tracing::info!("Day changed from {} to {}", self.today, day);
        self.today = day;
        self.completed = load_day(self.sink.path(), &self.csv_path, day)?;
        Ok(())
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn load_day(wal_path: &Path, csv_path: &Path, day: NaiveDate) -> Result<HashSet<String>> {
    let records = crate::history::load_recent_completions(wal_path, csv_path, 2)?;
    Ok(crate::history::completed_on(&records, day))
}

impl CompletionReporter for JournalReporter {
    fn is_complete(&self, exercise_id: &str) -> bool {
        self.completed.contains(exercise_id)
    }

    fn mark_complete(&mut self, exercise_id: &str) -> Result<()> {
        self.mark_complete_since(exercise_id, None)
    }

    fn mark_complete_since(
        &mut self,
        exercise_id: &str,
        started_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if let Err(e) = self.follow_clock() {
            tracing::warn!("Could not reload completions for the new day: {}", e);
        }

        let mut record = CompletionRecord::new(exercise_id, self.today, Utc::now());
        if let Some(started_at) = started_at {
            record = record.with_start(started_at);
        }

        // Counted as done even if the write below fails
        self.completed.insert(exercise_id.to_string());
        self.sink.append(&record)?;

        tracing::info!("Recorded completion of {} for {}", exercise_id, self.today);
        Ok(())
    }
}
