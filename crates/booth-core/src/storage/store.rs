use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::warn;

use crate::error::Result;
use crate::session::Session;
use crate::storage::format::{
    SessionSummary, clamp_score, format_csv_header, format_csv_row, parse_csv_row,
};

/// Append-only persistence of finalized sessions.
pub trait SessionStore {
    /// Write one finalized session. Must be durable before returning so
    /// the leaderboard that renders right after sees it.
    fn append(&mut self, session: &Session) -> Result<()>;

    /// All previously persisted sessions, in no particular order.
    fn list_history(&self) -> Result<Vec<SessionSummary>>;
}

/// CSV-file store. Creates the file with a header row on first append;
/// never rewrites existing rows.
pub struct CsvStore {
    path: PathBuf,
    max_tries: u32,
}

impl CsvStore {
    pub fn new<P: AsRef<Path>>(path: P, max_tries: u32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_tries: max_tries.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project a session onto the fixed-width row layout.
    fn summarize(&self, session: &Session, timestamp: NaiveDateTime) -> SessionSummary {
        let mut try_scores = vec![None; self.max_tries as usize];
        for result in session.tries() {
            let slot = (result.try_index as usize).saturating_sub(1);
            if let Some(entry) = try_scores.get_mut(slot) {
                *entry = Some(clamp_score(result.score));
            }
        }
        let profile = session.profile();
        SessionSummary {
            timestamp,
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            contact_permission: profile.contact_permission,
            try_scores,
            high_score: clamp_score(session.high_score()),
        }
    }

    /// Append with an explicit timestamp (history imports, tests).
    pub fn append_at(&mut self, session: &Session, timestamp: NaiveDateTime) -> Result<()> {
        let summary = self.summarize(session, timestamp);
        let header_needed = !self.path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if header_needed {
            writeln!(file, "{}", format_csv_header(self.max_tries))?;
        }
        writeln!(file, "{}", format_csv_row(&summary))?;
        // Durable before the leaderboard reads it back
        file.sync_all()?;
        Ok(())
    }
}

impl SessionStore for CsvStore {
    fn append(&mut self, session: &Session) -> Result<()> {
        self.append_at(session, Local::now().naive_local())
    }

    fn list_history(&self) -> Result<Vec<SessionSummary>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut rows = Vec::new();
        let mut bad_rows = 0usize;
        // Line 1 is the header
        for (idx, line) in text.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            match parse_csv_row(line, idx + 1) {
                Ok(summary) => rows.push(summary),
                Err(e) => {
                    if bad_rows == 0 {
                        warn!("Skipping malformed history row: {} (further errors suppressed)", e);
                    }
                    bad_rows += 1;
                }
            }
        }
        if bad_rows > 1 {
            warn!("{} malformed history rows skipped", bad_rows);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CaptureMethod, PlayerProfile};
    use crate::storage::format::TIMESTAMP_FORMAT;

    fn profile(name: &str) -> PlayerProfile {
        PlayerProfile {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "5551234567".into(),
            contact_permission: true,
        }
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    fn store(dir: &tempfile::TempDir) -> CsvStore {
        CsvStore::new(dir.path().join("scores.csv"), 3)
    }

    #[test]
    fn test_round_trip_full_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);

        let mut session = Session::new(profile("Alice"), 3);
        session.record_try(150, CaptureMethod::Manual).unwrap();
        session.record_try(300, CaptureMethod::Manual).unwrap();
        session.record_try(90, CaptureMethod::Manual).unwrap();
        session.finalize(false);

        store.append_at(&session, ts("2026-08-06 10:00:00")).unwrap();

        let history = store.list_history().unwrap();
        assert_eq!(history.len(), 1);
        let row = &history[0];
        assert_eq!(row.name, "Alice");
        assert_eq!(row.try_scores, vec![Some(150), Some(300), Some(90)]);
        assert_eq!(row.high_score, 300);
        assert_eq!(row.tries_played(), 3);
        assert!(row.contact_permission);
    }

    #[test]
    fn test_early_end_leaves_blank_slots() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);

        let mut session = Session::new(profile("Bob"), 3);
        session.record_try(80, CaptureMethod::Manual).unwrap();
        session.finalize(true);

        store.append_at(&session, ts("2026-08-06 11:00:00")).unwrap();

        let history = store.list_history().unwrap();
        let row = &history[0];
        assert_eq!(row.try_scores, vec![Some(80), None, None]);
        assert_eq!(row.high_score, 80);
        assert_eq!(row.tries_played(), 1);
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);

        for i in 0..2 {
            let mut session = Session::new(profile("P"), 3);
            session.record_try(10 * i, CaptureMethod::Manual).unwrap();
            session.finalize(true);
            store
                .append_at(&session, ts("2026-08-06 12:00:00"))
                .unwrap();
        }

        let text = fs::read_to_string(store.path()).unwrap();
        let headers = text.lines().filter(|l| l.starts_with("Timestamp")).count();
        assert_eq!(headers, 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        assert!(store.list_history().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);

        let mut session = Session::new(profile("Good"), 3);
        session.record_try(50, CaptureMethod::Manual).unwrap();
        session.finalize(true);
        store.append_at(&session, ts("2026-08-06 13:00:00")).unwrap();

        let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
        writeln!(file, "this is not a csv row").unwrap();

        let history = store.list_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "Good");
    }

    #[test]
    fn test_timeout_default_try_persists_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);

        let mut session = Session::new(profile("Timeout"), 3);
        session.record_try(120, CaptureMethod::Manual).unwrap();
        session.record_try(0, CaptureMethod::TimeoutDefault).unwrap();
        session.finalize(true);

        store.append_at(&session, ts("2026-08-06 14:00:00")).unwrap();

        let row = &store.list_history().unwrap()[0];
        assert_eq!(row.try_scores, vec![Some(120), Some(0), None]);
        assert_eq!(row.tries_played(), 2);
        assert_eq!(row.high_score, 120);
    }
}
