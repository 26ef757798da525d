//! Novena progress persistence with file locking.
//!
//! Progress is the caller-owned state the recommendation engine consults:
//! the current 54-day novena, which days are done and when, the active
//! novena types and any dismissed recommendation ids.

use crate::calendar::{NovenaDay, NOVENA_DAYS};
use crate::recommend::LONG_NOVENA_TYPE;
use crate::{DayRecord, Error, RecommendationRequest, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Progress through the current novena
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NovenaProgress {
    #[serde(default)]
    pub intention: Option<String>,

    #[serde(default)]
    pub started_on: Option<NaiveDate>,

    /// Next day to pray; 0 before a novena is started
    #[serde(default)]
    pub current_day: u32,

    #[serde(default)]
    pub completed_days: BTreeSet<u32>,

    /// Date each completed day was prayed
    #[serde(default)]
    pub prayed_on: BTreeMap<u32, NaiveDate>,

    #[serde(default)]
    pub active_novenas: Vec<String>,

    #[serde(default)]
    pub dismissed_recommendations: BTreeSet<String>,
}

impl NovenaProgress {
    /// Begin a new 54-day novena, discarding any previous progress on it
    pub fn start(&mut self, intention: impl Into<String>, today: NaiveDate) {
        self.intention = Some(intention.into());
        self.started_on = Some(today);
        self.current_day = 1;
        self.completed_days.clear();
        self.prayed_on.clear();
        if !self.active_novenas.iter().any(|n| n == LONG_NOVENA_TYPE) {
            self.active_novenas.push(LONG_NOVENA_TYPE.to_string());
        }
        tracing::info!("Started 54-day novena on {}", today);
    }

    pub fn is_started(&self) -> bool {
        self.started_on.is_some()
    }

    /// Mark a day as prayed on `date`
    pub fn complete_day(&mut self, day: u32, date: NaiveDate) -> Result<()> {
        let day = NovenaDay::new(day)?;
        if !self.is_started() {
            return Err(Error::State("no novena in progress".into()));
        }

        if self.completed_days.insert(day.get()) {
            self.prayed_on.insert(day.get(), date);
        } else {
            tracing::debug!("Day {} already completed", day.get());
        }
        self.current_day = self.next_day().unwrap_or(NOVENA_DAYS);

        if self.is_complete() {
            self.active_novenas.retain(|n| n != LONG_NOVENA_TYPE);
            tracing::info!("54-day novena complete");
        }
        Ok(())
    }

    /// Lowest day not yet prayed
    pub fn next_day(&self) -> Option<u32> {
        if !self.is_started() {
            return None;
        }
        (1..=NOVENA_DAYS).find(|d| !self.completed_days.contains(d))
    }

    pub fn is_complete(&self) -> bool {
        self.completed_days.len() == NOVENA_DAYS as usize
    }

    pub fn has_54_day_active(&self) -> bool {
        self.active_novenas.iter().any(|n| n == LONG_NOVENA_TYPE)
    }

    /// Prayed days in day order
    pub fn history(&self) -> Vec<DayRecord> {
        self.completed_days
            .iter()
            .map(|&day| {
                let info = crate::calendar::cycle_info(day);
                DayRecord {
                    day,
                    phase: info.phase,
                    mystery: info.mystery,
                    prayed_on: self.prayed_on.get(&day).copied(),
                }
            })
            .collect()
    }

    /// Mark a 9-day novena as being prayed; returns false if already active
    ///
    /// The 54-day novena is tracked by [`NovenaProgress::start`] instead.
    pub fn begin_novena(&mut self, novena_type: &str) -> Result<bool> {
        if novena_type == LONG_NOVENA_TYPE {
            return Err(Error::State("the 54-day novena is begun with `start`".into()));
        }
        if self.active_novenas.iter().any(|n| n == novena_type) {
            return Ok(false);
        }
        self.active_novenas.push(novena_type.to_string());
        tracing::info!("Began {}", novena_type);
        Ok(true)
    }

    /// Drop a novena from the active list; returns false if it was not active
    pub fn finish_novena(&mut self, novena_type: &str) -> bool {
        let before = self.active_novenas.len();
        self.active_novenas.retain(|n| n != novena_type);
        let removed = self.active_novenas.len() != before;
        if removed {
            tracing::info!("Finished {}", novena_type);
        }
        removed
    }

    /// Remember a dismissed recommendation; returns false if already dismissed
    pub fn dismiss(&mut self, id: impl Into<String>) -> bool {
        self.dismissed_recommendations.insert(id.into())
    }

    /// Snapshot of the state the recommender needs
    pub fn recommendation_request(&self) -> RecommendationRequest {
        RecommendationRequest {
            active_novenas: self.active_novenas.clone(),
            has_54_day_active: self.has_54_day_active(),
            dismissed: self.dismissed_recommendations.iter().cloned().collect(),
        }
    }

    /// Load progress from a file with shared locking
    ///
    /// Returns default progress if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns default progress.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No progress file found, using default state");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open progress file {:?}: {}. Using defaults.", path, e);
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock progress file {:?}: {}. Using defaults.", path, e);
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read progress file {:?}: {}. Using defaults.", path, e);
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<NovenaProgress>(&contents) {
            Ok(progress) => {
                tracing::debug!("Loaded novena progress from {:?}", path);
                Ok(progress)
            }
            Err(e) => {
                tracing::warn!("Failed to parse progress file {:?}: {}. Using defaults.", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Save progress atomically: temp file in the same directory, fsync, rename
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::State(format!("progress path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved novena progress to {:?}", path);
        Ok(())
    }

    /// Load progress, modify it, and save it back
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut NovenaProgress) -> Result<()>,
    {
        let mut progress = Self::load(path)?;
        f(&mut progress)?;
        progress.save(path)?;
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mystery, Phase};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn day_after(n: i64) -> NaiveDate {
        today() + chrono::Duration::days(n)
    }

    #[test]
    fn test_start_and_complete_days() {
        let mut progress = NovenaProgress::default();
        assert_eq!(progress.next_day(), None);
        assert!(progress.complete_day(1, today()).is_err());

        progress.start("my family", today());
        assert!(progress.has_54_day_active());
        assert_eq!(progress.next_day(), Some(1));

        progress.complete_day(1, today()).unwrap();
        progress.complete_day(2, day_after(1)).unwrap();
        assert_eq!(progress.current_day, 3);

        // Skipped days stay open
        progress.complete_day(5, day_after(2)).unwrap();
        assert_eq!(progress.next_day(), Some(3));
    }

    #[test]
    fn test_complete_day_rejects_out_of_range() {
        let mut progress = NovenaProgress::default();
        progress.start("x", today());
        assert!(matches!(progress.complete_day(0, today()), Err(Error::DayOutOfRange(0))));
        assert!(matches!(progress.complete_day(55, today()), Err(Error::DayOutOfRange(55))));
        assert!(progress.completed_days.is_empty());
    }

    #[test]
    fn test_completing_all_days_finishes_novena() {
        let mut progress = NovenaProgress::default();
        progress.start("x", today());
        for day in 1..=NOVENA_DAYS {
            progress.complete_day(day, today()).unwrap();
        }
        assert!(progress.is_complete());
        assert!(!progress.has_54_day_active());
        assert_eq!(progress.next_day(), None);
    }

    #[test]
    fn test_restart_keeps_single_active_entry() {
        let mut progress = NovenaProgress::default();
        progress.start("first", today());
        progress.complete_day(1, today()).unwrap();
        progress.start("second", today());

        assert_eq!(progress.active_novenas, vec![LONG_NOVENA_TYPE.to_string()]);
        assert!(progress.completed_days.is_empty());
        assert_eq!(progress.intention.as_deref(), Some("second"));
    }

    #[test]
    fn test_history_records_prayed_dates() {
        let mut progress = NovenaProgress::default();
        progress.start("x", today());
        progress.complete_day(2, day_after(1)).unwrap();
        progress.complete_day(1, today()).unwrap();
        // Re-praying a day keeps the first date
        progress.complete_day(1, day_after(5)).unwrap();
        progress.complete_day(28, day_after(6)).unwrap();

        let history = progress.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].day, 1);
        assert_eq!(history[0].prayed_on, Some(today()));
        assert_eq!(history[1].prayed_on, Some(day_after(1)));
        assert_eq!(history[1].mystery, Mystery::Sorrowful);
        assert_eq!(history[2].phase, Phase::Thanksgiving);

        progress.start("again", today());
        assert!(progress.history().is_empty());
    }

    #[test]
    fn test_history_tolerates_missing_dates() {
        let progress: NovenaProgress = serde_json::from_str(
            r#"{"started_on":"2026-03-01","current_day":2,"completed_days":[1]}"#,
        )
        .unwrap();
        let history = progress.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].prayed_on, None);
    }

    #[test]
    fn test_begin_and_finish_nine_day_novena() {
        let mut progress = NovenaProgress::default();
        assert!(progress.begin_novena("assumption-novena").unwrap());
        assert!(!progress.begin_novena("assumption-novena").unwrap());
        assert_eq!(progress.active_novenas, vec!["assumption-novena".to_string()]);
        assert!(!progress.has_54_day_active());

        let request = progress.recommendation_request();
        assert_eq!(request.active_novenas, vec!["assumption-novena".to_string()]);

        assert!(progress.finish_novena("assumption-novena"));
        assert!(!progress.finish_novena("assumption-novena"));
        assert!(progress.active_novenas.is_empty());
    }

    #[test]
    fn test_begin_novena_rejects_long_novena() {
        let mut progress = NovenaProgress::default();
        assert!(matches!(
            progress.begin_novena(LONG_NOVENA_TYPE),
            Err(Error::State(_))
        ));
        assert!(progress.active_novenas.is_empty());
    }

    #[test]
    fn test_recommendation_request_snapshot() {
        let mut progress = NovenaProgress::default();
        progress.start("x", today());
        assert!(progress.dismiss("9-day-assumption-2026-08-15"));
        assert!(!progress.dismiss("9-day-assumption-2026-08-15"));

        let request = progress.recommendation_request();
        assert!(request.has_54_day_active);
        assert!(request.dismissed.contains("9-day-assumption-2026-08-15"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("progress.json");

        let mut progress = NovenaProgress::default();
        progress.start("my family", today());
        progress.complete_day(1, today()).unwrap();
        progress.save(&path).unwrap();

        let loaded = NovenaProgress::load(&path).unwrap();
        assert_eq!(loaded, progress);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let progress = NovenaProgress::load(&temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(progress, NovenaProgress::default());
    }

    #[test]
    fn test_corrupted_progress_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("progress.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let progress = NovenaProgress::load(&path).unwrap();
        assert!(!progress.is_started());
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("progress.json");

        NovenaProgress::update(&path, |p| {
            p.start("x", today());
            p.complete_day(1, today())
        })
        .unwrap();

        // Failing closures leave the file untouched
        let result = NovenaProgress::update(&path, |p| p.complete_day(99, today()));
        assert!(result.is_err());

        let loaded = NovenaProgress::load(&path).unwrap();
        assert_eq!(loaded.completed_days.len(), 1);
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("progress.json");
        NovenaProgress::default().save(&path).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "progress.json")
            .collect();
        assert!(extras.is_empty(), "found extras: {:?}", extras);
    }
}
