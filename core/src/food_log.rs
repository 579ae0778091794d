use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use tracing::{info, warn};

use crate::models::{FOOD_LOG_KEY, FoodLogEntry, NewLogEntry};
use crate::storage::KeyValueStore;

/// Append-only log of consumption events, written through to a
/// [`KeyValueStore`] on every mutation.
pub struct FoodLogStore<S: KeyValueStore> {
    store: S,
    entries: Vec<FoodLogEntry>,
}

impl<S: KeyValueStore> FoodLogStore<S> {
    /// Load the log from `store`. Missing or unreadable state, or a record
    /// that is not a JSON array, starts an empty log. Individual entries
    /// that cannot be read are skipped.
    pub fn load(store: S) -> Self {
        let entries = match store.get(FOOD_LOG_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
                Ok(values) => parse_entries(values),
                Err(e) => {
                    warn!(error = %e, "Stored food log is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read food log, starting empty");
                Vec::new()
            }
        };
        Self { store, entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[FoodLogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stamp the entry with the current instant and local day, then append it.
    pub fn append(&mut self, entry: NewLogEntry) -> Result<FoodLogEntry> {
        self.append_at(entry, Local::now())
    }

    /// Append with an explicit creation instant.
    ///
    /// Timestamps stay unique: an instant at or before the newest stored
    /// timestamp is bumped one millisecond past it.
    pub fn append_at(&mut self, entry: NewLogEntry, now: DateTime<Local>) -> Result<FoodLogEntry> {
        let mut timestamp = now.timestamp_millis();
        if let Some(latest) = self.entries.iter().map(|e| e.timestamp).max() {
            if timestamp <= latest {
                timestamp = latest
                    .checked_add(1)
                    .context("No timestamp left after the newest food log entry")?;
            }
        }
        let stamped = entry.stamp(now.date_naive(), timestamp);

        let mut next = self.entries.clone();
        next.push(stamped.clone());
        self.persist(&next)?;
        self.entries = next;

        info!(
            timestamp = stamped.timestamp,
            name = %stamped.name,
            kind = %stamped.kind,
            "Logged food entry"
        );
        Ok(stamped)
    }

    /// Entries created on `date`, in insertion order.
    pub fn entries_for_date(&self, date: NaiveDate) -> impl Iterator<Item = &FoodLogEntry> {
        self.entries.iter().filter(move |e| e.date == date)
    }

    /// Remove the entry with this timestamp. Returns whether one was removed;
    /// an unknown timestamp is not an error.
    pub fn delete(&mut self, timestamp: i64) -> Result<bool> {
        let next: Vec<FoodLogEntry> = self
            .entries
            .iter()
            .filter(|e| e.timestamp != timestamp)
            .cloned()
            .collect();
        let removed = next.len() != self.entries.len();
        self.persist(&next)?;
        self.entries = next;

        if removed {
            info!(timestamp, "Deleted food entry");
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.persist(&[])?;
        let count = self.entries.len();
        self.entries.clear();
        info!(count, "Cleared food log");
        Ok(())
    }

    fn persist(&self, entries: &[FoodLogEntry]) -> Result<()> {
        let raw = serde_json::to_string(entries).context("Failed to serialize food log")?;
        self.store
            .set(FOOD_LOG_KEY, &raw)
            .context("Failed to persist food log")
    }
}

fn parse_entries(values: Vec<serde_json::Value>) -> Vec<FoodLogEntry> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(index, error = %e, "Skipping unreadable food log entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;
    use crate::storage::{MemoryStore, SqliteStore};
    use chrono::TimeZone;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            anyhow::bail!("storage unavailable")
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("storage unavailable")
        }
    }

    fn sample_entry(name: &str, calories: f64) -> NewLogEntry {
        NewLogEntry {
            id: "52772".to_string(),
            name: name.to_string(),
            image: Some("https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg".into()),
            kind: EntryKind::Meal,
            calories,
            protein: 42.0,
            carbs: 52.0,
            fat: 8.0,
            fiber: Some(4.0),
            sugar: Some(12.0),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_load_missing_is_empty() {
        let log = FoodLogStore::load(MemoryStore::new());
        assert!(log.is_empty());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let log = FoodLogStore::load(MemoryStore::with_value(FOOD_LOG_KEY, "{not json"));
        assert!(log.is_empty());

        let log = FoodLogStore::load(MemoryStore::with_value(FOOD_LOG_KEY, "{\"a\":1}"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_load_skips_only_bad_entries() {
        let raw = r#"[
            {"name": "Good", "date": "2024-06-15", "timestamp": 1718445600000},
            {"name": "Quoted", "date": "2024-06-15", "timestamp": "1718445600001"},
            {"name": "No date", "timestamp": 1718445600002},
            {"name": "Bad date", "date": "15/06/2024", "timestamp": 1718445600003},
            "not an entry"
        ]"#;
        let store = MemoryStore::with_value(FOOD_LOG_KEY, raw);
        let mut log = FoodLogStore::load(&store);
        let names: Vec<&str> = log.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Good", "Quoted"]);
        assert_eq!(log.entries()[1].timestamp, 1_718_445_600_001);

        log.append_at(sample_entry("New", 100.0), at(2024, 6, 15, 12)).unwrap();
        let reloaded = FoodLogStore::load(&store);
        let names: Vec<&str> = reloaded.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Good", "Quoted", "New"]);
    }

    #[test]
    fn test_append_after_max_timestamp_is_an_error() {
        let raw = format!(r#"[{{"name": "Last", "date": "2024-06-15", "timestamp": {}}}]"#, i64::MAX);
        let store = MemoryStore::with_value(FOOD_LOG_KEY, &raw);
        let mut log = FoodLogStore::load(&store);
        assert_eq!(log.len(), 1);

        assert!(log.append_at(sample_entry("A", 100.0), at(2024, 6, 15, 8)).is_err());
        assert_eq!(log.len(), 1);
        assert_eq!(store.get(FOOD_LOG_KEY).unwrap().as_deref(), Some(raw.as_str()));
    }

    #[test]
    fn test_load_unreadable_is_empty() {
        let log = FoodLogStore::load(FailingStore);
        assert!(log.is_empty());
    }

    #[test]
    fn test_append_stamps_date_and_timestamp() {
        let mut log = FoodLogStore::load(MemoryStore::new());
        let now = at(2024, 6, 15, 12);
        let entry = log.append_at(sample_entry("Teriyaki Chicken", 485.0), now).unwrap();

        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(entry.timestamp, now.timestamp_millis());
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0], entry);
    }

    #[test]
    fn test_append_does_not_dedup() {
        let mut log = FoodLogStore::load(MemoryStore::new());
        let now = at(2024, 6, 15, 12);
        let a = log.append_at(sample_entry("Pancakes", 300.0), now).unwrap();
        let b = log.append_at(sample_entry("Pancakes", 300.0), now).unwrap();

        assert_eq!(log.len(), 2);
        assert_ne!(a.timestamp, b.timestamp);
        assert_eq!(b.timestamp, a.timestamp + 1);
    }

    #[test]
    fn test_append_with_clock_behind_keeps_timestamps_unique() {
        let mut log = FoodLogStore::load(MemoryStore::new());
        let a = log.append_at(sample_entry("Late", 100.0), at(2024, 6, 15, 18)).unwrap();
        let b = log.append_at(sample_entry("Early", 100.0), at(2024, 6, 15, 9)).unwrap();
        assert!(b.timestamp > a.timestamp);
        assert_eq!(b.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }

    #[test]
    fn test_append_now_uses_today() {
        let mut log = FoodLogStore::load(MemoryStore::new());
        let entry = log.append(sample_entry("Soup", 200.0)).unwrap();
        assert_eq!(entry.date, Local::now().date_naive());
    }

    #[test]
    fn test_entries_for_date_in_insertion_order() {
        let mut log = FoodLogStore::load(MemoryStore::new());
        log.append_at(sample_entry("Breakfast", 300.0), at(2024, 6, 15, 8)).unwrap();
        log.append_at(sample_entry("Other day", 900.0), at(2024, 6, 16, 8)).unwrap();
        log.append_at(sample_entry("Dinner", 700.0), at(2024, 6, 15, 19)).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let names: Vec<&str> = log.entries_for_date(day).map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Breakfast", "Dinner"]);

        let empty_day = NaiveDate::from_ymd_opt(2024, 6, 17).unwrap();
        assert_eq!(log.entries_for_date(empty_day).count(), 0);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_delete_existing_and_missing() {
        let mut log = FoodLogStore::load(MemoryStore::new());
        let a = log.append_at(sample_entry("A", 100.0), at(2024, 6, 15, 8)).unwrap();
        let b = log.append_at(sample_entry("B", 200.0), at(2024, 6, 15, 9)).unwrap();

        assert!(log.delete(a.timestamp).unwrap());
        assert_eq!(log.entries(), &[b.clone()]);

        let before = log.entries().to_vec();
        assert!(!log.delete(a.timestamp).unwrap());
        assert!(!log.delete(42).unwrap());
        assert_eq!(log.entries(), before.as_slice());
    }

    #[test]
    fn test_appends_minus_deletes() {
        let mut log = FoodLogStore::load(MemoryStore::new());
        let mut stamps = Vec::new();
        for i in 0..10 {
            let e = log
                .append_at(sample_entry(&format!("Item {i}"), 100.0), at(2024, 6, 15, 8))
                .unwrap();
            stamps.push(e.timestamp);
        }
        for ts in stamps.iter().step_by(3) {
            assert!(log.delete(*ts).unwrap());
        }
        assert_eq!(log.len(), 10 - 4);
    }

    #[test]
    fn test_clear() {
        let store = MemoryStore::new();
        let mut log = FoodLogStore::load(&store);
        log.append_at(sample_entry("A", 100.0), at(2024, 6, 15, 8)).unwrap();
        log.clear().unwrap();
        assert!(log.is_empty());
        assert_eq!(store.get(FOOD_LOG_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_write_through_round_trip() {
        let store = MemoryStore::new();
        let mut log = FoodLogStore::load(&store);
        log.append_at(sample_entry("A", 100.0), at(2024, 6, 14, 8)).unwrap();
        log.append_at(sample_entry("B", 250.5), at(2024, 6, 15, 9)).unwrap();
        let c = log.append_at(sample_entry("C", 300.0), at(2024, 6, 15, 10)).unwrap();
        log.delete(c.timestamp).unwrap();

        let reloaded = FoodLogStore::load(&store);
        assert_eq!(reloaded.entries(), log.entries());
    }

    #[test]
    fn test_sqlite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nutriplan.db");
        let expected = {
            let mut log = FoodLogStore::load(SqliteStore::open(&path).unwrap());
            log.append_at(sample_entry("A", 100.0), at(2024, 6, 15, 8)).unwrap();
            log.append_at(sample_entry("B", 200.0), at(2024, 6, 15, 9)).unwrap();
            log.entries().to_vec()
        };
        let reloaded = FoodLogStore::load(SqliteStore::open(&path).unwrap());
        assert_eq!(reloaded.entries(), expected.as_slice());
    }

    #[test]
    fn test_failed_write_leaves_state_untouched() {
        let mut log = FoodLogStore::load(FailingStore);
        assert!(log.append_at(sample_entry("A", 100.0), at(2024, 6, 15, 8)).is_err());
        assert!(log.is_empty());
        assert!(log.clear().is_err());
    }
}
