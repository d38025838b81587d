//! Completed-session history and pace statistics.

use serde::{Deserialize, Serialize};

use crate::clock::{EpochMillis, iso8601};
use crate::session::GameSession;
use crate::storage::{KeyValueStore, PersistError};

/// Summary of one completed session. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Completion time, ISO-8601.
    pub date: String,
    /// Play time in milliseconds.
    pub time: u64,
    pub score: u32,
    /// Prefectures per minute.
    #[serde(default)]
    pub wpm: u32,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub total_prefectures: usize,
}

impl GameRecord {
    /// Record for a session that just completed at `completed_at`.
    #[must_use]
    pub fn from_session(
        session: &GameSession,
        mode_label: &str,
        completed_at: EpochMillis,
    ) -> Self {
        let total_prefectures = session.target_prefectures.len();
        Self {
            date: iso8601(completed_at),
            time: session.total_time,
            score: session.score,
            wpm: wpm(total_prefectures, session.total_time),
            mode: mode_label.to_string(),
            total_prefectures,
        }
    }
}

/// `round(count / minutes)`, or 0 when the rate is not finite.
#[must_use]
pub fn wpm(count: usize, time_ms: u64) -> u32 {
    #[allow(clippy::cast_precision_loss)]
    let rate = (count as f64 / (time_ms as f64 / 60_000.0)).round();
    if rate.is_finite() && rate >= 0.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rate = rate.min(f64::from(u32::MAX)) as u32;
        rate
    } else {
        0
    }
}

/// Live answers-per-minute while a session is running.
#[must_use]
pub fn live_wpm(answered: usize, elapsed_ms: u64) -> u32 {
    if elapsed_ms == 0 { 0 } else { wpm(answered, elapsed_ms) }
}

/// Mean time per correct answer so far.
#[must_use]
pub fn average_ms_per_answer(answered: usize, elapsed_ms: u64) -> Option<u64> {
    if answered == 0 || elapsed_ms == 0 {
        return None;
    }
    Some(elapsed_ms / answered as u64)
}

/// Projected total time if the remaining targets go at the current pace.
#[must_use]
pub fn estimated_finish_ms(answered: usize, total: usize, elapsed_ms: u64) -> Option<u64> {
    let average = average_ms_per_answer(answered, elapsed_ms)?;
    let remaining = total.saturating_sub(answered) as u64;
    Some(elapsed_ms.saturating_add(remaining.saturating_mul(average)))
}

/// Bounded history stored as one JSON array, fastest time first.
#[derive(Debug)]
pub struct RecordStore<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    key: &'a str,
    limit: usize,
}

impl<'a, S: KeyValueStore + ?Sized> RecordStore<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S, key: &'a str, limit: usize) -> Self {
        Self { store, key, limit }
    }

    /// Stored records; an absent slot is an empty history.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or parsed.
    pub fn try_records(&self) -> Result<Vec<GameRecord>, PersistError> {
        match self.store.get(self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Stored records, treating unreadable history as empty.
    #[must_use]
    pub fn records(&self) -> Vec<GameRecord> {
        self.try_records().unwrap_or_else(|err| {
            log::warn!("ignoring unreadable record history `{}`: {err}", self.key);
            Vec::new()
        })
    }

    /// Fastest stored record.
    #[must_use]
    pub fn best(&self) -> Option<GameRecord> {
        self.records().into_iter().next()
    }

    /// Inserts `record`, re-sorts ascending by time and drops entries past the
    /// limit. Corrupt history is replaced rather than appended to.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be serialized or written.
    pub fn append(&self, record: GameRecord) -> Result<(), PersistError> {
        let mut records = self.records();
        records.push(record);
        records.sort_by_key(|r| r.time);
        records.truncate(self.limit);
        let json = serde_json::to_string(&records)?;
        self.store.set(self.key, &json)?;
        Ok(())
    }

    /// Removes the whole history.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be modified.
    pub fn clear(&self) -> Result<(), PersistError> {
        self.store.remove(self.key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn record(time: u64) -> GameRecord {
        GameRecord {
            date: iso8601(0),
            time,
            score: 10,
            wpm: 0,
            mode: "full".to_string(),
            total_prefectures: 47,
        }
    }

    #[test]
    fn wpm_rounds_and_defaults_to_zero() {
        assert_eq!(wpm(47, 60_000), 47);
        assert_eq!(wpm(47, 120_000), 24);
        assert_eq!(wpm(7, 90_000), 5);
        assert_eq!(wpm(47, 0), 0);
        assert_eq!(wpm(0, 0), 0);
        assert_eq!(live_wpm(3, 0), 0);
        assert_eq!(live_wpm(3, 60_000), 3);
    }

    #[test]
    fn pace_estimates() {
        assert_eq!(average_ms_per_answer(0, 1_000), None);
        assert_eq!(average_ms_per_answer(4, 10_000), Some(2_500));
        assert_eq!(estimated_finish_ms(4, 7, 10_000), Some(17_500));
        assert_eq!(estimated_finish_ms(0, 7, 10_000), None);
    }

    #[test]
    fn append_keeps_sorted_and_bounded() {
        let store = MemoryStore::new();
        let records = RecordStore::new(&store, "gameRecords", 3);
        for time in [500, 100, 400, 300, 200] {
            records.append(record(time)).unwrap();
        }
        let times: Vec<u64> = records.records().iter().map(|r| r.time).collect();
        assert_eq!(times, vec![100, 200, 300]);
        assert_eq!(records.best().map(|r| r.time), Some(100));
    }

    #[test]
    fn corrupt_history_reads_as_empty_and_is_replaced() {
        let store = MemoryStore::new();
        store.put_raw("gameRecords", "[{oops");
        let records = RecordStore::new(&store, "gameRecords", 50);
        assert!(records.try_records().is_err());
        assert!(records.records().is_empty());
        records.append(record(42)).unwrap();
        assert_eq!(records.records().len(), 1);
    }

    #[test]
    fn reads_legacy_entries_without_optional_fields() {
        let store = MemoryStore::new();
        store.put_raw(
            "gameRecords",
            r#"[{"date":"2024-01-01T00:00:00.000Z","time":1234,"score":470}]"#,
        );
        let records = RecordStore::new(&store, "gameRecords", 50).records();
        assert_eq!(records[0].wpm, 0);
        assert_eq!(records[0].mode, "");
    }

    #[test]
    fn clear_removes_history() {
        let store = MemoryStore::new();
        let records = RecordStore::new(&store, "gameRecords", 50);
        records.append(record(1)).unwrap();
        records.clear().unwrap();
        assert!(!store.contains("gameRecords"));
        assert!(records.best().is_none());
    }
}
