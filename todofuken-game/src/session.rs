//! The session aggregate and its persisted form.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{Prefecture, PrefectureId, Region};
use crate::clock::EpochMillis;
use crate::selector::{TargetSet, regions_of};
use crate::storage::{KeyValueStore, PersistError};

/// Lifecycle of one session: `NotStarted -> Running -> Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NotStarted,
    Running,
    Complete,
}

/// One run of the quiz.
///
/// The engine hands these out behind an `Arc`, so a snapshot is read-only for
/// everyone but the engine. The persisted JSON uses camelCase field names and
/// stores both id sets as plain integer arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    /// Set by the first answer submission.
    pub start_time: Option<EpochMillis>,
    /// Set once, when the last target is answered.
    pub end_time: Option<EpochMillis>,
    pub answered_prefectures: BTreeSet<PrefectureId>,
    /// Question being asked. Keeps its last value after completion.
    pub current_prefecture: PrefectureId,
    /// Frozen `end_time - start_time` once complete, 0 before.
    pub total_time: u64,
    pub is_game_complete: bool,
    pub score: u32,
    pub target_prefectures: TargetSet,
}

/// Answered/total counts relative to the session's own target set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    pub percentage: u32,
}

/// Read-only projection of the target set grouped by region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub total_count: usize,
    /// Regions with at least one target, catalog order.
    pub regions: Vec<Region>,
    pub region_groups: BTreeMap<Region, Vec<PrefectureId>>,
}

impl TargetInfo {
    #[must_use]
    pub fn region_labels(&self) -> Vec<&'static str> {
        self.regions.iter().map(|region| region.label()).collect()
    }
}

impl GameSession {
    /// Fresh `NotStarted` session over `targets`.
    #[must_use]
    pub fn new(targets: TargetSet, current: PrefectureId) -> Self {
        Self {
            start_time: None,
            end_time: None,
            answered_prefectures: BTreeSet::new(),
            current_prefecture: current,
            total_time: 0,
            is_game_complete: false,
            score: 0,
            target_prefectures: targets,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        if self.is_game_complete {
            SessionPhase::Complete
        } else if self.start_time.is_some() {
            SessionPhase::Running
        } else {
            SessionPhase::NotStarted
        }
    }

    #[must_use]
    pub fn current(&self) -> &'static Prefecture {
        self.current_prefecture.prefecture()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.target_prefectures
            .len()
            .saturating_sub(self.answered_prefectures.len())
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        let answered = self.answered_prefectures.len();
        let total = self.target_prefectures.len();
        let percentage = if total == 0 {
            0
        } else {
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss
            )]
            let pct = (100.0 * answered as f64 / total as f64).round() as u32;
            pct
        };
        Progress {
            answered,
            total,
            percentage,
        }
    }

    #[must_use]
    pub fn target_info(&self) -> TargetInfo {
        let regions = regions_of(&self.target_prefectures);
        let region_groups = regions
            .iter()
            .map(|&region| {
                let members = region
                    .members()
                    .filter(|id| self.target_prefectures.contains(id))
                    .collect();
                (region, members)
            })
            .collect();
        TargetInfo {
            total_count: self.target_prefectures.len(),
            regions,
            region_groups,
        }
    }

    /// Elapsed play time at `now`: 0 before the first answer, frozen after
    /// completion, live otherwise.
    #[must_use]
    pub fn elapsed_ms(&self, now: EpochMillis) -> u64 {
        match self.start_time {
            None => 0,
            Some(_) if self.is_game_complete => self.total_time,
            Some(start) => u64::try_from(now.saturating_sub(start)).unwrap_or(0),
        }
    }

    /// Checks the structural invariants a restored document must satisfy.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        if self.target_prefectures.is_empty() {
            return Err("target set is empty".to_string());
        }
        if !self
            .answered_prefectures
            .is_subset(&self.target_prefectures)
        {
            return Err("answered prefectures outside the target set".to_string());
        }
        let complete = self.answered_prefectures.len() == self.target_prefectures.len();
        if self.is_game_complete != complete {
            return Err(format!(
                "completion flag {} disagrees with {}/{} answered",
                self.is_game_complete,
                self.answered_prefectures.len(),
                self.target_prefectures.len()
            ));
        }
        if self.end_time.is_some() != complete {
            return Err("end time present without completion".to_string());
        }
        if !self.target_prefectures.contains(&self.current_prefecture) {
            return Err(format!(
                "current prefecture {} outside the target set",
                self.current_prefecture
            ));
        }
        Ok(())
    }
}

/// Reads the persisted session.
///
/// # Errors
///
/// Returns an error if the slot cannot be read, is not valid JSON, or violates
/// a session invariant.
pub fn load_session<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<GameSession>, PersistError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let session: GameSession = serde_json::from_str(&raw)?;
    session.validate().map_err(PersistError::Shape)?;
    Ok(Some(session))
}

/// Overwrites the persisted session.
///
/// # Errors
///
/// Returns an error if serialization fails or the backend rejects the write.
pub fn save_session<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
    session: &GameSession,
) -> Result<(), PersistError> {
    let json = serde_json::to_string(session)?;
    store.set(key, &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::full_targets;
    use crate::storage::MemoryStore;

    fn id(raw: u8) -> PrefectureId {
        PrefectureId::new(raw).unwrap()
    }

    fn kanto() -> GameSession {
        GameSession::new(Region::Kanto.members().collect(), id(13))
    }

    #[test]
    fn phases_follow_timestamps() {
        let mut session = kanto();
        assert_eq!(session.phase(), SessionPhase::NotStarted);
        session.start_time = Some(10);
        assert_eq!(session.phase(), SessionPhase::Running);
        session.is_game_complete = true;
        assert_eq!(session.phase(), SessionPhase::Complete);
    }

    #[test]
    fn progress_is_relative_to_targets() {
        let mut session = kanto();
        session.answered_prefectures.extend([id(8), id(9), id(10)]);
        assert_eq!(
            session.progress(),
            Progress {
                answered: 3,
                total: 7,
                percentage: 43
            }
        );
    }

    #[test]
    fn elapsed_time_by_phase() {
        let mut session = kanto();
        assert_eq!(session.elapsed_ms(5_000), 0);
        session.start_time = Some(1_000);
        assert_eq!(session.elapsed_ms(5_000), 4_000);
        assert_eq!(session.elapsed_ms(500), 0);
        session.is_game_complete = true;
        session.total_time = 3_210;
        assert_eq!(session.elapsed_ms(99_000), 3_210);
    }

    #[test]
    fn target_info_groups_by_region() {
        let targets: TargetSet = Region::Shikoku
            .members()
            .chain(Region::Tohoku.members())
            .collect();
        let session = GameSession::new(targets, id(36));
        let info = session.target_info();
        assert_eq!(info.total_count, 10);
        assert_eq!(info.regions, vec![Region::Tohoku, Region::Shikoku]);
        assert_eq!(info.region_labels(), vec!["東北", "四国"]);
        assert_eq!(info.region_groups[&Region::Shikoku].len(), 4);
    }

    #[test]
    fn persisted_shape_uses_integer_arrays() {
        let mut session = kanto();
        session.answered_prefectures.insert(id(8));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["answeredPrefectures"], serde_json::json!([8]));
        assert_eq!(json["currentPrefecture"], serde_json::json!(13));
        assert_eq!(json["isGameComplete"], serde_json::json!(false));
        assert!(json["startTime"].is_null());
    }

    #[test]
    fn save_then_load_rehydrates_sets() {
        let store = MemoryStore::new();
        let mut session = GameSession::new(full_targets(), id(1));
        session.answered_prefectures.insert(id(2));
        session.score = 10;
        save_session(&store, "gameState", &session).unwrap();
        let restored = load_session(&store, "gameState").unwrap().unwrap();
        assert_eq!(restored, session);
        assert!(load_session(&store, "missing").unwrap().is_none());
    }

    #[test]
    fn load_rejects_inconsistent_documents() {
        let store = MemoryStore::new();
        store.put_raw("bad-json", "{not json");
        assert!(matches!(
            load_session(&store, "bad-json"),
            Err(PersistError::Json(_))
        ));

        let mut session = kanto();
        session.answered_prefectures.insert(id(40));
        store.put_raw("bad-shape", &serde_json::to_string(&session).unwrap());
        assert!(matches!(
            load_session(&store, "bad-shape"),
            Err(PersistError::Shape(_))
        ));

        store.put_raw(
            "bad-id",
            r#"{"startTime":null,"endTime":null,"answeredPrefectures":[99],"currentPrefecture":1,"totalTime":0,"isGameComplete":false,"score":0,"targetPrefectures":[1]}"#,
        );
        assert!(load_session(&store, "bad-id").is_err());
    }

    #[test]
    fn answered_current_is_valid_until_the_next_question() {
        let mut session = kanto();
        session.answered_prefectures.insert(id(13));
        assert!(session.validate().is_ok());
        session.current_prefecture = id(40);
        assert!(session.validate().is_err());
    }
}
