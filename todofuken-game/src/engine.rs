//! The game state engine.
//!
//! [`GameEngine`] owns the one live [`GameSession`] of a page. Every public
//! operation is total: malformed input, duplicate answers and storage faults
//! leave the session unchanged or degrade to the in-memory state, and are
//! reported through `log` rather than returned.
//!
//! Each mutation persists the session first and then publishes exactly one
//! [`GameEvent`]. Observers must not call back into a mutating operation; the
//! borrow checker rules that out for code holding `&mut GameEngine`.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::answer;
use crate::catalog::{Prefecture, PrefectureId};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::events::{EventKind, GameEvent, Observers, Subscription};
use crate::hints;
use crate::mode::GameMode;
use crate::picker::pick_next;
use crate::records::{self, GameRecord, RecordStore};
use crate::scoring::score_for;
use crate::selector::{matches_mode, select_targets};
use crate::session::{GameSession, Progress, TargetInfo, load_session, save_session};
use crate::storage::KeyValueStore;

/// Outcome of checking free-text input against the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Correct { points: u32 },
    Incorrect,
    /// The current question was already answered, e.g. after completion.
    AlreadyAnswered,
}

/// Single-writer owner of the session, its persistence and its observers.
pub struct GameEngine<S: KeyValueStore, C: Clock> {
    session: Arc<GameSession>,
    mode: GameMode,
    rng: ChaCha20Rng,
    store: S,
    clock: C,
    config: EngineConfig,
    observers: Observers,
}

impl<S: KeyValueStore, C: Clock> std::fmt::Debug for GameEngine<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("mode", &self.mode)
            .field("session", &self.session)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore, C: Clock> GameEngine<S, C> {
    /// Creates an engine holding a fresh, unpersisted full-mode session.
    ///
    /// Call [`Self::initialize_from_mode`] before play to pick up a saved
    /// session for the caller's mode.
    pub fn new(store: S, clock: C, config: EngineConfig) -> Self {
        let mut rng = config
            .seed
            .map_or_else(ChaCha20Rng::from_entropy, ChaCha20Rng::seed_from_u64);
        let session = Arc::new(fresh_session(GameMode::Full, &mut rng));
        Self {
            session,
            mode: GameMode::Full,
            rng,
            store,
            clock,
            config,
            observers: Observers::default(),
        }
    }

    /// `new` followed by `initialize_from_mode(mode)`.
    pub fn with_mode(store: S, clock: C, config: EngineConfig, mode: GameMode) -> Self {
        let mut engine = Self::new(store, clock, config);
        engine.initialize_from_mode(mode);
        engine
    }

    /// Immutable view of the current session. Later mutations never show
    /// through a snapshot that was already handed out.
    #[must_use]
    pub fn snapshot(&self) -> Arc<GameSession> {
        Arc::clone(&self.session)
    }

    /// Registers an observer for every subsequent mutation.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.observers.subscribe(observer)
    }

    #[must_use]
    pub const fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Restores the persisted session if it belongs to `mode`, otherwise
    /// replaces it with a freshly derived one.
    ///
    /// Unreadable or inconsistent saved state counts as absent and its slot is
    /// cleared.
    pub fn initialize_from_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        match load_session(&self.store, &self.config.session_key) {
            Ok(Some(saved)) if matches_mode(&saved.target_prefectures, mode) => {
                log::info!(
                    "restored {mode} session ({}/{} answered)",
                    saved.answered_prefectures.len(),
                    saved.target_prefectures.len()
                );
                self.session = Arc::new(saved);
                self.publish(EventKind::Restored);
                return;
            }
            Ok(Some(saved)) => {
                log::info!(
                    "discarding saved session with {} targets for {mode}",
                    saved.target_prefectures.len()
                );
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!("discarding unreadable saved session: {err}");
                self.clear_saved_session();
            }
        }
        self.session = Arc::new(fresh_session(mode, &mut self.rng));
        self.persist();
        self.publish(EventKind::Initialized);
    }

    /// Starts the clock. Does nothing once a start time is set.
    pub fn start_game(&mut self) {
        if self.session.start_time.is_some() || self.session.is_game_complete {
            return;
        }
        let now = self.clock.now_ms();
        Arc::make_mut(&mut self.session).start_time = Some(now);
        self.persist();
        self.publish(EventKind::Started);
    }

    /// Records a correct answer for `id` scored at `hint_level`.
    ///
    /// Returns the points awarded, or `None` when the answer was ignored
    /// because `id` is already answered or not in the target set.
    pub fn answer_correct(&mut self, id: PrefectureId, hint_level: u8) -> Option<u32> {
        if !self.session.target_prefectures.contains(&id)
            || self.session.answered_prefectures.contains(&id)
        {
            log::debug!("ignoring answer for {id}: answered or out of scope");
            return None;
        }

        let points = score_for(hint_level);
        let now = self.clock.now_ms();
        let session = Arc::make_mut(&mut self.session);
        session.answered_prefectures.insert(id);
        session.score = session.score.saturating_add(points);
        session.is_game_complete =
            session.answered_prefectures.len() == session.target_prefectures.len();

        let kind = if session.is_game_complete {
            session.end_time = Some(now);
            session.total_time = session
                .start_time
                .map_or(0, |start| u64::try_from(now.saturating_sub(start)).unwrap_or(0));
            let record = GameRecord::from_session(session, &self.mode.label(), now);
            log::info!(
                "completed {} in {} ms with score {}",
                record.mode,
                record.time,
                record.score
            );
            if let Err(err) = self.record_store().append(record) {
                log::warn!("failed to save game record: {err}");
            }
            EventKind::Completed
        } else {
            EventKind::Answered
        };

        self.persist();
        self.publish(kind);
        Some(points)
    }

    /// Moves to a random unanswered target. `None` once every target is
    /// answered, in which case the session is left unchanged.
    pub fn get_next_prefecture(&mut self) -> Option<&'static Prefecture> {
        let next = pick_next(
            &self.session.target_prefectures,
            &self.session.answered_prefectures,
            &mut self.rng,
        )?;
        Arc::make_mut(&mut self.session).current_prefecture = next;
        log::debug!("next question {next}, {} left", self.session.remaining());
        self.persist();
        self.publish(EventKind::Advanced);
        Some(next.prefecture())
    }

    /// Discards the session, saved state included, and derives a fresh one
    /// for `mode`.
    pub fn reset_game(&mut self, mode: GameMode) {
        self.mode = mode;
        self.clear_saved_session();
        self.session = Arc::new(fresh_session(mode, &mut self.rng));
        log::info!(
            "reset to {mode} with {} targets",
            self.session.target_prefectures.len()
        );
        self.persist();
        self.publish(EventKind::Reset);
    }

    /// Checks `input` against the current question, starting the clock
    /// first. A match is scored like [`Self::answer_correct`].
    pub fn submit_answer(&mut self, input: &str, hint_level: u8) -> Verdict {
        self.start_game();
        let current = self.session.current_prefecture;
        if self.session.answered_prefectures.contains(&current) {
            return Verdict::AlreadyAnswered;
        }
        if !answer::is_correct(current.prefecture(), input) {
            return Verdict::Incorrect;
        }
        self.answer_correct(current, hint_level)
            .map_or(Verdict::AlreadyAnswered, |points| Verdict::Correct { points })
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.session.progress()
    }

    #[must_use]
    pub fn target_info(&self) -> TargetInfo {
        self.session.target_info()
    }

    /// Live elapsed time; frozen once the session completes.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.session.elapsed_ms(self.clock.now_ms())
    }

    /// Correct answers per minute so far.
    #[must_use]
    pub fn live_wpm(&self) -> u32 {
        records::live_wpm(self.session.answered_prefectures.len(), self.elapsed_ms())
    }

    /// Mean time per correct answer so far; `None` before the first answer.
    #[must_use]
    pub fn average_ms_per_answer(&self) -> Option<u64> {
        records::average_ms_per_answer(self.session.answered_prefectures.len(), self.elapsed_ms())
    }

    /// Projected total play time at the current pace.
    #[must_use]
    pub fn estimated_finish_ms(&self) -> Option<u64> {
        records::estimated_finish_ms(
            self.session.answered_prefectures.len(),
            self.session.target_prefectures.len(),
            self.elapsed_ms(),
        )
    }

    /// Hints for the current question up to `level`.
    #[must_use]
    pub fn current_hints(&self, level: u8) -> Vec<String> {
        hints::hints_up_to(self.session.current(), level)
    }

    /// Completed-session history, fastest first.
    #[must_use]
    pub fn records(&self) -> Vec<GameRecord> {
        self.record_store().records()
    }

    #[must_use]
    pub fn best_record(&self) -> Option<GameRecord> {
        self.record_store().best()
    }

    pub fn clear_records(&self) {
        if let Err(err) = self.record_store().clear() {
            log::warn!("failed to clear game records: {err}");
        }
    }

    fn record_store(&self) -> RecordStore<'_, S> {
        RecordStore::new(
            &self.store,
            &self.config.records_key,
            self.config.record_limit,
        )
    }

    fn persist(&self) {
        if let Err(err) = save_session(&self.store, &self.config.session_key, &self.session) {
            log::warn!("session not saved, continuing in memory: {err}");
        }
    }

    fn clear_saved_session(&self) {
        if let Err(err) = self.store.remove(&self.config.session_key) {
            log::warn!("failed to clear saved session: {err}");
        }
    }

    fn publish(&self, kind: EventKind) {
        self.observers.notify(&GameEvent {
            kind,
            snapshot: self.snapshot(),
        });
    }
}

fn fresh_session(mode: GameMode, rng: &mut ChaCha20Rng) -> GameSession {
    let targets = select_targets(mode, rng);
    let current = pick_next(&targets, &BTreeSet::new(), rng)
        .or_else(|| targets.first().copied())
        .unwrap_or(PrefectureId::FIRST);
    GameSession::new(targets, current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine(mode: GameMode) -> (GameEngine<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        let clock = ManualClock::starting_at(1_000);
        let engine = GameEngine::with_mode(
            store.clone(),
            clock.clone(),
            EngineConfig::default().with_seed(7),
            mode,
        );
        (engine, store, clock)
    }

    #[test]
    fn initialize_persists_a_fresh_session() {
        let (engine, store, _) = engine(GameMode::Regions(2));
        let snapshot = engine.snapshot();
        assert!(snapshot.target_prefectures.contains(&snapshot.current_prefecture));
        assert!(snapshot.start_time.is_none());
        let saved = load_session(&store, "gameState").unwrap().unwrap();
        assert_eq!(saved, *snapshot);
    }

    #[test]
    fn snapshots_are_isolated_from_later_mutations() {
        let (mut engine, _, _) = engine(GameMode::Full);
        let before = engine.snapshot();
        let id = before.current_prefecture;
        engine.start_game();
        engine.answer_correct(id, 0);
        assert!(before.answered_prefectures.is_empty());
        assert_eq!(before.score, 0);
        assert!(engine.snapshot().answered_prefectures.contains(&id));
    }

    #[test]
    fn start_game_is_idempotent() {
        let (mut engine, _, clock) = engine(GameMode::Full);
        engine.start_game();
        let first = engine.snapshot().start_time;
        clock.advance(5_000);
        engine.start_game();
        assert_eq!(engine.snapshot().start_time, first);
        assert_eq!(first, Some(1_000));
    }

    #[test]
    fn duplicate_and_out_of_scope_answers_are_ignored() {
        let (mut engine, _, _) = engine(GameMode::Regions(1));
        let snapshot = engine.snapshot();
        let inside = snapshot.current_prefecture;
        let outside = crate::catalog::all_ids()
            .find(|id| !snapshot.target_prefectures.contains(id))
            .unwrap();

        assert_eq!(engine.answer_correct(inside, 1), Some(8));
        assert_eq!(engine.answer_correct(inside, 0), None);
        assert_eq!(engine.answer_correct(outside, 0), None);
        assert_eq!(engine.snapshot().score, 8);
    }

    #[test]
    fn next_prefecture_skips_answered_and_ends_with_none() {
        let (mut engine, _, _) = engine(GameMode::Regions(1));
        engine.start_game();
        let total = engine.snapshot().target_prefectures.len();
        for _ in 0..total {
            let current = engine.snapshot().current_prefecture;
            engine.answer_correct(current, 0);
            if let Some(next) = engine.get_next_prefecture() {
                assert!(!engine.snapshot().answered_prefectures.contains(&next.id));
            }
        }
        assert!(engine.snapshot().is_game_complete);
        let before = engine.snapshot();
        assert!(engine.get_next_prefecture().is_none());
        assert!(Arc::ptr_eq(&before, &engine.snapshot()));
    }

    #[test]
    fn saved_hokkaido_only_session_is_not_restored_for_one_region() {
        let store = MemoryStore::new();
        let hokkaido = GameSession::new(
            crate::catalog::Region::Hokkaido.members().collect(),
            PrefectureId::FIRST,
        );
        save_session(&store, "gameState", &hokkaido).unwrap();

        let engine = GameEngine::with_mode(
            store.clone(),
            ManualClock::starting_at(0),
            EngineConfig::default().with_seed(7),
            GameMode::Regions(1),
        );
        let snapshot = engine.snapshot();
        assert!(snapshot.target_prefectures.len() > 1);
        assert!(matches_mode(&snapshot.target_prefectures, GameMode::Regions(1)));
        assert_eq!(load_session(&store, "gameState").unwrap().as_ref(), Some(&*snapshot));
    }

    #[test]
    fn pace_statistics_follow_the_clock() {
        let (mut engine, _, clock) = engine(GameMode::Regions(2));
        let total = engine.snapshot().target_prefectures.len();
        assert_eq!(engine.average_ms_per_answer(), None);
        assert_eq!(engine.estimated_finish_ms(), None);

        engine.start_game();
        clock.advance(3_000);
        let first = engine.snapshot().current_prefecture;
        engine.answer_correct(first, 0);
        engine.get_next_prefecture();
        clock.advance(1_000);
        let second = engine.snapshot().current_prefecture;
        engine.answer_correct(second, 0);

        assert_eq!(engine.average_ms_per_answer(), Some(2_000));
        let remaining = u64::try_from(total - 2).unwrap();
        assert_eq!(engine.estimated_finish_ms(), Some(4_000 + remaining * 2_000));
    }

    #[test]
    fn elapsed_time_freezes_on_completion() {
        let (mut engine, _, clock) = engine(GameMode::Regions(1));
        assert_eq!(engine.elapsed_ms(), 0);
        engine.start_game();
        clock.advance(2_500);
        assert_eq!(engine.elapsed_ms(), 2_500);
        let targets: Vec<_> = engine.snapshot().target_prefectures.iter().copied().collect();
        for id in targets {
            engine.answer_correct(id, 0);
        }
        clock.advance(10_000);
        assert_eq!(engine.elapsed_ms(), 2_500);
        assert_eq!(engine.snapshot().total_time, 2_500);
        assert_eq!(engine.records().len(), 1);
        assert_eq!(engine.records()[0].mode, "regions-1");
    }

    #[test]
    fn submit_answer_accepts_spellings_of_the_current_prefecture() {
        let (mut engine, _, _) = engine(GameMode::Full);
        assert_eq!(engine.submit_answer("not a prefecture", 0), Verdict::Incorrect);
        assert!(engine.snapshot().start_time.is_some());

        let current = engine.snapshot().current();
        assert_eq!(
            engine.submit_answer(&format!("  {} ", current.kana), 2),
            Verdict::Correct { points: 6 }
        );
        assert_eq!(engine.submit_answer(current.name, 0), Verdict::AlreadyAnswered);
        assert_eq!(engine.snapshot().score, 6);
    }

    #[test]
    fn observers_see_one_event_per_mutation() {
        let (mut engine, _, _) = engine(GameMode::Full);
        let kinds = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&kinds);
        let sub = engine.subscribe(move |event| sink.borrow_mut().push(event.kind));

        engine.start_game();
        engine.start_game();
        let id = engine.snapshot().current_prefecture;
        engine.answer_correct(id, 0);
        engine.answer_correct(id, 0);
        engine.get_next_prefecture();
        engine.reset_game(GameMode::Expert);
        sub.unsubscribe();
        engine.start_game();

        assert_eq!(
            *kinds.borrow(),
            vec![
                EventKind::Started,
                EventKind::Answered,
                EventKind::Advanced,
                EventKind::Reset
            ]
        );
    }

    #[test]
    fn storage_failures_leave_the_game_playable() {
        let (mut engine, store, _) = engine(GameMode::Regions(1));
        store.reject_writes(true);
        engine.start_game();
        let targets: Vec<_> = engine.snapshot().target_prefectures.iter().copied().collect();
        for id in &targets {
            engine.answer_correct(*id, 3);
        }
        let snapshot = engine.snapshot();
        assert!(snapshot.is_game_complete);
        assert_eq!(snapshot.score, 4 * u32::try_from(targets.len()).unwrap());
        assert!(engine.records().is_empty());
        let saved = load_session(&store, "gameState").unwrap().unwrap();
        assert!(saved.start_time.is_none());
    }

    #[test]
    fn corrupt_saved_session_is_cleared_and_replaced() {
        let store = MemoryStore::new();
        store.put_raw("gameState", "{\"broken\":");
        let engine = GameEngine::with_mode(
            store.clone(),
            ManualClock::starting_at(0),
            EngineConfig::default().with_seed(1),
            GameMode::Full,
        );
        assert_eq!(engine.snapshot().target_prefectures.len(), 47);
        let saved = load_session(&store, "gameState").unwrap().unwrap();
        assert_eq!(saved, *engine.snapshot());
    }

    #[test]
    fn seeded_engines_are_reproducible() {
        let (a, _, _) = engine(GameMode::Regions(3));
        let (b, _, _) = engine(GameMode::Regions(3));
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn hints_follow_the_current_question() {
        let (engine, _, _) = engine(GameMode::Full);
        let region = engine.snapshot().current().region.label();
        let hints = engine.current_hints(3);
        assert_eq!(hints.len(), 3);
        assert!(hints[0].starts_with(region));
        assert!(engine.current_hints(0).is_empty());
    }
}
