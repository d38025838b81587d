use std::cell::RefCell;
use std::rc::Rc;

use todofuken_game::{
    EngineConfig, EventKind, GameEngine, GameMode, GameRecord, GameSession, ManualClock,
    MemoryStore, Verdict,
};

use crate::logic::player::{AnswerStrategy, PlayerPolicy};

/// Epoch the simulated clock starts from (2024-05-01T00:00:00Z).
pub const SIMULATION_EPOCH_MS: i64 = 1_714_521_600_000;

/// Configuration for a simulation session.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub mode: GameMode,
    pub strategy: AnswerStrategy,
    /// Rebuild the engine from storage after this many answered questions.
    pub reload_every: Option<usize>,
    /// Make the store reject every write from the start.
    pub fail_writes: bool,
    /// Submit each correct answer a second time.
    pub repeat_answers: bool,
    pub max_turns: usize,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(mode: GameMode, strategy: AnswerStrategy, seed: u64) -> Self {
        Self {
            seed,
            mode,
            strategy,
            reload_every: None,
            fail_writes: false,
            repeat_answers: false,
            max_turns: 200,
        }
    }
}

/// One question as it was played.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    pub prefecture: u8,
    pub attempts: usize,
    pub hint_level: u8,
    pub points: u32,
    pub elapsed_ms: u64,
}

/// Everything a scenario expectation may inspect after a run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub mode: GameMode,
    pub strategy: AnswerStrategy,
    pub initial_session: GameSession,
    pub final_session: GameSession,
    pub turns: Vec<TurnRecord>,
    pub events: Vec<EventKind>,
    pub records: Vec<GameRecord>,
    pub verdicts: Vec<Verdict>,
    pub invariant_violations: Vec<String>,
    pub reloads: usize,
    pub completed: bool,
}

impl SimulationSummary {
    #[must_use]
    pub fn expected_score(&self) -> u32 {
        self.turns.iter().map(|turn| turn.points).sum()
    }

    #[must_use]
    pub fn count_events(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|&&seen| seen == kind).count()
    }
}

type Engine = GameEngine<MemoryStore, ManualClock>;

/// Deterministic play-through harness over an in-memory store and clock.
pub struct SimulationSession {
    config: SimulationConfig,
    store: MemoryStore,
    clock: ManualClock,
    engine: Engine,
    policy: Box<dyn PlayerPolicy>,
    events: Rc<RefCell<Vec<EventKind>>>,
    turns: Vec<TurnRecord>,
    verdicts: Vec<Verdict>,
    violations: Vec<String>,
    reloads: usize,
    last_score: u32,
}

impl SimulationSession {
    pub fn new(config: SimulationConfig) -> Self {
        let store = MemoryStore::new();
        store.reject_writes(config.fail_writes);
        let clock = ManualClock::starting_at(SIMULATION_EPOCH_MS);
        let events = Rc::new(RefCell::new(Vec::new()));
        let engine = Self::build_engine(&store, &clock, &events, config.mode, config.seed);
        let policy = config.strategy.create_policy(config.seed);
        log::debug!(
            "simulating {} with the {} player, seed {}",
            config.mode,
            policy.name(),
            config.seed
        );
        Self {
            policy,
            config,
            store,
            clock,
            engine,
            events,
            turns: Vec::new(),
            verdicts: Vec::new(),
            violations: Vec::new(),
            reloads: 0,
            last_score: 0,
        }
    }

    fn build_engine(
        store: &MemoryStore,
        clock: &ManualClock,
        events: &Rc<RefCell<Vec<EventKind>>>,
        mode: GameMode,
        seed: u64,
    ) -> Engine {
        let mut engine = GameEngine::new(
            store.clone(),
            clock.clone(),
            EngineConfig::default().with_seed(seed),
        );
        let sink = Rc::clone(events);
        // The subscription lives as long as the engine.
        let _subscription = engine.subscribe(move |event| sink.borrow_mut().push(event.kind));
        engine.initialize_from_mode(mode);
        engine
    }

    /// Plays the current question. Returns `false` once nothing is left.
    pub fn advance(&mut self) -> bool {
        let session = self.engine.snapshot();
        if session.is_game_complete {
            return false;
        }
        let prefecture = session.current();
        let attempts = self.policy.attempts(prefecture);
        let mut points = 0;
        let mut hint_level = 0;
        for attempt in &attempts {
            self.clock.advance(self.policy.think_time_ms());
            let verdict = self.engine.submit_answer(&attempt.input, attempt.hint_level);
            self.check_invariants();
            if let Verdict::Correct { points: awarded } = verdict {
                points = awarded;
                hint_level = attempt.hint_level;
            }
            self.verdicts.push(verdict);
        }
        if self.config.repeat_answers {
            let repeat = self.engine.answer_correct(prefecture.id, 0);
            if repeat.is_some() {
                self.violations
                    .push(format!("duplicate answer for {} was scored", prefecture.id));
            }
        }

        self.turns.push(TurnRecord {
            prefecture: prefecture.id.get(),
            attempts: attempts.len(),
            hint_level,
            points,
            elapsed_ms: self.engine.elapsed_ms(),
        });

        if let Some(every) = self.config.reload_every
            && every > 0
            && self.turns.len() % every == 0
        {
            self.reload();
        }

        let next = self.engine.get_next_prefecture();
        self.check_invariants();
        next.is_some()
    }

    /// Rebuilds the engine from persisted state, as a page reload would.
    pub fn reload(&mut self) {
        let seed = self.config.seed.wrapping_add(self.reloads as u64 + 1);
        self.engine = Self::build_engine(
            &self.store,
            &self.clock,
            &self.events,
            self.config.mode,
            seed,
        );
        self.reloads += 1;
        log::debug!("reload #{} at turn {}", self.reloads, self.turns.len());
    }

    fn check_invariants(&mut self) {
        let session = self.engine.snapshot();
        if let Err(err) = session.validate() {
            self.violations.push(err);
        }
        if session.score < self.last_score {
            self.violations.push(format!(
                "score decreased from {} to {}",
                self.last_score, session.score
            ));
        }
        self.last_score = session.score;
    }

    pub fn run(mut self) -> SimulationSummary {
        let initial_session = (*self.engine.snapshot()).clone();
        let mut turns = 0;
        while turns < self.config.max_turns && self.advance() {
            turns += 1;
        }
        let final_session = (*self.engine.snapshot()).clone();
        let events = self.events.borrow().clone();
        SimulationSummary {
            seed: self.config.seed,
            mode: self.config.mode,
            strategy: self.config.strategy,
            completed: final_session.is_game_complete,
            initial_session,
            final_session,
            turns: self.turns,
            events,
            records: self.engine.records(),
            verdicts: self.verdicts,
            invariant_violations: self.violations,
            reloads: self.reloads,
        }
    }
}
