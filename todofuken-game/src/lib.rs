//! Todofuken Game Core
//!
//! Platform-agnostic state for the Japanese prefecture quiz: the fixed
//! prefecture catalog, target selection per game mode, scoring, and the
//! session engine with its persistence and observers.
//! Storage and time are injected through [`KeyValueStore`] and [`Clock`], so
//! the same engine runs in the browser and in native tests.

pub mod answer;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod engine;
pub mod events;
pub mod hints;
pub mod mode;
pub mod picker;
pub mod records;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use answer::{accepted_answers, is_correct};
pub use catalog::{PREFECTURE_COUNT, PREFECTURES, Prefecture, PrefectureId, Region};
pub use clock::{Clock, EpochMillis, ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use engine::{GameEngine, Verdict};
pub use events::{EventKind, GameEvent, Subscription};
pub use hints::{hint_text, hints_up_to};
pub use mode::GameMode;
pub use picker::pick_next;
pub use records::{GameRecord, RecordStore};
pub use scoring::{perfect_score, score_for};
pub use selector::{TargetSet, matches_mode, select_targets};
pub use session::{GameSession, Progress, SessionPhase, TargetInfo};
pub use storage::{KeyValueStore, MemoryStore, PersistError, StorageError};
