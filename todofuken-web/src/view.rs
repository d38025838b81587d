//! Serializable shapes handed to JavaScript.

use serde::Serialize;
use todofuken_game::{
    EventKind, GameEvent, GameMode, GameSession, Prefecture, Progress, SessionPhase,
};

/// Session snapshot enriched with the derived values a UI renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView<'a> {
    #[serde(flatten)]
    pub session: &'a GameSession,
    pub phase: SessionPhase,
    pub progress: Progress,
    pub current: &'static Prefecture,
    pub mode: String,
    /// Expert sessions render the silhouette map.
    pub expert: bool,
}

impl<'a> SessionView<'a> {
    #[must_use]
    pub fn new(session: &'a GameSession, mode: GameMode) -> Self {
        Self {
            session,
            phase: session.phase(),
            progress: session.progress(),
            current: session.current(),
            mode: mode.label(),
            expert: mode.is_expert(),
        }
    }
}

/// Payload passed to JavaScript observers.
#[derive(Debug, Serialize)]
pub struct EventView<'a> {
    pub kind: EventKind,
    pub snapshot: SessionView<'a>,
}

impl<'a> EventView<'a> {
    #[must_use]
    pub fn new(event: &'a GameEvent, mode: GameMode) -> Self {
        Self {
            kind: event.kind,
            snapshot: SessionView::new(&event.snapshot, mode),
        }
    }
}

/// Mode from a UI label: `full`, `expert`, `regions-N`, or a bare region
/// count. Anything unrecognized plays the full catalog.
#[must_use]
pub fn parse_mode(label: &str) -> GameMode {
    let label = label.trim();
    match label {
        "" | "full" => GameMode::Full,
        "expert" => GameMode::Expert,
        _ => GameMode::from_region_param(label.strip_prefix("regions-").unwrap_or(label)),
    }
}
