//! `#[wasm_bindgen]` surface used by the quiz UI.
//!
//! One [`QuizHandle`] owns the page's single engine. Methods take `&self` and
//! borrow the engine through a `RefCell`; a call made from inside an observer
//! while the engine is busy finds it borrowed and is ignored.

use js_sys::Function;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;
use todofuken_game::{
    ConfigError, EngineConfig, GameEngine, GameMode, PrefectureId, Subscription, Verdict,
};
use wasm_bindgen::prelude::*;

use crate::dom;
use crate::platform::{BrowserClock, LocalStore};
use crate::view::{EventView, SessionView, parse_mode};

type WebEngine = GameEngine<LocalStore, BrowserClock>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to convert value for JavaScript: {0}")]
    Serialize(String),
}

impl From<BridgeError> for JsValue {
    fn from(err: BridgeError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, BridgeError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|err| BridgeError::Serialize(err.to_string()))
}

#[wasm_bindgen]
pub struct QuizHandle {
    engine: RefCell<WebEngine>,
    mode: Rc<Cell<GameMode>>,
    subscriptions: RefCell<HashMap<u32, Subscription>>,
    next_token: Cell<u32>,
}

#[wasm_bindgen]
impl QuizHandle {
    /// Builds the engine from an optional JSON [`EngineConfig`] and restores
    /// or derives the session for `mode`.
    #[wasm_bindgen(constructor)]
    pub fn new(mode: &str, config_json: Option<String>) -> Result<QuizHandle, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => EngineConfig::from_json(json).map_err(BridgeError::from)?,
            None => EngineConfig::default(),
        };
        let mode = parse_mode(mode);
        let engine = GameEngine::with_mode(LocalStore, BrowserClock, config, mode);
        Ok(Self {
            engine: RefCell::new(engine),
            mode: Rc::new(Cell::new(mode)),
            subscriptions: RefCell::new(HashMap::new()),
            next_token: Cell::new(1),
        })
    }

    /// Current session plus derived progress, phase and question.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let engine = self.engine.try_borrow().map_err(|_| busy())?;
        let session = engine.snapshot();
        Ok(to_js(&SessionView::new(&session, engine.mode()))?)
    }

    /// Registers `callback` for every mutation and returns a token for
    /// [`Self::unsubscribe`]. The callback receives `{ kind, snapshot }`.
    pub fn subscribe(&self, callback: Function) -> Result<u32, JsValue> {
        let engine = self.engine.try_borrow().map_err(|_| busy())?;
        let mode = Rc::clone(&self.mode);
        let subscription = engine.subscribe(move |event| {
            let payload = match to_js(&EventView::new(event, mode.get())) {
                Ok(payload) => payload,
                Err(err) => {
                    dom::console_error(&err.to_string());
                    return;
                }
            };
            if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
                dom::console_error(&format!(
                    "quiz observer threw: {}",
                    dom::js_error_message(&err)
                ));
            }
        });
        let token = self.next_token.get();
        self.next_token.set(token.wrapping_add(1));
        self.subscriptions.borrow_mut().insert(token, subscription);
        Ok(token)
    }

    /// Removes an observer. Returns `false` for unknown tokens.
    pub fn unsubscribe(&self, token: u32) -> bool {
        match self.subscriptions.borrow_mut().remove(&token) {
            Some(subscription) => {
                subscription.unsubscribe();
                true
            }
            None => false,
        }
    }

    pub fn initialize(&self, mode: &str) {
        let mode = parse_mode(mode);
        self.mode.set(mode);
        self.mutate((), |engine| engine.initialize_from_mode(mode));
    }

    #[wasm_bindgen(js_name = startGame)]
    pub fn start_game(&self) {
        self.mutate((), WebEngine::start_game);
    }

    /// Scores `id` at `hint_level`. Returns the points awarded, or nothing
    /// when the answer was ignored.
    #[wasm_bindgen(js_name = answerCorrect)]
    pub fn answer_correct(&self, id: u32, hint_level: u8) -> Option<u32> {
        let id = PrefectureId::from_raw(id)?;
        self.mutate(None, |engine| engine.answer_correct(id, hint_level))
    }

    /// Checks typed input against the current question.
    #[wasm_bindgen(js_name = submitAnswer)]
    pub fn submit_answer(&self, input: &str, hint_level: u8) -> Result<JsValue, JsValue> {
        let verdict = self
            .mutate(None, |engine| Some(engine.submit_answer(input, hint_level)))
            .ok_or_else(busy)?;
        Ok(to_js::<Verdict>(&verdict)?)
    }

    /// Advances to a random unanswered prefecture and returns its id, or
    /// nothing once all targets are answered.
    #[wasm_bindgen(js_name = nextPrefecture)]
    pub fn next_prefecture(&self) -> Option<u32> {
        self.mutate(None, |engine| {
            engine.get_next_prefecture().map(|p| u32::from(p.id.get()))
        })
    }

    pub fn reset(&self, mode: &str) {
        let mode = parse_mode(mode);
        self.mode.set(mode);
        self.mutate((), |engine| engine.reset_game(mode));
    }

    pub fn progress(&self) -> Result<JsValue, JsValue> {
        let engine = self.engine.try_borrow().map_err(|_| busy())?;
        Ok(to_js(&engine.progress())?)
    }

    #[wasm_bindgen(js_name = targetInfo)]
    pub fn target_info(&self) -> Result<JsValue, JsValue> {
        let engine = self.engine.try_borrow().map_err(|_| busy())?;
        Ok(to_js(&engine.target_info())?)
    }

    /// Elapsed play time, polled by the UI timer.
    #[wasm_bindgen(js_name = elapsedMs)]
    pub fn elapsed_ms(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let elapsed = self
            .engine
            .try_borrow()
            .map_or(0.0, |engine| engine.elapsed_ms() as f64);
        elapsed
    }

    #[wasm_bindgen(js_name = liveWpm)]
    pub fn live_wpm(&self) -> u32 {
        self.engine
            .try_borrow()
            .map_or(0, |engine| engine.live_wpm())
    }

    /// Mean milliseconds per correct answer, or nothing before the first one.
    #[wasm_bindgen(js_name = averageMsPerAnswer)]
    pub fn average_ms_per_answer(&self) -> Option<f64> {
        #[allow(clippy::cast_precision_loss)]
        let average = self
            .engine
            .try_borrow()
            .ok()?
            .average_ms_per_answer()
            .map(|ms| ms as f64);
        average
    }

    /// Projected total play time at the current pace.
    #[wasm_bindgen(js_name = estimatedFinishMs)]
    pub fn estimated_finish_ms(&self) -> Option<f64> {
        #[allow(clippy::cast_precision_loss)]
        let estimate = self
            .engine
            .try_borrow()
            .ok()?
            .estimated_finish_ms()
            .map(|ms| ms as f64);
        estimate
    }

    /// Cumulative hint texts for the current question up to `level`.
    pub fn hints(&self, level: u8) -> Result<JsValue, JsValue> {
        let engine = self.engine.try_borrow().map_err(|_| busy())?;
        Ok(to_js(&engine.current_hints(level))?)
    }

    pub fn records(&self) -> Result<JsValue, JsValue> {
        let engine = self.engine.try_borrow().map_err(|_| busy())?;
        Ok(to_js(&engine.records())?)
    }

    #[wasm_bindgen(js_name = bestRecord)]
    pub fn best_record(&self) -> Result<JsValue, JsValue> {
        let engine = self.engine.try_borrow().map_err(|_| busy())?;
        Ok(to_js(&engine.best_record())?)
    }

    #[wasm_bindgen(js_name = clearRecords)]
    pub fn clear_records(&self) {
        if let Ok(engine) = self.engine.try_borrow() {
            engine.clear_records();
        }
    }
}

impl QuizHandle {
    fn mutate<T>(&self, ignored: T, op: impl FnOnce(&mut WebEngine) -> T) -> T {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => op(&mut engine),
            Err(_) => {
                dom::console_warn("ignoring quiz call made while the engine is notifying");
                ignored
            }
        }
    }
}

fn busy() -> JsValue {
    JsValue::from_str("quiz engine is busy notifying observers")
}
