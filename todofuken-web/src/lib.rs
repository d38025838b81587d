#![forbid(unsafe_code)]
//! Browser bindings for the Todofuken game core.
//!
//! The UI talks to a single [`bridge::QuizHandle`]; this crate supplies the
//! `localStorage` store and the `Date.now()` clock the engine runs on.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod bridge;
pub mod dom;
pub mod platform;
pub mod view;

pub use bridge::QuizHandle;
pub use platform::{BrowserClock, LocalStore};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
