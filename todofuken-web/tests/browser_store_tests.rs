#![cfg(target_arch = "wasm32")]

use todofuken_game::{Clock, KeyValueStore};
use todofuken_web::{BrowserClock, LocalStore, QuizHandle};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_store_round_trips_slots() {
    let store = LocalStore;
    store.set("todofuken.test", "{\"a\":1}").expect("write");
    assert_eq!(
        store.get("todofuken.test").expect("read").as_deref(),
        Some("{\"a\":1}")
    );
    store.remove("todofuken.test").expect("remove");
    assert_eq!(store.get("todofuken.test").expect("read"), None);
}

#[wasm_bindgen_test]
fn browser_clock_reports_epoch_millis() {
    assert!(BrowserClock.now_ms() > 1_600_000_000_000);
}

#[wasm_bindgen_test]
fn handle_persists_the_session_it_starts() {
    LocalStore.remove("gameState").expect("clear");
    let handle = QuizHandle::new("regions-2", None).expect("handle");
    handle.start_game();
    assert!(LocalStore.get("gameState").expect("read").is_some());
    assert!(handle.elapsed_ms() >= 0.0);
    assert_eq!(handle.answer_correct(99, 0), None);
    handle.reset("full");
}
