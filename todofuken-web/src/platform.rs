//! Browser implementations of the engine's storage and clock seams.

use todofuken_game::{Clock, EpochMillis, KeyValueStore, StorageError};

use crate::dom;

/// `window.localStorage`, resolved on every call so a store that becomes
/// unavailable mid-session (private mode, user settings) degrades per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        dom::local_storage().map_err(|err| StorageError::Unavailable(dom::js_error_message(&err)))
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|err| StorageError::Read {
                key: key.to_string(),
                reason: dom::js_error_message(&err),
            })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?.set_item(key, value).map_err(|err| {
            let reason = dom::js_error_message(&err);
            dom::console_warn(&format!("localStorage write to `{key}` failed: {reason}"));
            StorageError::Write {
                key: key.to_string(),
                reason,
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|err| StorageError::Write {
                key: key.to_string(),
                reason: dom::js_error_message(&err),
            })
    }
}

/// Wall clock backed by `Date.now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> EpochMillis {
        #[allow(clippy::cast_possible_truncation)]
        let now = dom::now_ms() as EpochMillis;
        now
    }
}
