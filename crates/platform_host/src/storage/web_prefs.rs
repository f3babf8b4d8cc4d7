//! `localStorage`-backed preference store.
//!
//! The browser API is synchronous; the [`PrefsStore`] impl wraps it in
//! already-resolved futures so the runtime's one persistence path works
//! against every adapter. On non-wasm targets the store reads as empty and
//! accepts writes without storing, which keeps native tests hermetic.

use super::prefs::{PrefsFuture, PrefsStore};

#[derive(Debug, Clone, Copy, Default)]
/// Browser preference store backed by `window.localStorage`.
pub struct WebPrefsStore;

impl WebPrefsStore {
    /// Loads the raw JSON document under `key`.
    pub fn load_raw(self, key: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()?.local_storage().ok().flatten()?;
            storage.get_item(key).ok().flatten()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            None
        }
    }

    /// Stores `raw_json` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or full.
    pub fn save_raw(self, key: &str, raw_json: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .set_item(key, raw_json)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, raw_json);
            Ok(())
        }
    }

    /// Removes `key` from localStorage.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable.
    pub fn remove_raw(self, key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .remove_item(key)
                .map_err(|e| format!("localStorage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }

}

impl PrefsStore for WebPrefsStore {
    fn load_pref<'a>(&'a self, key: &'a str) -> PrefsFuture<'a, Result<Option<String>, String>> {
        let store = *self;
        Box::pin(async move { Ok(store.load_raw(key)) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.save_raw(key, raw_json) })
    }

    fn remove_pref<'a>(&'a self, key: &'a str) -> PrefsFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.remove_raw(key) })
    }
}
