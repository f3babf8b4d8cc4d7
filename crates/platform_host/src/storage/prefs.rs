//! Key/value preference storage behind the layout persistence path.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};

/// Object-safe boxed future returned by [`PrefsStore`] methods.
pub type PrefsFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host store for small JSON documents addressed by string key.
///
/// The desk runtime persists the window layout snapshot and the per-app
/// geometry overrides through this trait; adapters decide where the bytes
/// live. Errors are plain strings: callers log and fall back, they never
/// branch on failure shape.
pub trait PrefsStore {
    /// Loads the raw JSON document stored under `key`, if any.
    fn load_pref<'a>(&'a self, key: &'a str) -> PrefsFuture<'a, Result<Option<String>, String>>;

    /// Stores `raw_json` under `key`, replacing any previous value.
    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsFuture<'a, Result<(), String>>;

    /// Removes `key` and its value; removing an absent key succeeds.
    fn remove_pref<'a>(&'a self, key: &'a str) -> PrefsFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Store that keeps nothing; for headless targets and baseline tests.
pub struct NoopPrefsStore;

impl PrefsStore for NoopPrefsStore {
    fn load_pref<'a>(&'a self, _key: &'a str) -> PrefsFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_pref<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> PrefsFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn remove_pref<'a>(&'a self, _key: &'a str) -> PrefsFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory store shared by clone; the default test double.
pub struct MemoryPrefsStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryPrefsStore {
    /// Synchronous peek at a stored document, for test assertions.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Number of stored keys, for test assertions.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl PrefsStore for MemoryPrefsStore {
    fn load_pref<'a>(&'a self, key: &'a str) -> PrefsFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { Ok(self.entries.borrow().get(key).cloned()) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.entries
                .borrow_mut()
                .insert(key.to_string(), raw_json.to_string());
            Ok(())
        })
    }

    fn remove_pref<'a>(&'a self, key: &'a str) -> PrefsFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.entries.borrow_mut().remove(key);
            Ok(())
        })
    }
}

/// Loads and deserializes a typed value through a [`PrefsStore`].
///
/// # Errors
///
/// Returns an error when the store read or JSON decode fails.
pub async fn load_pref_with<S: PrefsStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, String> {
    let Some(raw) = store.load_pref(key).await? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    Ok(Some(value))
}

/// Serializes and saves a typed value through a [`PrefsStore`].
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_pref_with<S: PrefsStore + ?Sized, T: Serialize>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.save_pref(key, &raw).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct GeometryDoc {
        x: i32,
        y: i32,
    }

    #[test]
    fn memory_store_round_trips_and_removes() {
        let store = MemoryPrefsStore::default();
        let store_obj: &dyn PrefsStore = &store;

        block_on(store_obj.save_pref("ledgerdesk.layout.v1", "{\"windows\":[]}")).expect("save");
        assert_eq!(
            block_on(store_obj.load_pref("ledgerdesk.layout.v1")).expect("load"),
            Some("{\"windows\":[]}".to_string())
        );

        block_on(store_obj.remove_pref("ledgerdesk.layout.v1")).expect("remove");
        assert_eq!(
            block_on(store_obj.load_pref("ledgerdesk.layout.v1")).expect("load"),
            None
        );
        assert!(store.is_empty());
    }

    #[test]
    fn removing_an_absent_key_is_fine() {
        let store = MemoryPrefsStore::default();
        block_on((&store as &dyn PrefsStore).remove_pref("never.saved")).expect("remove");
    }

    #[test]
    fn typed_helpers_round_trip() {
        let store = MemoryPrefsStore::default();
        let store_obj: &dyn PrefsStore = &store;

        block_on(save_pref_with(
            store_obj,
            "ledgerdesk.geom.v1.TRADE_EDIT",
            &GeometryDoc { x: 120, y: 64 },
        ))
        .expect("save typed");

        let loaded: Option<GeometryDoc> =
            block_on(load_pref_with(store_obj, "ledgerdesk.geom.v1.TRADE_EDIT"))
                .expect("load typed");
        assert_eq!(loaded, Some(GeometryDoc { x: 120, y: 64 }));
    }

    #[test]
    fn typed_load_reports_decode_failures() {
        let store = MemoryPrefsStore::default();
        let store_obj: &dyn PrefsStore = &store;
        block_on(store_obj.save_pref("bad", "not json")).expect("save");

        let loaded: Result<Option<GeometryDoc>, String> =
            block_on(load_pref_with(store_obj, "bad"));
        assert!(loaded.is_err());
    }

    #[test]
    fn noop_store_accepts_everything_and_returns_nothing() {
        let store = NoopPrefsStore;
        let store_obj: &dyn PrefsStore = &store;
        block_on(store_obj.save_pref("k", "{}")).expect("save");
        assert_eq!(block_on(store_obj.load_pref("k")).expect("load"), None);
        block_on(store_obj.remove_pref("k")).expect("remove");
    }
}
