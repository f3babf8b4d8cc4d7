//! Host-side service contracts and adapters for the LedgerDesk shell.
//!
//! The desk runtime never talks to the browser directly for persistence or
//! notices; it goes through the traits here, with the concrete adapter
//! (memory, no-op, or `localStorage`-backed) chosen at composition time.
//! Browser-specific code is gated on `target_arch = "wasm32"` with inert
//! native fallbacks so every consumer crate compiles and tests natively.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod notice;
pub mod session;
pub mod storage;
pub mod time;

pub use notice::{BrowserNoticeSink, MemoryNoticeSink, NoopNoticeSink, NoticeSink};
pub use session::UserScope;
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsFuture, PrefsStore,
};
pub use storage::web_prefs::WebPrefsStore;
pub use time::{next_monotonic_timestamp_ms, unix_time_ms_now};
