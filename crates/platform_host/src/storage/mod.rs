//! Storage contracts and the adapters that back them.

pub mod prefs;
pub mod web_prefs;
