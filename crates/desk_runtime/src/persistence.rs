//! Boot hydration loads and the storage targets behind debounced writes.
//!
//! The layout snapshot and the per-kind geometry overrides live under
//! sibling keys so the two write cadences never touch each other's
//! documents. All loads are lenient: a malformed document is logged and
//! skipped, never allowed to abort boot.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use panel_contract::AppKind;
use platform_host::{load_pref_with, save_pref_with, PrefsStore, UserScope};

use crate::catalog::APP_CATALOG;
use crate::model::{LayoutSnapshot, PanelGeometry, WindowRecord, LAYOUT_SCHEMA_VERSION};

const LAYOUT_PREF_KEY: &str = "ledgerdesk.layout.v1";
const GEOMETRY_PREF_PREFIX: &str = "ledgerdesk.geom.v1";

fn layout_key(scope: &UserScope) -> String {
    scope.scoped_key(LAYOUT_PREF_KEY)
}

fn geometry_key(scope: &UserScope, app: AppKind) -> String {
    scope.scoped_key(&format!("{GEOMETRY_PREF_PREFIX}.{}", app.code()))
}

/// Everything hydration needs, loaded in one pass at boot.
#[derive(Debug, Clone, Default)]
pub struct BootLayout {
    /// Persisted layout snapshot, when one decoded cleanly.
    pub snapshot: Option<LayoutSnapshot>,
    /// Per-kind geometry overrides that decoded cleanly.
    pub per_app_geometry: BTreeMap<AppKind, PanelGeometry>,
}

/// Loads the layout snapshot and every per-kind geometry override for
/// `scope`. Boot proceeds with whatever survived decoding.
pub async fn load_boot_layout(store: &dyn PrefsStore, scope: &UserScope) -> BootLayout {
    let snapshot = match store.load_pref(&layout_key(scope)).await {
        Ok(Some(raw)) => decode_layout_snapshot(&raw),
        Ok(None) => None,
        Err(err) => {
            leptos::logging::warn!("layout snapshot load failed: {err}");
            None
        }
    };

    let mut per_app_geometry = BTreeMap::new();
    for descriptor in &APP_CATALOG {
        match load_pref_with::<_, PanelGeometry>(store, &geometry_key(scope, descriptor.app)).await
        {
            Ok(Some(geometry)) => {
                per_app_geometry.insert(descriptor.app, geometry);
            }
            Ok(None) => {}
            Err(err) => {
                leptos::logging::warn!(
                    "geometry override load failed for {}: {err}",
                    descriptor.app.code()
                );
            }
        }
    }

    BootLayout {
        snapshot,
        per_app_geometry,
    }
}

/// Writes the layout snapshot for `scope`. Failures are logged; the desk
/// keeps running on its in-memory state.
pub async fn persist_layout(store: &dyn PrefsStore, scope: &UserScope, snapshot: &LayoutSnapshot) {
    if let Err(err) = save_pref_with(store, &layout_key(scope), snapshot).await {
        leptos::logging::warn!("layout snapshot write failed: {err}");
    }
}

/// Writes one kind's geometry override for `scope`.
pub async fn persist_app_geometry(
    store: &dyn PrefsStore,
    scope: &UserScope,
    app: AppKind,
    geometry: &PanelGeometry,
) {
    if let Err(err) = save_pref_with(store, &geometry_key(scope, app), geometry).await {
        leptos::logging::warn!("geometry write failed for {}: {err}", app.code());
    }
}

/// Removes one kind's persisted geometry override for `scope`.
pub async fn drop_app_geometry(store: &dyn PrefsStore, scope: &UserScope, app: AppKind) {
    if let Err(err) = store.remove_pref(&geometry_key(scope, app)).await {
        leptos::logging::warn!("geometry reset failed for {}: {err}", app.code());
    }
}

/// Field-by-field snapshot decoding.
///
/// A snapshot written by a newer schema is ignored wholesale; within a
/// known schema, individual window entries that fail to decode (or claim
/// the home pseudo-app, or duplicate an id) are dropped and the rest kept.
fn decode_layout_snapshot(raw: &str) -> Option<LayoutSnapshot> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            leptos::logging::warn!("layout snapshot is not valid JSON: {err}");
            return None;
        }
    };

    let schema_version = value
        .get("schema_version")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;
    if schema_version > LAYOUT_SCHEMA_VERSION {
        leptos::logging::warn!(
            "layout snapshot schema {schema_version} is newer than {LAYOUT_SCHEMA_VERSION}; ignoring it"
        );
        return None;
    }

    let mut windows: Vec<WindowRecord> = Vec::new();
    let mut seen_ids = BTreeSet::new();
    if let Some(entries) = value.get("windows").and_then(Value::as_array) {
        for entry in entries {
            let Ok(window) = serde_json::from_value::<WindowRecord>(entry.clone()) else {
                leptos::logging::warn!("skipping malformed window entry in layout snapshot");
                continue;
            };
            if window.app.is_home() || !seen_ids.insert(window.id) {
                continue;
            }
            windows.push(window);
        }
    }

    let active_window_id = value
        .get("active_window_id")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .flatten();
    let instance_policy = value
        .get("instance_policy")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    Some(LayoutSnapshot {
        schema_version,
        windows,
        active_window_id,
        instance_policy,
    })
}
