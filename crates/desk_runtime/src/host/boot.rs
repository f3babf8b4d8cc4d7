//! One-shot boot hydration: load persisted layout, then unlock persistence.

use leptos::{create_effect, spawn_local, Callable, Callback};

use crate::{host::DeskHostContext, persistence, reducer::DeskAction};

/// Loads the persisted layout snapshot and per-app geometry, replays them
/// into the reducer, then marks hydration complete.
///
/// `BootHydrationComplete` is dispatched even when nothing was stored so the
/// write path opens exactly once per session. Writes scheduled before that
/// point are ignored, which keeps the boot replay from clobbering the very
/// snapshot it is restoring.
pub(super) fn install_boot_hydration(host: DeskHostContext, dispatch: Callback<DeskAction>) {
    create_effect(move |_| {
        let dispatch = dispatch;
        let host = host.clone();
        spawn_local(async move {
            let prefs = host.prefs_store();
            let scope = host.user_scope();
            let boot = persistence::load_boot_layout(prefs.as_ref(), &scope).await;

            if boot.snapshot.is_some() || !boot.per_app_geometry.is_empty() {
                dispatch.call(DeskAction::HydrateSnapshot {
                    snapshot: boot.snapshot.unwrap_or_default(),
                    per_app_geometry: boot.per_app_geometry,
                });
            }

            dispatch.call(DeskAction::BootHydrationComplete);
        });
    });
}
