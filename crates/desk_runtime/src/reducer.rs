//! Reducer actions, side-effect intents, and transition logic for the desk
//! window registry.

mod launch;

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use panel_contract::{AdjustmentMap, AppKind, PermissionGate};

use crate::drag::{resized_dimensions, strategy_for};
use crate::model::{
    DeskState, DragMode, DragSession, InstancePolicy, InteractionState, LaunchRequest,
    LayoutSnapshot, PanelGeometry, PanelPoint, PanelRect, PanelSize, PointerPosition,
    ResizeSession, Viewport, WindowId,
};

/// Host facilities the reducer consults without owning them. Borrowed per
/// dispatch so transitions stay pure functions of their inputs.
pub struct DeskEnv<'a> {
    /// Gate checked before a launch may touch the registry.
    pub permissions: &'a dyn PermissionGate,
}

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desk`] to mutate [`DeskState`].
pub enum DeskAction {
    /// Open a window for an application, or re-activate an existing one
    /// under a single-instance rule.
    Launch(LaunchRequest),
    /// Raise a window above everything else and mark it active.
    BringToFront {
        /// Window to raise.
        window_id: WindowId,
    },
    /// Minimize a window. No other window is promoted in its place.
    Minimize {
        /// Window to minimize.
        window_id: WindowId,
    },
    /// Restore a minimized window and bring it to the front.
    Restore {
        /// Window to restore.
        window_id: WindowId,
    },
    /// Taskbar button behavior: restore if minimized, minimize if active,
    /// otherwise bring to front.
    ToggleTaskbar {
        /// Window associated with the taskbar entry.
        window_id: WindowId,
    },
    /// Close a window, discarding its adjustments and forcing pending
    /// persistence writes out immediately.
    Close {
        /// Window to close.
        window_id: WindowId,
    },
    /// Close every open window.
    CloseAll,
    /// Forget the persisted geometry override for a window's kind and
    /// re-place the window at a fresh cascade slot.
    ResetGeometry {
        /// Window whose kind should be reset.
        window_id: WindowId,
    },
    /// Change the session-wide instance policy. Existing duplicates stay
    /// open; only future launches see the new policy.
    SetInstancePolicy {
        /// Policy to apply from now on.
        policy: InstancePolicy,
    },
    /// Begin dragging a window.
    BeginMove {
        /// Window being dragged.
        window_id: WindowId,
        /// Pointer position at drag start.
        pointer: PointerPosition,
        /// Measured on-screen rect of the window at drag start.
        anchor: PanelRect,
    },
    /// Update an in-progress drag.
    UpdateMove {
        /// Current pointer position.
        pointer: PointerPosition,
        /// Viewport to clamp against.
        viewport: Viewport,
    },
    /// Finish the active drag and persist the final geometry.
    EndMove {
        /// Pointer position at release.
        pointer: PointerPosition,
        /// Viewport to clamp against.
        viewport: Viewport,
    },
    /// Begin a corner-handle resize.
    BeginResize {
        /// Window being resized.
        window_id: WindowId,
        /// Pointer position at resize start.
        pointer: PointerPosition,
        /// Measured width in px, resolving any auto axis.
        width: i32,
        /// Measured height in px, resolving any auto axis.
        height: i32,
    },
    /// Update an in-progress resize.
    UpdateResize {
        /// Current pointer position.
        pointer: PointerPosition,
    },
    /// Finish the active resize and persist the final geometry.
    EndResize {
        /// Pointer position at release.
        pointer: PointerPosition,
    },
    /// Panel-reported unsaved-changes marker. Volatile, never persisted.
    SetDirty {
        /// Window the panel runs in.
        window_id: WindowId,
        /// New marker value.
        dirty: bool,
    },
    /// Shallow-merge a patch into a window's panel props.
    UpdateProps {
        /// Window the panel runs in.
        window_id: WindowId,
        /// Patch object; incoming keys overwrite existing ones.
        patch: Value,
    },
    /// Replace a window's uncommitted inventory adjustments.
    ReportAdjustments {
        /// Reporting window.
        window_id: WindowId,
        /// Full set of deltas for that window.
        deltas: AdjustmentMap,
    },
    /// Drop a window's uncommitted inventory adjustments.
    ClearAdjustments {
        /// Window whose contribution is dropped.
        window_id: WindowId,
    },
    /// Restore registry state from the persisted boot snapshot.
    HydrateSnapshot {
        /// Layout snapshot loaded at boot.
        snapshot: LayoutSnapshot,
        /// Per-kind geometry overrides loaded at boot.
        per_app_geometry: BTreeMap<AppKind, PanelGeometry>,
    },
    /// Mark boot hydration finished. Layout writes are live from here on.
    BootHydrationComplete,
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_desk`] for the shell runtime to
/// execute.
pub enum RuntimeEffect {
    /// Schedule a debounced write of the layout snapshot.
    PersistLayout,
    /// Schedule a debounced write of one kind's geometry override.
    PersistGeometry(AppKind),
    /// Remove one kind's persisted geometry override.
    DropGeometry(AppKind),
    /// Flush every pending debounced write immediately.
    FlushWrites,
    /// Surface a user-facing notice.
    Notify {
        /// Short heading.
        title: String,
        /// Notice body.
        body: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Registry errors for invalid actions (for example, referencing a missing
/// window).
pub enum RegistryError {
    /// The target window id was not found in the current state.
    #[error("window not found")]
    WindowNotFound,
}

/// Applies a [`DeskAction`] to the registry state and collects resulting
/// side effects.
///
/// This function is the authoritative state transition engine for window
/// management. It never touches storage or the DOM; everything observable
/// beyond the state structs comes back as [`RuntimeEffect`]s.
///
/// # Errors
///
/// Returns [`RegistryError::WindowNotFound`] when an action references a
/// window that is not present.
pub fn reduce_desk(
    state: &mut DeskState,
    interaction: &mut InteractionState,
    env: &DeskEnv<'_>,
    action: DeskAction,
) -> Result<Vec<RuntimeEffect>, RegistryError> {
    let mut effects = Vec::new();
    match action {
        DeskAction::Launch(request) => {
            launch::reduce_launch(state, env, request, &mut effects)?;
        }
        DeskAction::BringToFront { window_id } => {
            if bring_to_front_internal(state, window_id)? {
                effects.push(RuntimeEffect::PersistLayout);
            }
        }
        DeskAction::Minimize { window_id } => {
            let window = state
                .window_mut(window_id)
                .ok_or(RegistryError::WindowNotFound)?;
            window.minimized = true;
            if state.active_window_id == Some(window_id) {
                state.active_window_id = None;
            }
            effects.push(RuntimeEffect::PersistLayout);
        }
        DeskAction::Restore { window_id } => {
            if bring_to_front_internal(state, window_id)? {
                effects.push(RuntimeEffect::PersistLayout);
            }
        }
        DeskAction::ToggleTaskbar { window_id } => {
            let minimized = state
                .window(window_id)
                .map(|w| w.minimized)
                .ok_or(RegistryError::WindowNotFound)?;
            let next = if minimized {
                DeskAction::Restore { window_id }
            } else if state.active_window_id == Some(window_id) {
                DeskAction::Minimize { window_id }
            } else {
                DeskAction::BringToFront { window_id }
            };
            return reduce_desk(state, interaction, env, next);
        }
        DeskAction::Close { window_id } => {
            close_window_internal(state, window_id, &mut effects)?;
        }
        DeskAction::CloseAll => {
            close_all_internal(state, &mut effects);
        }
        DeskAction::ResetGeometry { window_id } => {
            let app = state
                .window(window_id)
                .map(|w| w.app)
                .ok_or(RegistryError::WindowNotFound)?;
            let slot_position = launch::cascade_position(state.windows.len());
            let default_size = crate::catalog::descriptor(app)
                .map(|d| d.default_size)
                .unwrap_or_default();
            state.per_app_geometry.remove(&app);
            if let Some(window) = state.window_mut(window_id) {
                window.size = default_size;
                match window.drag_mode {
                    DragMode::Absolute => window.position = slot_position,
                    DragMode::TransformOffset => window.position = PanelPoint::default(),
                    DragMode::AbsoluteLatch => {
                        window.position = PanelPoint::default();
                        window.latched = false;
                    }
                }
            }
            let _ = bring_to_front_internal(state, window_id)?;
            effects.push(RuntimeEffect::DropGeometry(app));
            effects.push(RuntimeEffect::PersistLayout);
        }
        DeskAction::SetInstancePolicy { policy } => {
            if state.instance_policy != policy {
                state.instance_policy = policy;
                effects.push(RuntimeEffect::PersistLayout);
            }
        }
        DeskAction::BeginMove {
            window_id,
            pointer,
            anchor,
        } => {
            let _ = bring_to_front_internal(state, window_id)?;
            let window = state
                .window_mut(window_id)
                .ok_or(RegistryError::WindowNotFound)?;
            if window.is_stylesheet_positioned() {
                // First drag of a latch-mode window: the measured rect
                // becomes its absolute baseline.
                window.position = PanelPoint::new(anchor.x, anchor.y);
                window.latched = true;
            }
            interaction.drag = Some(DragSession {
                window_id,
                mode: window.drag_mode,
                pointer_start: pointer,
                anchor,
                position_start: window.position,
            });
        }
        DeskAction::UpdateMove { pointer, viewport } => {
            if let Some(session) = interaction.drag.clone() {
                match state.window_mut(session.window_id) {
                    Some(window) => {
                        window.position =
                            strategy_for(session.mode).position_for(&session, pointer, viewport);
                    }
                    // The window vanished mid-drag (closed underneath the
                    // pointer); the stale session just ends.
                    None => interaction.drag = None,
                }
            }
        }
        DeskAction::EndMove { pointer, viewport } => {
            if let Some(session) = interaction.drag.take() {
                let updated = state.window_mut(session.window_id).map(|window| {
                    window.position =
                        strategy_for(session.mode).position_for(&session, pointer, viewport);
                    (window.app, window.geometry())
                });
                if let Some((app, geometry)) = updated {
                    state.per_app_geometry.insert(app, geometry);
                    effects.push(RuntimeEffect::PersistGeometry(app));
                    effects.push(RuntimeEffect::PersistLayout);
                }
            }
        }
        DeskAction::BeginResize {
            window_id,
            pointer,
            width,
            height,
        } => {
            let _ = bring_to_front_internal(state, window_id)?;
            if let Some(window) = state.window_mut(window_id) {
                // Auto axes are concrete from the first resize on.
                window.size = PanelSize::px(width, height);
            }
            interaction.resize = Some(ResizeSession {
                window_id,
                pointer_start: pointer,
                width_start: width,
                height_start: height,
            });
        }
        DeskAction::UpdateResize { pointer } => {
            if let Some(session) = interaction.resize.clone() {
                match state.window_mut(session.window_id) {
                    Some(window) => {
                        let (width, height) = resized_dimensions(&session, pointer);
                        window.size = PanelSize::px(width, height);
                    }
                    None => interaction.resize = None,
                }
            }
        }
        DeskAction::EndResize { pointer } => {
            if let Some(session) = interaction.resize.take() {
                let updated = state.window_mut(session.window_id).map(|window| {
                    let (width, height) = resized_dimensions(&session, pointer);
                    window.size = PanelSize::px(width, height);
                    (window.app, window.geometry())
                });
                if let Some((app, geometry)) = updated {
                    state.per_app_geometry.insert(app, geometry);
                    effects.push(RuntimeEffect::PersistGeometry(app));
                    effects.push(RuntimeEffect::PersistLayout);
                }
            }
        }
        DeskAction::SetDirty { window_id, dirty } => {
            state
                .window_mut(window_id)
                .ok_or(RegistryError::WindowNotFound)?
                .dirty = dirty;
        }
        DeskAction::UpdateProps { window_id, patch } => {
            let window = state
                .window_mut(window_id)
                .ok_or(RegistryError::WindowNotFound)?;
            launch::merge_props(&mut window.props, patch);
            effects.push(RuntimeEffect::PersistLayout);
        }
        DeskAction::ReportAdjustments { window_id, deltas } => {
            // Reports can race a close; one for a window that is gone is
            // dropped rather than treated as an error.
            if state.window(window_id).is_some() {
                state.adjustments.report(window_id, deltas);
            }
        }
        DeskAction::ClearAdjustments { window_id } => {
            state.adjustments.remove(window_id);
        }
        DeskAction::HydrateSnapshot {
            snapshot,
            per_app_geometry,
        } => {
            state.apply_snapshot(snapshot, per_app_geometry);
        }
        DeskAction::BootHydrationComplete => {
            state.hydrated = true;
        }
    }

    Ok(effects)
}

/// Raises a window, unminimizing it and marking it active. Returns whether
/// anything changed; re-raising the frontmost visible window is a no-op so
/// the z counter only advances on real focus changes.
fn bring_to_front_internal(
    state: &mut DeskState,
    window_id: WindowId,
) -> Result<bool, RegistryError> {
    let top_z = state.max_z_index();
    let current = state
        .window(window_id)
        .ok_or(RegistryError::WindowNotFound)?;
    if state.active_window_id == Some(window_id) && !current.minimized && current.z_index == top_z {
        return Ok(false);
    }
    let z = state.alloc_z_index();
    if let Some(window) = state.window_mut(window_id) {
        window.minimized = false;
        window.z_index = z;
    }
    state.active_window_id = Some(window_id);
    Ok(true)
}

fn close_window_internal(
    state: &mut DeskState,
    window_id: WindowId,
    effects: &mut Vec<RuntimeEffect>,
) -> Result<(), RegistryError> {
    let before_len = state.windows.len();
    state.windows.retain(|w| w.id != window_id);
    if state.windows.len() == before_len {
        return Err(RegistryError::WindowNotFound);
    }
    state.adjustments.remove(window_id);
    if state.active_window_id == Some(window_id) {
        state.active_window_id = None;
    }
    effects.push(RuntimeEffect::PersistLayout);
    effects.push(RuntimeEffect::FlushWrites);
    Ok(())
}

fn close_all_internal(state: &mut DeskState, effects: &mut Vec<RuntimeEffect>) {
    if state.windows.is_empty() && state.adjustments.is_empty() {
        return;
    }
    state.windows.clear();
    state.active_window_id = None;
    state.adjustments.clear();
    effects.push(RuntimeEffect::PersistLayout);
    effects.push(RuntimeEffect::FlushWrites);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use panel_contract::{
        AllowAllPermissions, PermissionAction, StaticPermissionSet, ACTIVATED_AT_PROP,
    };
    use crate::model::{
        CASCADE_BASE_X, CASCADE_BASE_Y, CASCADE_STEP_PX, MIN_PANEL_HEIGHT, MIN_PANEL_WIDTH,
        NAV_CHROME_HEIGHT_PX, SIDECAR_GAP_PX,
    };

    fn test_env() -> DeskEnv<'static> {
        DeskEnv {
            permissions: &AllowAllPermissions,
        }
    }

    fn launch(
        state: &mut DeskState,
        interaction: &mut InteractionState,
        request: LaunchRequest,
    ) -> Vec<RuntimeEffect> {
        reduce_desk(state, interaction, &test_env(), DeskAction::Launch(request)).expect("launch")
    }

    fn open(state: &mut DeskState, interaction: &mut InteractionState, app: AppKind) -> WindowId {
        launch(
            state,
            interaction,
            LaunchRequest::new(app, Viewport::default()),
        );
        state.windows.last().expect("window").id
    }

    #[test]
    fn launch_opens_window_with_catalog_title_at_first_cascade_slot() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        let effects = launch(
            &mut state,
            &mut interaction,
            LaunchRequest::new(AppKind::TradeEdit, Viewport::default()),
        );

        assert_eq!(state.windows.len(), 1);
        let window = &state.windows[0];
        assert_eq!(window.title, "Trade Entry [TRADE_EDIT]");
        assert_eq!(window.icon, "TR");
        assert_eq!(window.z_index, 1);
        assert_eq!(window.position, PanelPoint::new(CASCADE_BASE_X, CASCADE_BASE_Y));
        assert_eq!(window.size, PanelSize::px(720, 540));
        assert_eq!(state.active_window_id, Some(window.id));
        assert!(effects.contains(&RuntimeEffect::PersistLayout));
    }

    #[test]
    fn cascade_staggers_by_open_window_count() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        open(&mut state, &mut interaction, AppKind::TradeEdit);
        open(&mut state, &mut interaction, AppKind::TradeEdit);
        open(&mut state, &mut interaction, AppKind::TradeEdit);

        assert_eq!(
            state.windows[1].position,
            PanelPoint::new(CASCADE_BASE_X + CASCADE_STEP_PX, CASCADE_BASE_Y + CASCADE_STEP_PX)
        );
        assert_eq!(
            state.windows[2].position,
            PanelPoint::new(
                CASCADE_BASE_X + 2 * CASCADE_STEP_PX,
                CASCADE_BASE_Y + 2 * CASCADE_STEP_PX
            )
        );
    }

    #[test]
    fn z_order_strictly_increases_and_is_never_renumbered() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        let a = open(&mut state, &mut interaction, AppKind::TradeEdit);
        let b = open(&mut state, &mut interaction, AppKind::PartnerLedger);
        let c = open(&mut state, &mut interaction, AppKind::InventoryBrowse);

        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::BringToFront { window_id: a },
        )
        .expect("raise a");
        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::BringToFront { window_id: b },
        )
        .expect("raise b");

        let z = |id| state.window(id).expect("window").z_index;
        assert_eq!(z(a), 4);
        assert_eq!(z(b), 5);
        // The untouched window keeps its original paint order value.
        assert_eq!(z(c), 3);
        assert_eq!(state.active_window_id, Some(b));
        // Creation order of the backing vec is undisturbed by focus churn.
        assert_eq!(
            state.windows.iter().map(|w| w.id).collect::<Vec<_>>(),
            vec![a, b, c]
        );
    }

    #[test]
    fn refocusing_the_frontmost_window_consumes_no_z_value() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        open(&mut state, &mut interaction, AppKind::TradeEdit);
        let top = open(&mut state, &mut interaction, AppKind::PartnerLedger);
        let counter_before = state.next_z_index;

        let effects = reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::BringToFront { window_id: top },
        )
        .expect("refocus");

        assert_eq!(state.next_z_index, counter_before);
        assert!(effects.is_empty());
    }

    #[test]
    fn minimize_clears_active_without_promoting_another_window() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        let a = open(&mut state, &mut interaction, AppKind::TradeEdit);
        let b = open(&mut state, &mut interaction, AppKind::PartnerLedger);

        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::Minimize { window_id: b },
        )
        .expect("minimize");

        assert!(state.window(b).expect("b").minimized);
        assert_eq!(state.active_window_id, None);
        assert!(!state.window(a).expect("a").minimized);
    }

    #[test]
    fn taskbar_toggle_walks_restore_minimize_raise() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        let a = open(&mut state, &mut interaction, AppKind::TradeEdit);
        let b = open(&mut state, &mut interaction, AppKind::PartnerLedger);
        let toggle = |state: &mut DeskState, interaction: &mut InteractionState, id| {
            reduce_desk(
                state,
                interaction,
                &test_env(),
                DeskAction::ToggleTaskbar { window_id: id },
            )
            .expect("toggle")
        };

        // Active window: toggling minimizes it.
        toggle(&mut state, &mut interaction, b);
        assert!(state.window(b).expect("b").minimized);
        assert_eq!(state.active_window_id, None);

        // Minimized window: toggling restores it above everything.
        toggle(&mut state, &mut interaction, b);
        let restored = state.window(b).expect("b");
        assert!(!restored.minimized);
        assert_eq!(restored.z_index, state.max_z_index());
        assert_eq!(state.active_window_id, Some(b));

        // Background window: toggling raises it.
        toggle(&mut state, &mut interaction, a);
        assert_eq!(state.window(a).expect("a").z_index, state.max_z_index());
        assert_eq!(state.active_window_id, Some(a));
    }

    #[test]
    fn close_removes_window_and_its_adjustments_in_one_transition() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        let a = open(&mut state, &mut interaction, AppKind::TradeEdit);
        let b = open(&mut state, &mut interaction, AppKind::TradeEdit);
        for (id, delta) in [(a, -3), (b, -2)] {
            reduce_desk(
                &mut state,
                &mut interaction,
                &test_env(),
                DeskAction::ReportAdjustments {
                    window_id: id,
                    deltas: AdjustmentMap::from([("item-7".to_string(), delta)]),
                },
            )
            .expect("report");
        }
        assert_eq!(state.adjustments.merged().get("item-7"), Some(&-5));

        let effects = reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::Close { window_id: a },
        )
        .expect("close");

        assert_eq!(state.windows.len(), 1);
        assert_eq!(state.adjustments.merged().get("item-7"), Some(&-2));
        assert!(effects.contains(&RuntimeEffect::FlushWrites));
        assert!(effects.contains(&RuntimeEffect::PersistLayout));
    }

    #[test]
    fn closing_the_active_window_leaves_no_active_window() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        open(&mut state, &mut interaction, AppKind::TradeEdit);
        let b = open(&mut state, &mut interaction, AppKind::PartnerLedger);

        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::Close { window_id: b },
        )
        .expect("close");

        assert_eq!(state.active_window_id, None);
    }

    #[test]
    fn close_of_unknown_window_is_an_error() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        let result = reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::Close {
                window_id: WindowId(41),
            },
        );
        assert_eq!(result, Err(RegistryError::WindowNotFound));
    }

    #[test]
    fn home_launch_closes_every_window_and_flushes() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        let a = open(&mut state, &mut interaction, AppKind::TradeEdit);
        open(&mut state, &mut interaction, AppKind::PartnerLedger);
        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::ReportAdjustments {
                window_id: a,
                deltas: AdjustmentMap::from([("item-1".to_string(), 4)]),
            },
        )
        .expect("report");

        let effects = launch(
            &mut state,
            &mut interaction,
            LaunchRequest::new(AppKind::Home, Viewport::default()),
        );

        assert!(state.windows.is_empty());
        assert_eq!(state.active_window_id, None);
        assert!(state.adjustments.is_empty());
        assert!(effects.contains(&RuntimeEffect::FlushWrites));
    }

    #[test]
    fn single_policy_reuses_existing_window_and_restamps_activation() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::SetInstancePolicy {
                policy: InstancePolicy::Single,
            },
        )
        .expect("policy");

        launch(
            &mut state,
            &mut interaction,
            LaunchRequest::new(AppKind::TradeEdit, Viewport::default())
                .with_props(json!({ "trade_id": 100, "mode": "edit" })),
        );
        let first_stamp = state.windows[0].props[ACTIVATED_AT_PROP].clone();

        launch(
            &mut state,
            &mut interaction,
            LaunchRequest::new(AppKind::TradeEdit, Viewport::default())
                .with_props(json!({ "trade_id": 205 })),
        );

        assert_eq!(state.windows.len(), 1);
        let window = &state.windows[0];
        // Incoming keys overwrite; untouched keys survive the merge.
        assert_eq!(window.props["trade_id"], json!(205));
        assert_eq!(window.props["mode"], json!("edit"));
        assert_ne!(window.props[ACTIVATED_AT_PROP], first_stamp);
        assert_eq!(state.active_window_id, Some(window.id));
    }

    #[test]
    fn settings_stays_single_instance_under_multi_policy() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        open(&mut state, &mut interaction, AppKind::Settings);
        launch(
            &mut state,
            &mut interaction,
            LaunchRequest::new(AppKind::Settings, Viewport::default()),
        );

        assert_eq!(state.instance_policy, InstancePolicy::Multi);
        assert_eq!(state.windows.len(), 1);
    }

    #[test]
    fn policy_flip_leaves_existing_duplicates_open() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        open(&mut state, &mut interaction, AppKind::TradeEdit);
        open(&mut state, &mut interaction, AppKind::TradeEdit);

        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::SetInstancePolicy {
                policy: InstancePolicy::Single,
            },
        )
        .expect("policy");

        assert_eq!(state.windows.len(), 2);
        // The next launch reuses instead of opening a third.
        launch(
            &mut state,
            &mut interaction,
            LaunchRequest::new(AppKind::TradeEdit, Viewport::default()),
        );
        assert_eq!(state.windows.len(), 2);
    }

    #[test]
    fn denied_launch_notifies_and_leaves_state_untouched() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        let gate = StaticPermissionSet::new().allow(AppKind::TradeEdit, PermissionAction::Read);
        let env = DeskEnv { permissions: &gate };

        let effects = reduce_desk(
            &mut state,
            &mut interaction,
            &env,
            DeskAction::Launch(LaunchRequest::new(
                AppKind::PartnerLedger,
                Viewport::default(),
            )),
        )
        .expect("denied launch still succeeds");

        assert!(state.windows.is_empty());
        assert_eq!(state.next_window_id, 1);
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], RuntimeEffect::Notify { .. }));
    }

    #[test]
    fn quick_view_opens_beside_origin_with_matched_height() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        let origin = open(&mut state, &mut interaction, AppKind::TradeEdit);
        let origin_record = state.window(origin).expect("origin").clone();

        launch(
            &mut state,
            &mut interaction,
            LaunchRequest::new(AppKind::InventoryQuick, Viewport::default()).with_origin(origin),
        );

        let quick = state.windows.last().expect("quick view");
        assert_eq!(
            quick.position.x,
            origin_record.position.x + 720 + SIDECAR_GAP_PX
        );
        assert_eq!(quick.position.y, origin_record.position.y);
        assert_eq!(quick.size.width, Some(360));
        assert_eq!(quick.size.height, Some(540));
    }

    #[test]
    fn quick_view_clamps_to_the_right_viewport_edge() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        let viewport = Viewport::new(900, 800);

        let origin = open(&mut state, &mut interaction, AppKind::TradeEdit);
        launch(
            &mut state,
            &mut interaction,
            LaunchRequest::new(AppKind::InventoryQuick, viewport).with_origin(origin),
        );

        let quick = state.windows.last().expect("quick view");
        assert_eq!(quick.position.x, 900 - 360);
    }

    #[test]
    fn compact_launch_replaces_open_windows_with_one_full_desk_window() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        let compact = Viewport::new(600, 900);

        open(&mut state, &mut interaction, AppKind::TradeEdit);
        open(&mut state, &mut interaction, AppKind::PartnerLedger);

        launch(
            &mut state,
            &mut interaction,
            LaunchRequest::new(AppKind::InventoryBrowse, compact),
        );

        assert_eq!(state.windows.len(), 1);
        let window = &state.windows[0];
        assert_eq!(window.app, AppKind::InventoryBrowse);
        assert_eq!(window.position, PanelPoint::new(0, NAV_CHROME_HEIGHT_PX));
        assert_eq!(window.size, PanelSize::px(600, compact.desk_height()));
    }

    #[test]
    fn persisted_geometry_beats_the_cascade() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        state.per_app_geometry.insert(
            AppKind::PartnerLedger,
            PanelGeometry {
                position: PanelPoint::new(300, 200),
                size: PanelSize::px(640, 480),
            },
        );

        open(&mut state, &mut interaction, AppKind::PartnerLedger);

        let window = state.windows.last().expect("window");
        assert_eq!(window.position, PanelPoint::new(300, 200));
        assert_eq!(window.size, PanelSize::px(640, 480));
    }

    #[test]
    fn reset_geometry_forgets_override_and_recascades() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        state.per_app_geometry.insert(
            AppKind::PartnerLedger,
            PanelGeometry {
                position: PanelPoint::new(300, 200),
                size: PanelSize::px(640, 480),
            },
        );
        let id = open(&mut state, &mut interaction, AppKind::PartnerLedger);

        let effects = reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::ResetGeometry { window_id: id },
        )
        .expect("reset");

        assert!(!state.per_app_geometry.contains_key(&AppKind::PartnerLedger));
        let window = state.window(id).expect("window");
        assert_eq!(
            window.position,
            PanelPoint::new(CASCADE_BASE_X + CASCADE_STEP_PX, CASCADE_BASE_Y + CASCADE_STEP_PX)
        );
        assert_eq!(window.size, PanelSize::px(680, 500));
        assert!(effects.contains(&RuntimeEffect::DropGeometry(AppKind::PartnerLedger)));
    }

    #[test]
    fn drag_clamps_top_edge_to_exactly_the_chrome_height() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, AppKind::TradeEdit);
        let start = state.window(id).expect("window").position;

        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::BeginMove {
                window_id: id,
                pointer: PointerPosition::new(400, 300),
                anchor: PanelRect::new(start.x, start.y, 720, 540),
            },
        )
        .expect("begin");
        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::UpdateMove {
                pointer: PointerPosition::new(420, -500),
                viewport: Viewport::default(),
            },
        )
        .expect("update");

        let window = state.window(id).expect("window");
        assert_eq!(window.position.y, NAV_CHROME_HEIGHT_PX);
        assert_eq!(window.position.x, start.x + 20);
    }

    #[test]
    fn end_move_records_geometry_override_for_the_kind() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, AppKind::TradeEdit);
        let start = state.window(id).expect("window").position;

        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::BeginMove {
                window_id: id,
                pointer: PointerPosition::new(100, 200),
                anchor: PanelRect::new(start.x, start.y, 720, 540),
            },
        )
        .expect("begin");
        let effects = reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::EndMove {
                pointer: PointerPosition::new(160, 250),
                viewport: Viewport::default(),
            },
        )
        .expect("end");

        assert_eq!(interaction.drag, None);
        let stored = state
            .per_app_geometry
            .get(&AppKind::TradeEdit)
            .expect("override");
        assert_eq!(stored.position, PanelPoint::new(start.x + 60, start.y + 50));
        assert!(effects.contains(&RuntimeEffect::PersistGeometry(AppKind::TradeEdit)));
        assert!(effects.contains(&RuntimeEffect::PersistLayout));
    }

    #[test]
    fn drag_update_after_window_vanishes_clears_session_without_error() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, AppKind::TradeEdit);

        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::BeginMove {
                window_id: id,
                pointer: PointerPosition::new(100, 200),
                anchor: PanelRect::new(32, 64, 720, 540),
            },
        )
        .expect("begin");
        state.windows.clear();

        let effects = reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::UpdateMove {
                pointer: PointerPosition::new(120, 220),
                viewport: Viewport::default(),
            },
        )
        .expect("stale update is not an error");

        assert_eq!(interaction.drag, None);
        assert!(effects.is_empty());
    }

    #[test]
    fn first_drag_of_daily_summary_latches_the_measured_rect() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, AppKind::DailySummary);
        assert!(state.window(id).expect("window").is_stylesheet_positioned());

        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::BeginMove {
                window_id: id,
                pointer: PointerPosition::new(500, 300),
                anchor: PanelRect::new(380, 180, 520, 430),
            },
        )
        .expect("begin");

        let window = state.window(id).expect("window");
        assert!(window.latched);
        assert_eq!(window.position, PanelPoint::new(380, 180));
        assert!(!window.is_stylesheet_positioned());
    }

    #[test]
    fn resize_floors_at_minimum_dimensions_and_persists() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, AppKind::PartnerLedger);

        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::BeginResize {
                window_id: id,
                pointer: PointerPosition::new(700, 550),
                width: 680,
                height: 500,
            },
        )
        .expect("begin");
        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::UpdateResize {
                pointer: PointerPosition::new(0, 0),
            },
        )
        .expect("update");
        assert_eq!(
            state.window(id).expect("window").size,
            PanelSize::px(MIN_PANEL_WIDTH, MIN_PANEL_HEIGHT)
        );

        let effects = reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::EndResize {
                pointer: PointerPosition::new(760, 580),
            },
        )
        .expect("end");
        assert_eq!(interaction.resize, None);
        assert_eq!(
            state.window(id).expect("window").size,
            PanelSize::px(740, 530)
        );
        assert!(effects.contains(&RuntimeEffect::PersistGeometry(AppKind::PartnerLedger)));
    }

    #[test]
    fn dirty_marker_schedules_no_write() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        let id = open(&mut state, &mut interaction, AppKind::TradeEdit);

        let effects = reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::SetDirty {
                window_id: id,
                dirty: true,
            },
        )
        .expect("set dirty");

        assert!(state.window(id).expect("window").dirty);
        assert!(effects.is_empty());
    }

    #[test]
    fn adjustment_report_for_a_closed_window_is_dropped() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();

        let effects = reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::ReportAdjustments {
                window_id: WindowId(9),
                deltas: AdjustmentMap::from([("item-1".to_string(), 2)]),
            },
        )
        .expect("stale report is not an error");

        assert!(state.adjustments.is_empty());
        assert!(effects.is_empty());
    }

    #[test]
    fn hydration_restores_windows_then_unlocks_writes() {
        let mut state = DeskState::default();
        let mut interaction = InteractionState::default();
        let mut donor = DeskState::default();
        let mut donor_interaction = InteractionState::default();
        open(&mut donor, &mut donor_interaction, AppKind::TradeEdit);
        open(&mut donor, &mut donor_interaction, AppKind::Settings);

        let effects = reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::HydrateSnapshot {
                snapshot: donor.snapshot(),
                per_app_geometry: BTreeMap::new(),
            },
        )
        .expect("hydrate");
        assert!(effects.is_empty());
        assert_eq!(state.windows.len(), 2);
        assert!(!state.hydrated);

        reduce_desk(
            &mut state,
            &mut interaction,
            &test_env(),
            DeskAction::BootHydrationComplete,
        )
        .expect("complete");
        assert!(state.hydrated);
        // Ids handed out after hydration never collide with restored ones.
        assert_eq!(state.next_window_id, donor.next_window_id);
    }
}
