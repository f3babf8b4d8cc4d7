//! Reducer helpers for application launch, re-activation, and placement.

use serde_json::{json, Value};

use panel_contract::{PermissionAction, ACTIVATED_AT_PROP};
use platform_host::next_monotonic_timestamp_ms;

use crate::catalog::{self, AppDescriptor};
use crate::model::{
    DeskState, DragMode, InstancePolicy, LaunchRequest, PanelGeometry, PanelPoint, PanelSize,
    Viewport, WindowId, WindowRecord, CASCADE_BASE_X, CASCADE_BASE_Y, CASCADE_SLOTS,
    CASCADE_STEP_PX, NAV_CHROME_HEIGHT_PX, SIDECAR_GAP_PX,
};
use crate::reducer::{
    bring_to_front_internal, close_all_internal, DeskEnv, RegistryError, RuntimeEffect,
};

pub(super) fn reduce_launch(
    state: &mut DeskState,
    env: &DeskEnv<'_>,
    request: LaunchRequest,
    effects: &mut Vec<RuntimeEffect>,
) -> Result<(), RegistryError> {
    if request.app.is_home() {
        // Navigating home dismisses the whole working set.
        close_all_internal(state, effects);
        return Ok(());
    }
    let Some(descriptor) = catalog::descriptor(request.app) else {
        return Ok(());
    };
    if !env
        .permissions
        .has_permission(request.app, PermissionAction::Read)
    {
        effects.push(RuntimeEffect::Notify {
            title: "Not available".to_string(),
            body: format!("You do not have access to {}.", descriptor.title),
        });
        return Ok(());
    }

    let single =
        descriptor.always_single_instance || state.instance_policy == InstancePolicy::Single;
    if single {
        if let Some(existing) = state.window_of_app(request.app).map(|w| w.id) {
            reactivate_existing(state, descriptor, existing, request, effects)?;
            return Ok(());
        }
    }

    create_window(state, descriptor, request, effects);
    Ok(())
}

/// Re-activation path for single-instance launches: merge the incoming
/// props, restamp the activation marker, recompute companion placement,
/// and raise the window.
fn reactivate_existing(
    state: &mut DeskState,
    descriptor: &AppDescriptor,
    window_id: WindowId,
    request: LaunchRequest,
    effects: &mut Vec<RuntimeEffect>,
) -> Result<(), RegistryError> {
    let origin_geometry = request
        .origin
        .and_then(|id| state.window(id))
        .map(|w| w.geometry());

    if let Some(window) = state.window_mut(window_id) {
        merge_props(&mut window.props, request.props);
        stamp_activation(&mut window.props);
        if let Some(origin) = origin_geometry {
            if descriptor.match_origin_height {
                window.size.height = Some(origin.size.height_or_default());
            }
            let width = window
                .size
                .width
                .unwrap_or_else(|| descriptor.default_size.width_or_default());
            window.position = sidecar_position(origin, width, request.viewport);
        }
    }

    let _ = bring_to_front_internal(state, window_id)?;
    effects.push(RuntimeEffect::PersistLayout);
    Ok(())
}

fn create_window(
    state: &mut DeskState,
    descriptor: &AppDescriptor,
    request: LaunchRequest,
    effects: &mut Vec<RuntimeEffect>,
) {
    let compact = request.viewport.is_compact();
    let (position, size, latched) = placement_for(state, descriptor, &request, compact);
    if compact {
        // Compact mode runs single-window: the new window replaces
        // everything that was open.
        close_all_internal(state, effects);
    }

    let mut props = request.props;
    stamp_activation(&mut props);

    let id = state.alloc_window_id();
    let z = state.alloc_z_index();
    state.windows.push(WindowRecord {
        id,
        app: descriptor.app,
        z_index: z,
        position,
        size,
        title: catalog::window_title(descriptor),
        icon: descriptor.icon.to_string(),
        minimized: false,
        dirty: false,
        drag_mode: descriptor.drag_mode,
        latched,
        props,
    });
    state.active_window_id = Some(id);
    effects.push(RuntimeEffect::PersistLayout);
}

/// Resolves the geometry a fresh window opens with. Returns the position,
/// the size, and whether the position already holds absolute desk
/// coordinates.
fn placement_for(
    state: &DeskState,
    descriptor: &AppDescriptor,
    request: &LaunchRequest,
    compact: bool,
) -> (PanelPoint, PanelSize, bool) {
    if compact {
        return (
            PanelPoint::new(0, NAV_CHROME_HEIGHT_PX),
            PanelSize::px(request.viewport.width, request.viewport.desk_height()),
            true,
        );
    }

    let persisted = state.per_app_geometry.get(&descriptor.app).copied();
    match descriptor.drag_mode {
        DragMode::TransformOffset => {
            // The stored position is a translate offset from the
            // stylesheet-centered spot, not a desk coordinate.
            match persisted {
                Some(geometry) => (geometry.position, geometry.size, false),
                None => (PanelPoint::default(), descriptor.default_size, false),
            }
        }
        DragMode::AbsoluteLatch => match persisted {
            Some(geometry) => (geometry.position, geometry.size, true),
            None => (PanelPoint::default(), descriptor.default_size, false),
        },
        DragMode::Absolute => {
            let origin = request
                .origin
                .and_then(|id| state.window(id))
                .map(|w| w.geometry());
            if let Some(origin) = origin {
                let mut size = persisted.map(|g| g.size).unwrap_or(descriptor.default_size);
                if descriptor.match_origin_height {
                    size.height = Some(origin.size.height_or_default());
                }
                let position = sidecar_position(origin, size.width_or_default(), request.viewport);
                (position, size, true)
            } else if let Some(geometry) = persisted {
                (geometry.position, geometry.size, true)
            } else {
                (
                    cascade_position(state.windows.len()),
                    descriptor.default_size,
                    true,
                )
            }
        }
    }
}

/// Position immediately to the right of the origin window, pulled back in
/// when it would overflow the viewport's right edge.
fn sidecar_position(origin: PanelGeometry, width: i32, viewport: Viewport) -> PanelPoint {
    let x = origin.position.x + origin.size.width_or_default() + SIDECAR_GAP_PX;
    let max_x = (viewport.width - width).max(0);
    PanelPoint::new(x.clamp(0, max_x), origin.position.y)
}

/// Diagonal cascade slot seeded by how many windows are already open.
pub(super) fn cascade_position(open_windows: usize) -> PanelPoint {
    let slot = (open_windows % CASCADE_SLOTS) as i32;
    PanelPoint::new(
        CASCADE_BASE_X + slot * CASCADE_STEP_PX,
        CASCADE_BASE_Y + slot * CASCADE_STEP_PX,
    )
}

/// Shallow merge: incoming keys overwrite, everything else survives. A
/// null patch is a no-op; a non-object patch replaces outright.
pub(super) fn merge_props(target: &mut Value, patch: Value) {
    match patch {
        Value::Null => {}
        Value::Object(incoming) => {
            if let Value::Object(existing) = target {
                for (key, value) in incoming {
                    existing.insert(key, value);
                }
            } else {
                *target = Value::Object(incoming);
            }
        }
        other => *target = other,
    }
}

fn stamp_activation(props: &mut Value) {
    let stamp = json!(next_monotonic_timestamp_ms());
    if let Value::Object(map) = props {
        map.insert(ACTIVATED_AT_PROP.to_string(), stamp);
    } else {
        *props = json!({ ACTIVATED_AT_PROP: stamp });
    }
}
