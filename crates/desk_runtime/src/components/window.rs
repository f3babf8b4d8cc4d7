use serde_json::Value;

use super::*;
use crate::model::{DragMode, LaunchRequest, PanelPoint, PanelRect};
use panel_contract::{
    panel_id_for, PanelCommand, PanelHandle, PanelMountContext, ACTIVATED_AT_PROP,
};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
fn try_set_pointer_capture(ev: &web_sys::PointerEvent) {
    if let Some(target) = ev.current_target() {
        if let Ok(element) = target.dyn_into::<web_sys::Element>() {
            let _ = element.set_pointer_capture(ev.pointer_id());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn try_set_pointer_capture(_: &web_sys::PointerEvent) {}

/// Whether the event originates on an interactive child control. Those keep
/// their normal click behavior instead of starting a drag.
#[cfg(target_arch = "wasm32")]
fn is_interactive_target(ev: &web_sys::PointerEvent) -> bool {
    let Some(target) = ev.target() else {
        return false;
    };
    let Ok(element) = target.dyn_into::<web_sys::Element>() else {
        return false;
    };
    element
        .closest("button, input, select, textarea, a")
        .ok()
        .flatten()
        .is_some()
}

#[cfg(not(target_arch = "wasm32"))]
fn is_interactive_target(_: &web_sys::PointerEvent) -> bool {
    false
}

/// Measured on-screen rect of the window element, in client coordinates.
///
/// The desk layer sits at the page origin, so client coordinates double as
/// desk coordinates. Centered and auto-sized windows get concrete numbers
/// only through this measurement.
#[cfg(target_arch = "wasm32")]
fn measured_panel_rect(node: &NodeRef<html::Section>) -> Option<PanelRect> {
    let element = node.get_untracked()?;
    let rect = element.get_bounding_client_rect();
    Some(PanelRect::new(
        rect.x() as i32,
        rect.y() as i32,
        rect.width() as i32,
        rect.height() as i32,
    ))
}

#[cfg(not(target_arch = "wasm32"))]
fn measured_panel_rect(_: &NodeRef<html::Section>) -> Option<PanelRect> {
    None
}

fn panel_window_class(win: &WindowRecord, active: bool) -> String {
    let centered_class = if matches!(win.drag_mode, DragMode::TransformOffset)
        || win.is_stylesheet_positioned()
    {
        " centered"
    } else {
        ""
    };
    let active_class = if active && !win.minimized {
        " active"
    } else {
        ""
    };
    let minimized_class = if win.minimized { " minimized" } else { "" };
    format!("desk-window{centered_class}{active_class}{minimized_class}")
}

fn panel_window_style(win: &WindowRecord) -> String {
    let mut style = String::new();

    match win.drag_mode {
        DragMode::TransformOffset => {
            if win.position != PanelPoint::default() {
                style.push_str(&format!(
                    "transform:translate({}px,{}px);",
                    win.position.x, win.position.y
                ));
            }
        }
        // Unlatched windows stay wherever the stylesheet centers them.
        DragMode::AbsoluteLatch if !win.latched => {}
        _ => {
            style.push_str(&format!(
                "left:{}px;top:{}px;",
                win.position.x, win.position.y
            ));
        }
    }

    if let Some(width) = win.size.width {
        style.push_str(&format!("width:{width}px;"));
    }
    if let Some(height) = win.size.height {
        style.push_str(&format!("height:{height}px;"));
    }
    style.push_str(&format!("z-index:{};", win.z_index));
    style
}

#[component]
pub(super) fn PanelWindow(window_id: WindowId) -> impl IntoView {
    let runtime = use_desk_runtime();
    let state = runtime.state;
    let panel_ref = create_node_ref::<html::Section>();

    let window = Signal::derive(move || {
        state.get().windows.into_iter().find(|w| w.id == window_id)
    });

    let focus = move |_| {
        let desk = state.get_untracked();
        let should_raise = desk
            .window(window_id)
            .map(|w| desk.active_window_id != Some(window_id) || w.minimized)
            .unwrap_or(false);
        if should_raise {
            runtime.dispatch_action(DeskAction::BringToFront { window_id });
        }
    };
    let minimize = move |_| runtime.dispatch_action(DeskAction::Minimize { window_id });
    let close = move |_| runtime.dispatch_action(DeskAction::Close { window_id });

    let begin_move = move |ev: web_sys::PointerEvent| {
        if ev.pointer_type() == "mouse" && ev.button() != 0 {
            return;
        }
        if ev.pointer_type() != "mouse" && !ev.is_primary() {
            return;
        }
        if is_interactive_target(&ev) {
            return;
        }
        try_set_pointer_capture(&ev);
        if ev.button() != 0 {
            return;
        }
        ev.prevent_default();
        ev.stop_propagation();
        let Some(anchor) = measured_panel_rect(&panel_ref) else {
            return;
        };
        runtime.dispatch_action(DeskAction::BeginMove {
            window_id,
            pointer: pointer_from_pointer_event(&ev),
            anchor,
        });
    };
    let begin_resize = move |ev: web_sys::PointerEvent| {
        if ev.pointer_type() == "mouse" && ev.button() != 0 {
            return;
        }
        if ev.pointer_type() != "mouse" && !ev.is_primary() {
            return;
        }
        try_set_pointer_capture(&ev);
        ev.prevent_default();
        ev.stop_propagation();
        let Some(rect) = measured_panel_rect(&panel_ref) else {
            return;
        };
        runtime.dispatch_action(DeskAction::BeginResize {
            window_id,
            pointer: pointer_from_pointer_event(&ev),
            width: rect.width,
            height: rect.height,
        });
    };

    // The section itself stays mounted for the window's whole lifetime;
    // geometry and stacking flow through reactive attributes so panel-local
    // state survives drags, resizes, and minimize cycles.
    view! {
        <section
            node_ref=panel_ref
            class=move || {
                let desk = state.get();
                let active = desk.active_window_id == Some(window_id);
                desk.window(window_id)
                    .map(|win| panel_window_class(win, active))
                    .unwrap_or_else(|| "desk-window".to_string())
            }
            style=move || {
                window
                    .get()
                    .map(|win| panel_window_style(&win))
                    .unwrap_or_default()
            }
            role="dialog"
            aria-label=move || window.get().map(|win| win.title).unwrap_or_default()
            on:pointerdown=focus
        >
            <header class="desk-titlebar" on:pointerdown=begin_move>
                <div class="desk-titlebar-title">
                    <span class="desk-titlebar-icon" aria-hidden="true">
                        {move || window.get().map(|win| win.icon).unwrap_or_default()}
                    </span>
                    <span>{move || window.get().map(|win| win.title).unwrap_or_default()}</span>
                    <Show
                        when=move || window.get().map(|win| win.dirty).unwrap_or(false)
                        fallback=|| ()
                    >
                        <span class="desk-dirty-dot" title="Unsaved changes">"\u{25CF}"</span>
                    </Show>
                </div>
                <div class="desk-titlebar-controls">
                    <button
                        aria-label="Minimize window"
                        on:pointerdown=move |ev: web_sys::PointerEvent| {
                            ev.prevent_default();
                            ev.stop_propagation();
                        }
                        on:mousedown=move |ev| stop_mouse_event(&ev)
                        on:click=move |ev| {
                            stop_mouse_event(&ev);
                            minimize(ev);
                        }
                    >
                        "\u{2212}"
                    </button>
                    <button
                        aria-label="Close window"
                        on:pointerdown=move |ev: web_sys::PointerEvent| {
                            ev.prevent_default();
                            ev.stop_propagation();
                        }
                        on:mousedown=move |ev| stop_mouse_event(&ev)
                        on:click=move |ev| {
                            stop_mouse_event(&ev);
                            close(ev);
                        }
                    >
                        "\u{00D7}"
                    </button>
                </div>
            </header>
            <div class="desk-window-body">
                <PanelBody window_id=window_id />
            </div>
            <div
                class="desk-resize-handle"
                aria-hidden="true"
                on:pointerdown=begin_resize
            />
        </section>
    }
}

#[component]
fn PanelBody(window_id: WindowId) -> impl IntoView {
    let runtime = use_desk_runtime();
    let state = runtime.state;
    let merged_adjustments = Signal::derive(move || state.get().adjustments.merged());
    let command_sender = Callback::new(move |command| {
        apply_panel_command(runtime, window_id, command);
    });
    let handle = PanelHandle::new(command_sender);

    // Only a launch restamps the activation marker, so the panel remounts
    // exactly when a re-activation merges fresh props into it. Geometry,
    // stacking, and the panel's own prop patches never reach this closure.
    let activation = create_memo(move |_| {
        state
            .get()
            .window(window_id)
            .and_then(|w| w.props.get(ACTIVATED_AT_PROP))
            .and_then(Value::as_u64)
    });

    view! {
        <div class="desk-window-body-content">
            {move || {
                activation.get();
                let registry = runtime.host.get_value().panel_registry();
                state
                    .get_untracked()
                    .windows
                    .into_iter()
                    .find(|w| w.id == window_id)
                    .map(|w| {
                        registry.mount(PanelMountContext {
                            app: w.app,
                            window_id: w.id.0,
                            panel_id: panel_id_for(w.id.0),
                            windowed: true,
                            props: w.props,
                            adjustments: merged_adjustments,
                            handle,
                        })
                    })
                    .unwrap_or_else(|| view! { <p>"Closed"</p> }.into_view())
            }}
        </div>
    }
}

fn apply_panel_command(runtime: DeskRuntimeContext, window_id: WindowId, command: PanelCommand) {
    match command {
        PanelCommand::Close => runtime.dispatch_action(DeskAction::Close { window_id }),
        PanelCommand::SetDirty(dirty) => {
            runtime.dispatch_action(DeskAction::SetDirty { window_id, dirty });
        }
        PanelCommand::UpdateProps(patch) => {
            runtime.dispatch_action(DeskAction::UpdateProps { window_id, patch });
        }
        PanelCommand::ReportAdjustments(deltas) => {
            runtime.dispatch_action(DeskAction::ReportAdjustments { window_id, deltas });
        }
        PanelCommand::ClearAdjustments => {
            runtime.dispatch_action(DeskAction::ClearAdjustments { window_id });
        }
        PanelCommand::Launch { app, props, sidecar } => {
            let viewport = runtime.host.get_value().viewport();
            let mut request = LaunchRequest::new(app, viewport).with_props(props);
            if sidecar {
                request = request.with_origin(window_id);
            }
            runtime.dispatch_action(DeskAction::Launch(request));
        }
    }
}
