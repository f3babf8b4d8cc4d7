//! Desk shell UI composition and interaction surfaces.

mod taskbar;
mod window;

use leptos::*;

use self::{taskbar::Taskbar, window::PanelWindow};

use crate::{
    model::{PointerPosition, Viewport, WindowId, WindowRecord},
    reducer::DeskAction,
};

pub use crate::runtime_context::{use_desk_runtime, DeskProvider, DeskRuntimeContext};

/// Target and anchor of the taskbar entry context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TaskbarMenuState {
    window_id: WindowId,
    x: i32,
    y: i32,
}

#[component]
/// Renders the full desk shell: the window layer, the taskbar, and the
/// shell-level pointer tracking that feeds drag and resize sessions.
pub fn DeskShell() -> impl IntoView {
    let runtime = use_desk_runtime();
    let state = runtime.state;
    let viewport = create_rw_signal(runtime.host.get_value().viewport());

    let resize_listener = window_event_listener(ev::resize, move |_| {
        viewport.set(runtime.host.get_value().viewport());
    });
    on_cleanup(move || resize_listener.remove());

    // Text selection fights pointer tracking; a body-level class lets the
    // stylesheet suspend it while a drag or resize is live.
    create_effect(move |_| {
        set_body_dragging_class(runtime.interaction.get().is_tracking());
    });

    on_cleanup(move || {
        runtime.host.get_value().flush_pending_writes(runtime);
    });

    let on_pointer_move = move |ev: web_sys::PointerEvent| {
        let pointer = pointer_from_pointer_event(&ev);
        let interaction = runtime.interaction.get_untracked();

        if interaction.drag.is_some() {
            runtime.dispatch_action(DeskAction::UpdateMove {
                pointer,
                viewport: viewport.get_untracked(),
            });
        }
        if interaction.resize.is_some() {
            runtime.dispatch_action(DeskAction::UpdateResize { pointer });
        }
    };
    let on_pointer_end = move |ev: web_sys::PointerEvent| {
        let pointer = pointer_from_pointer_event(&ev);
        let interaction = runtime.interaction.get_untracked();

        if interaction.drag.is_some() {
            runtime.dispatch_action(DeskAction::EndMove {
                pointer,
                viewport: viewport.get_untracked(),
            });
        }
        if interaction.resize.is_some() {
            runtime.dispatch_action(DeskAction::EndResize { pointer });
        }
    };

    view! {
        <div
            class="desk-shell"
            class:compact=move || viewport.get().is_compact()
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_end
            on:pointercancel=on_pointer_end
        >
            <div class="desk-window-layer">
                <For
                    each=move || state.get().windows
                    key=|win| win.id.0
                    let:win
                >
                    <PanelWindow window_id=win.id />
                </For>
            </div>

            <Taskbar />
        </div>
    }
}

fn stop_mouse_event(ev: &web_sys::MouseEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> PointerPosition {
    PointerPosition {
        x: ev.client_x(),
        y: ev.client_y(),
    }
}

fn open_taskbar_entry_menu(
    viewport: Viewport,
    menu: RwSignal<Option<TaskbarMenuState>>,
    window_id: WindowId,
    x: i32,
    y: i32,
) {
    let (x, y) = clamp_taskbar_menu_position(viewport, x, y, 220, 150);
    menu.set(Some(TaskbarMenuState { window_id, x, y }));
}

fn clamp_taskbar_menu_position(
    viewport: Viewport,
    x: i32,
    y: i32,
    popup_w: i32,
    popup_h: i32,
) -> (i32, i32) {
    let max_x = (viewport.width - popup_w - 6).max(6);
    let max_y = (viewport.height - popup_h - 6).max(6);
    (x.clamp(6, max_x), y.clamp(6, max_y))
}

fn taskbar_entry_class(active: bool, minimized: bool) -> String {
    let active_class = if active && !minimized { " active" } else { "" };
    let minimized_class = if minimized { " minimized" } else { "" };
    format!("taskbar-entry{active_class}{minimized_class}")
}

fn taskbar_entry_label(win: &WindowRecord, active: bool) -> String {
    let mut parts = vec![win.title.clone()];
    if active && !win.minimized {
        parts.push("active".to_string());
    }
    if win.minimized {
        parts.push("minimized".to_string());
    }
    parts.join(", ")
}

#[cfg(target_arch = "wasm32")]
fn set_body_dragging_class(active: bool) {
    let Some(body) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
    else {
        return;
    };

    let class_list = body.class_list();
    let _ = if active {
        class_list.add_1("desk-dragging")
    } else {
        class_list.remove_1("desk-dragging")
    };
}

#[cfg(not(target_arch = "wasm32"))]
fn set_body_dragging_class(_: bool) {}
