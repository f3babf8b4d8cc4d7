use super::*;
use crate::{
    catalog,
    model::{InstancePolicy, LaunchRequest},
};
use panel_contract::AppKind;

#[component]
pub(super) fn Taskbar() -> impl IntoView {
    let runtime = use_desk_runtime();
    let state = runtime.state;
    let window_menu = create_rw_signal(None::<TaskbarMenuState>);

    // The taskbar stops mousedown propagation below, so reaching the window
    // listener means the click landed outside it and outside the menu.
    let outside_click_listener = window_event_listener(ev::mousedown, move |_| {
        if window_menu.get_untracked().is_some() {
            window_menu.set(None);
        }
    });
    on_cleanup(move || outside_click_listener.remove());

    let escape_listener = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() || ev.key() != "Escape" {
            return;
        }
        if window_menu.get_untracked().is_some() {
            ev.prevent_default();
            ev.stop_propagation();
            window_menu.set(None);
        }
    });
    on_cleanup(move || escape_listener.remove());

    create_effect(move |_| {
        let desk = state.get();
        window_menu.update(|menu| {
            if let Some(current) = *menu {
                if desk.windows.iter().all(|win| win.id != current.window_id) {
                    *menu = None;
                }
            }
        });
    });

    let launch = move |app: AppKind| {
        window_menu.set(None);
        let viewport = runtime.host.get_value().viewport();
        runtime.dispatch_action(DeskAction::Launch(LaunchRequest::new(app, viewport)));
    };

    view! {
        <footer
            class="taskbar"
            role="toolbar"
            aria-label="Desk taskbar"
            on:mousedown=move |ev| ev.stop_propagation()
        >
            <button
                class="taskbar-home-button"
                aria-label="Close all windows and return home"
                on:click=move |_| launch(AppKind::Home)
            >
                "Home"
            </button>

            <div class="taskbar-launchers" role="group" aria-label="Applications">
                <For
                    each={move || catalog::launcher_apps().collect::<Vec<_>>()}
                    key=|descriptor| descriptor.app.code()
                    let:descriptor
                >
                    <button
                        class="taskbar-launcher-button"
                        title=descriptor.title
                        aria-label=format!("Open {}", descriptor.title)
                        on:click=move |_| launch(descriptor.app)
                    >
                        <span class="taskbar-app-icon" aria-hidden="true">{descriptor.icon}</span>
                        <span class="visually-hidden">{descriptor.title}</span>
                    </button>
                </For>
            </div>

            <div class="taskbar-running-strip" role="group" aria-label="Open windows">
                <For
                    each=move || state.get().windows
                    key=|win| win.id.0
                    let:win
                >
                    {{
                        let win_id = win.id;
                        let entry_icon = win.icon.clone();
                        view! {
                            <button
                                class=move || {
                                    let desk = state.get();
                                    let active = desk.active_window_id == Some(win_id);
                                    let minimized = desk
                                        .window(win_id)
                                        .map(|w| w.minimized)
                                        .unwrap_or(false);
                                    taskbar_entry_class(active, minimized)
                                }
                                aria-pressed=move || {
                                    let desk = state.get();
                                    desk.active_window_id == Some(win_id)
                                        && !desk
                                            .window(win_id)
                                            .map(|w| w.minimized)
                                            .unwrap_or(false)
                                }
                                aria-label=move || {
                                    let desk = state.get();
                                    let active = desk.active_window_id == Some(win_id);
                                    desk.window(win_id)
                                        .map(|w| taskbar_entry_label(w, active))
                                        .unwrap_or_default()
                                }
                                title=move || {
                                    let desk = state.get();
                                    let active = desk.active_window_id == Some(win_id);
                                    desk.window(win_id)
                                        .map(|w| taskbar_entry_label(w, active))
                                        .unwrap_or_default()
                                }
                                on:click=move |_| {
                                    window_menu.set(None);
                                    runtime.dispatch_action(DeskAction::ToggleTaskbar {
                                        window_id: win_id,
                                    });
                                }
                                on:contextmenu=move |ev| {
                                    ev.prevent_default();
                                    ev.stop_propagation();
                                    open_taskbar_entry_menu(
                                        runtime.host.get_value().viewport(),
                                        window_menu,
                                        win_id,
                                        ev.client_x(),
                                        ev.client_y(),
                                    );
                                }
                            >
                                <span class="taskbar-app-icon" aria-hidden="true">
                                    {entry_icon}
                                </span>
                                <span class="taskbar-entry-label">{win.title.clone()}</span>
                            </button>
                        }
                    }}
                </For>
            </div>

            <button
                class="taskbar-policy-toggle"
                aria-pressed=move || state.get().instance_policy == InstancePolicy::Single
                title=move || match state.get().instance_policy {
                    InstancePolicy::Single => {
                        "Single-instance: launching focuses the existing window"
                    }
                    InstancePolicy::Multi => "Multi-instance: launching opens a new window",
                }
                on:click=move |_| {
                    window_menu.set(None);
                    let next = match state.get_untracked().instance_policy {
                        InstancePolicy::Single => InstancePolicy::Multi,
                        InstancePolicy::Multi => InstancePolicy::Single,
                    };
                    runtime.dispatch_action(DeskAction::SetInstancePolicy { policy: next });
                }
            >
                "Single"
            </button>

            <TaskbarMenu window_menu=window_menu />
        </footer>
    }
}

#[component]
fn TaskbarMenu(window_menu: RwSignal<Option<TaskbarMenuState>>) -> impl IntoView {
    let runtime = use_desk_runtime();
    let state = runtime.state;

    view! {
        <Show
            when=move || {
                window_menu
                    .get()
                    .and_then(|menu| {
                        state
                            .get()
                            .windows
                            .into_iter()
                            .find(|win| win.id == menu.window_id)
                            .map(|win| (menu, win))
                    })
                    .is_some()
            }
            fallback=|| ()
        >
            {move || {
                let Some((menu, win)) = window_menu.get().and_then(|menu| {
                    state
                        .get()
                        .windows
                        .into_iter()
                        .find(|win| win.id == menu.window_id)
                        .map(|win| (menu, win))
                }) else {
                    return ().into_view();
                };

                let menu_style = format!("left:{}px;top:{}px;", menu.x, menu.y);
                let window_id = win.id;

                view! {
                    <div
                        class="taskbar-menu"
                        role="menu"
                        aria-label=format!("Window menu for {}", win.title)
                        style=menu_style
                        on:mousedown=move |ev| ev.stop_propagation()
                    >
                        <button
                            role="menuitem"
                            class="taskbar-menu-item"
                            on:click=move |_| {
                                window_menu.set(None);
                                runtime.dispatch_action(DeskAction::ResetGeometry { window_id });
                            }
                        >
                            "Reset Position & Size"
                        </button>
                        <button
                            role="menuitem"
                            class="taskbar-menu-item danger"
                            on:click=move |_| {
                                window_menu.set(None);
                                runtime.dispatch_action(DeskAction::Close { window_id });
                            }
                        >
                            "Close"
                        </button>
                        <button
                            role="menuitem"
                            class="taskbar-menu-item danger"
                            on:click=move |_| {
                                window_menu.set(None);
                                runtime.dispatch_action(DeskAction::CloseAll);
                            }
                        >
                            "Close All Windows"
                        </button>
                    </div>
                }
                    .into_view()
            }}
        </Show>
    }
}
