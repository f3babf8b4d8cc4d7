//! Built-in screens used while the full business panels are still being
//! ported onto the desk runtime.

use leptos::*;
use serde_json::{json, Value};

use panel_contract::{AdjustmentMap, AppKind, PanelMountContext, ACTIVATED_AT_PROP};

/// Mounts the trade entry screen.
pub(super) fn mount_trade_edit_panel(context: PanelMountContext) -> View {
    view! { <TradeEditPanel context=context /> }.into_view()
}

/// Mounts the inventory browser screen.
pub(super) fn mount_inventory_browse_panel(context: PanelMountContext) -> View {
    view! { <InventoryBrowsePanel context=context /> }.into_view()
}

/// Mounts the single-item quick view screen.
pub(super) fn mount_inventory_quick_panel(context: PanelMountContext) -> View {
    view! { <InventoryQuickPanel context=context /> }.into_view()
}

/// Fallback for kinds with no registered module.
pub(super) fn mount_generic_panel(context: PanelMountContext) -> View {
    let handle = context.handle;
    view! {
        <div class="app-shell app-generic-shell">
            <p><strong>{context.app.code()}</strong></p>
            <p>"This screen has no panel registered yet."</p>
            <button type="button" class="app-action" on:click=move |_| handle.close()>
                "Close"
            </button>
        </div>
    }
    .into_view()
}

#[component]
fn TradeEditPanel(context: PanelMountContext) -> impl IntoView {
    let handle = context.handle;
    let item_code = create_rw_signal("item-7".to_string());
    let quantity = create_rw_signal(1i64);
    let holding = create_rw_signal(false);

    let trade_label = context
        .props
        .get("trade_id")
        .and_then(Value::as_i64)
        .map(|id| format!("Trade #{id}"))
        .unwrap_or_else(|| "New trade".to_string());
    let activated_at = context
        .props
        .get(ACTIVATED_AT_PROP)
        .and_then(Value::as_u64)
        .unwrap_or_default();

    let hold = move |_| {
        let deltas = AdjustmentMap::from([(item_code.get(), -quantity.get())]);
        handle.report_adjustments(deltas);
        handle.set_dirty(true);
        holding.set(true);
    };
    let commit = move |_| {
        handle.clear_adjustments();
        handle.set_dirty(false);
        holding.set(false);
    };
    let quick_view = move |_| {
        handle.launch_sidecar(AppKind::InventoryQuick, json!({ "item": item_code.get() }));
    };

    view! {
        <div class="app-shell app-trade-shell">
            <div class="app-toolbar" role="group" aria-label="Trade entry controls">
                <label>
                    "Item "
                    <input
                        class="app-field"
                        type="text"
                        prop:value=move || item_code.get()
                        on:input=move |ev| item_code.set(event_target_value(&ev))
                    />
                </label>
                <label>
                    "Qty "
                    <input
                        class="app-field"
                        type="number"
                        min="1"
                        prop:value=move || quantity.get().to_string()
                        on:input=move |ev| {
                            let value = event_target_value(&ev).parse::<i64>().unwrap_or(1).max(1);
                            quantity.set(value);
                        }
                    />
                </label>
                <button type="button" class="app-action" on:click=hold>"Hold stock"</button>
                <button type="button" class="app-action" on:click=commit>"Commit"</button>
                <button type="button" class="app-action" on:click=quick_view>"Quick view"</button>
            </div>

            <div class="app-statusbar">
                <span>{trade_label}</span>
                <span>
                    {move || if holding.get() { "Holding uncommitted stock" } else { "No holds" }}
                </span>
                <span>{format!("Activated {activated_at}")}</span>
            </div>
        </div>
    }
}

#[component]
fn InventoryBrowsePanel(context: PanelMountContext) -> impl IntoView {
    let adjustments = context.adjustments;

    view! {
        <div class="app-shell app-inventory-shell">
            <div class="app-toolbar" role="note">
                <strong>"Inventory"</strong>
                <span>"Quantities include uncommitted holds from open trade windows."</span>
            </div>

            <ul class="app-list">
                {move || {
                    let merged = adjustments.get();
                    if merged.is_empty() {
                        view! { <li class="app-list-empty">"No uncommitted holds"</li> }
                            .into_view()
                    } else {
                        merged
                            .iter()
                            .map(|(item, delta)| {
                                view! {
                                    <li class="app-list-row">
                                        <span>{item.clone()}</span>
                                        <span>{format_delta(*delta)}</span>
                                    </li>
                                }
                            })
                            .collect_view()
                    }
                }}
            </ul>

            <div class="app-statusbar">
                <span>{move || format!("{} item(s) affected", adjustments.get().len())}</span>
            </div>
        </div>
    }
}

#[component]
fn InventoryQuickPanel(context: PanelMountContext) -> impl IntoView {
    let handle = context.handle;
    let adjustments = context.adjustments;
    let item = context
        .props
        .get("item")
        .and_then(Value::as_str)
        .unwrap_or("item-7")
        .to_string();
    let heading = item.clone();
    let delta = move || adjustments.get().get(&item).copied().unwrap_or(0);

    view! {
        <div class="app-shell app-quick-shell">
            <p><strong>{heading}</strong></p>
            <p>"Uncommitted delta: " {move || format_delta(delta())}</p>
            <button type="button" class="app-action" on:click=move |_| handle.close()>
                "Close"
            </button>
        </div>
    }
}

fn format_delta(delta: i64) -> String {
    if delta > 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}
