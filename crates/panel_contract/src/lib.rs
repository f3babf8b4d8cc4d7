#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

//! Contract between the desk runtime and the business screens it hosts.
//!
//! The window manager treats every hosted screen ("panel") as opaque: it
//! mounts the panel through a registered [`PanelModule`], hands it a
//! [`PanelMountContext`], and receives requests back over a single
//! [`PanelCommand`] channel. Keeping this surface in its own crate lets the
//! business-screen crates depend on the contract without pulling in the
//! runtime, and keeps the runtime free of any screen-specific type.

use std::collections::BTreeMap;

use leptos::{Callable, Callback, Signal, View};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifies one hosted application kind.
///
/// The raw code (`TRADE_EDIT`, `SETTINGS`, ...) is the stable token used in
/// persisted layouts, storage keys, and window-title suffixes. Codes never
/// change once shipped; renaming a variant must keep its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppKind {
    /// Trade voucher editor; several may be open at once.
    TradeEdit,
    /// Inventory stock browser.
    InventoryBrowse,
    /// Companion quick view opened beside an origin window.
    InventoryQuick,
    /// Per-partner ledger history.
    PartnerLedger,
    /// Session settings dialog.
    Settings,
    /// End-of-day summary board.
    DailySummary,
    /// Pseudo-app: "return to home" closes every open window.
    Home,
}

impl AppKind {
    /// Stable wire/storage code for this kind.
    pub const fn code(self) -> &'static str {
        match self {
            Self::TradeEdit => "TRADE_EDIT",
            Self::InventoryBrowse => "INVENTORY_BROWSE",
            Self::InventoryQuick => "INVENTORY_QUICK",
            Self::PartnerLedger => "PARTNER_LEDGER",
            Self::Settings => "SETTINGS",
            Self::DailySummary => "DAILY_SUMMARY",
            Self::Home => "HOME",
        }
    }

    /// Parses a stable code back into a kind.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "TRADE_EDIT" => Some(Self::TradeEdit),
            "INVENTORY_BROWSE" => Some(Self::InventoryBrowse),
            "INVENTORY_QUICK" => Some(Self::InventoryQuick),
            "PARTNER_LEDGER" => Some(Self::PartnerLedger),
            "SETTINGS" => Some(Self::Settings),
            "DAILY_SUMMARY" => Some(Self::DailySummary),
            "HOME" => Some(Self::Home),
            _ => None,
        }
    }

    /// Returns whether this kind is the close-all pseudo-app rather than a
    /// real hosted screen.
    pub const fn is_home(self) -> bool {
        matches!(self, Self::Home)
    }
}

impl std::fmt::Display for AppKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Access level requested from the permission predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAction {
    /// Open/view the application.
    Read,
    /// Mutate business data through the application.
    Write,
}

impl PermissionAction {
    /// Stable token used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Permission predicate supplied by the surrounding application.
///
/// The launcher asks for `(app, Read)` before any window is created and
/// treats anything but `true` as denial. Implementations must answer
/// synchronously; there is no async grant flow in this subsystem.
pub trait PermissionGate {
    /// Returns whether the current user may perform `action` on `app`.
    fn has_permission(&self, app: AppKind, action: PermissionAction) -> bool;
}

/// Gate that grants everything; the default for compositions without an
/// authenticated user model.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllPermissions;

impl PermissionGate for AllowAllPermissions {
    fn has_permission(&self, _app: AppKind, _action: PermissionAction) -> bool {
        true
    }
}

/// Gate backed by an explicit grant list.
///
/// Useful in tests and in hosts that resolve grants up front at sign-in.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionSet {
    grants: Vec<(AppKind, PermissionAction)>,
}

impl StaticPermissionSet {
    /// Creates an empty set (denies everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one grant.
    pub fn allow(mut self, app: AppKind, action: PermissionAction) -> Self {
        if !self.grants.contains(&(app, action)) {
            self.grants.push((app, action));
        }
        self
    }
}

impl PermissionGate for StaticPermissionSet {
    fn has_permission(&self, app: AppKind, action: PermissionAction) -> bool {
        self.grants.contains(&(app, action))
    }
}

/// Per-item signed quantity deltas reported by one window.
///
/// Keys are item identifiers; values are uncommitted quantity adjustments
/// (negative = provisionally removed from stock).
pub type AdjustmentMap = BTreeMap<String, i64>;

/// Props key rewritten with a fresh monotonic timestamp on every
/// (re)activation. A reused single-instance window watches this field to
/// treat an otherwise-identical launch as a fresh activation.
pub const ACTIVATED_AT_PROP: &str = "activated_at_ms";

/// Requests a hosted panel may send back to the window manager.
///
/// The channel is bound to the issuing window when the panel is mounted, so
/// commands carry no window id of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelCommand {
    /// Close this panel's window.
    Close,
    /// Advisory unsaved-changes marker for this window.
    SetDirty(bool),
    /// Shallow-merge the given object into this window's props.
    UpdateProps(Value),
    /// Replace this window's uncommitted adjustment contribution.
    ReportAdjustments(AdjustmentMap),
    /// Drop this window's adjustment contribution (edits were committed).
    ClearAdjustments,
    /// Launch another application through the manager.
    Launch {
        /// Application to open.
        app: AppKind,
        /// Props for the launched application.
        props: Value,
        /// Position the new window beside this one (sidecar placement).
        sidecar: bool,
    },
}

/// Cloneable handle a panel uses to talk to the window manager.
#[derive(Clone, Copy)]
pub struct PanelHandle {
    sender: Callback<PanelCommand>,
}

impl PanelHandle {
    /// Wraps the runtime-provided command callback.
    pub fn new(sender: Callback<PanelCommand>) -> Self {
        Self { sender }
    }

    /// Requests this window be closed.
    pub fn close(&self) {
        self.sender.call(PanelCommand::Close);
    }

    /// Marks or clears the unsaved-changes flag.
    pub fn set_dirty(&self, dirty: bool) {
        self.sender.call(PanelCommand::SetDirty(dirty));
    }

    /// Shallow-merges `patch` into this window's props.
    pub fn update_props(&self, patch: Value) {
        self.sender.call(PanelCommand::UpdateProps(patch));
    }

    /// Replaces this window's uncommitted adjustment map.
    pub fn report_adjustments(&self, deltas: AdjustmentMap) {
        self.sender.call(PanelCommand::ReportAdjustments(deltas));
    }

    /// Removes this window's adjustment contribution after a commit.
    pub fn clear_adjustments(&self) {
        self.sender.call(PanelCommand::ClearAdjustments);
    }

    /// Launches `app` with independent placement.
    pub fn launch(&self, app: AppKind, props: Value) {
        self.sender.call(PanelCommand::Launch {
            app,
            props,
            sidecar: false,
        });
    }

    /// Launches `app` placed as this window's sidecar.
    pub fn launch_sidecar(&self, app: AppKind, props: Value) {
        self.sender.call(PanelCommand::Launch {
            app,
            props,
            sidecar: true,
        });
    }
}

/// Derives the stable DOM/diagnostic token for a window id.
pub fn panel_id_for(window_id: u64) -> String {
    format!("panel-{window_id}")
}

/// Everything a panel receives when mounted into a managed window.
#[derive(Clone)]
pub struct PanelMountContext {
    /// Which application this mount renders.
    pub app: AppKind,
    /// Owning window id.
    pub window_id: u64,
    /// Stable token (`panel-<id>`) for DOM ids and diagnostics.
    pub panel_id: String,
    /// Always true under the window manager; lets a screen that can also
    /// render standalone detect the hosted case.
    pub windowed: bool,
    /// Opaque launch props, shallow-merged across reactivations.
    pub props: Value,
    /// Merged uncommitted adjustments across all windows, folded live.
    pub adjustments: Signal<AdjustmentMap>,
    /// Command channel back into the manager, bound to this window.
    pub handle: PanelHandle,
}

/// Mountable panel implementation registered for one [`AppKind`].
#[derive(Clone, Copy)]
pub struct PanelModule {
    mount: fn(PanelMountContext) -> View,
}

impl PanelModule {
    /// Wraps a mount function.
    pub const fn new(mount: fn(PanelMountContext) -> View) -> Self {
        Self { mount }
    }

    /// Mounts the panel into its window body.
    pub fn mount(&self, context: PanelMountContext) -> View {
        (self.mount)(context)
    }
}
