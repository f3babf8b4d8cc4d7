//! Static per-application metadata consulted at launch time.

use panel_contract::AppKind;

use crate::model::{DragMode, PanelSize};

/// Launch-time metadata for one application kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppDescriptor {
    pub app: AppKind,
    /// Base window title; the launcher suffixes the raw app code.
    pub title: &'static str,
    /// Short badge shown in the titlebar and taskbar entry.
    pub icon: &'static str,
    /// Preferred size; `None` axes let the content size itself.
    pub default_size: PanelSize,
    /// At most one window of this kind, regardless of session policy.
    pub always_single_instance: bool,
    /// Positioning strategy fixed at window creation.
    pub drag_mode: DragMode,
    /// Whether launcher menus list this kind directly.
    pub show_in_launcher: bool,
    /// Companion quick view: when opened from an origin window, the new
    /// window's height is forced to match the origin's current height.
    pub match_origin_height: bool,
}

/// Every launchable application. `AppKind::Home` is deliberately absent:
/// it opens no window.
pub const APP_CATALOG: [AppDescriptor; 6] = [
    AppDescriptor {
        app: AppKind::TradeEdit,
        title: "Trade Entry",
        icon: "TR",
        default_size: PanelSize::px(720, 540),
        always_single_instance: false,
        drag_mode: DragMode::Absolute,
        show_in_launcher: true,
        match_origin_height: false,
    },
    AppDescriptor {
        app: AppKind::InventoryBrowse,
        title: "Inventory Browser",
        icon: "IV",
        default_size: PanelSize::px(760, 520),
        always_single_instance: true,
        drag_mode: DragMode::Absolute,
        show_in_launcher: true,
        match_origin_height: false,
    },
    AppDescriptor {
        app: AppKind::InventoryQuick,
        title: "Inventory Quick View",
        icon: "QV",
        default_size: PanelSize {
            width: Some(360),
            height: None,
        },
        always_single_instance: false,
        drag_mode: DragMode::Absolute,
        show_in_launcher: false,
        match_origin_height: true,
    },
    AppDescriptor {
        app: AppKind::PartnerLedger,
        title: "Partner Ledger",
        icon: "PL",
        default_size: PanelSize::px(680, 500),
        always_single_instance: false,
        drag_mode: DragMode::Absolute,
        show_in_launcher: true,
        match_origin_height: false,
    },
    AppDescriptor {
        app: AppKind::Settings,
        title: "Session Settings",
        icon: "ST",
        default_size: PanelSize::auto(),
        always_single_instance: true,
        drag_mode: DragMode::TransformOffset,
        show_in_launcher: true,
        match_origin_height: false,
    },
    AppDescriptor {
        app: AppKind::DailySummary,
        title: "Daily Summary",
        icon: "DS",
        default_size: PanelSize {
            width: Some(520),
            height: None,
        },
        always_single_instance: true,
        drag_mode: DragMode::AbsoluteLatch,
        show_in_launcher: true,
        match_origin_height: false,
    },
];

/// Descriptor for `app`; `None` only for the home pseudo-app.
pub fn descriptor(app: AppKind) -> Option<&'static AppDescriptor> {
    APP_CATALOG.iter().find(|d| d.app == app)
}

/// Kinds a launcher menu should list.
pub fn launcher_apps() -> impl Iterator<Item = &'static AppDescriptor> {
    APP_CATALOG.iter().filter(|d| d.show_in_launcher)
}

/// Display title with the raw app code suffixed for disambiguation.
pub fn window_title(descriptor: &AppDescriptor) -> String {
    format!("{} [{}]", descriptor.title, descriptor.app.code())
}
