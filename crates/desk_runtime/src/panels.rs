//! Panel registry: maps application kinds to mountable screen modules.

mod placeholders;

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use leptos::View;
use panel_contract::{AppKind, PanelModule, PanelMountContext};

/// Mount-function registry keyed by application kind.
///
/// Cloning shares the underlying table, so a module registered after the
/// shell mounted still reaches every window opened afterwards.
#[derive(Clone, Default)]
pub struct PanelRegistry {
    modules: Rc<RefCell<BTreeMap<AppKind, PanelModule>>>,
}

impl PanelRegistry {
    /// Empty registry; every mount falls back to the generic placeholder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in screens.
    pub fn with_builtin_panels() -> Self {
        let registry = Self::new();
        registry.register(
            AppKind::TradeEdit,
            PanelModule::new(placeholders::mount_trade_edit_panel),
        );
        registry.register(
            AppKind::InventoryBrowse,
            PanelModule::new(placeholders::mount_inventory_browse_panel),
        );
        registry.register(
            AppKind::InventoryQuick,
            PanelModule::new(placeholders::mount_inventory_quick_panel),
        );
        registry
    }

    /// Registers the module mounted for `app` windows, replacing any
    /// previous registration for that kind.
    pub fn register(&self, app: AppKind, module: PanelModule) {
        self.modules.borrow_mut().insert(app, module);
    }

    /// Registered module for `app`, if any.
    pub fn module_for(&self, app: AppKind) -> Option<PanelModule> {
        self.modules.borrow().get(&app).copied()
    }

    /// Mounts the registered module, or the generic placeholder when the
    /// kind has none.
    pub fn mount(&self, context: PanelMountContext) -> View {
        match self.module_for(context.app) {
            Some(module) => module.mount(context),
            None => placeholders::mount_generic_panel(context),
        }
    }
}
