//! Host-side service bundle and runtime-effect execution.
//!
//! The reducer never touches storage, timers, or the DOM; everything it
//! wants done comes back as a [`RuntimeEffect`] and lands here. This module
//! owns the adapter bundle (prefs, notices, permissions, panels) and the
//! debounced write driver, keeping effect execution behind one typed
//! boundary that composition code can swap out.

mod boot;
mod persistence_effects;

use std::rc::Rc;

use leptos::Callback;

use panel_contract::{AllowAllPermissions, PermissionGate};
use platform_host::{
    BrowserNoticeSink, MemoryPrefsStore, NoopNoticeSink, NoticeSink, PrefsStore, UserScope,
    WebPrefsStore,
};

use crate::{
    model::Viewport,
    panels::PanelRegistry,
    reducer::{DeskAction, RuntimeEffect},
    runtime_context::DeskRuntimeContext,
};

#[derive(Clone)]
/// Service bundle the desk runtime executes side effects through.
pub struct DeskHostContext {
    prefs: Rc<dyn PrefsStore>,
    notices: Rc<dyn NoticeSink>,
    permissions: Rc<dyn PermissionGate>,
    panels: PanelRegistry,
    scope: UserScope,
    writes: persistence_effects::WriteDriver,
}

impl Default for DeskHostContext {
    fn default() -> Self {
        Self::browser()
    }
}

impl DeskHostContext {
    /// Browser bundle: `localStorage` persistence and alert notices.
    pub fn browser() -> Self {
        Self::with_services(Rc::new(WebPrefsStore), Rc::new(BrowserNoticeSink))
    }

    /// Hermetic bundle for tests and native targets; nothing leaves memory.
    pub fn headless() -> Self {
        Self::with_services(Rc::new(MemoryPrefsStore::default()), Rc::new(NoopNoticeSink))
    }

    fn with_services(prefs: Rc<dyn PrefsStore>, notices: Rc<dyn NoticeSink>) -> Self {
        Self {
            prefs,
            notices,
            permissions: Rc::new(AllowAllPermissions),
            panels: PanelRegistry::with_builtin_panels(),
            scope: UserScope::anonymous(),
            writes: persistence_effects::WriteDriver::default(),
        }
    }

    /// Replaces the permission gate consulted before every launch.
    pub fn with_permissions(mut self, permissions: Rc<dyn PermissionGate>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Replaces the panel registry used to mount window content.
    pub fn with_panels(mut self, panels: PanelRegistry) -> Self {
        self.panels = panels;
        self
    }

    /// Scopes persisted layout/geometry keys to a signed-in user.
    pub fn with_user_scope(mut self, scope: UserScope) -> Self {
        self.scope = scope;
        self
    }

    /// Returns the configured preference store.
    pub fn prefs_store(&self) -> Rc<dyn PrefsStore> {
        self.prefs.clone()
    }

    /// Returns the configured notice sink.
    pub fn notice_sink(&self) -> Rc<dyn NoticeSink> {
        self.notices.clone()
    }

    /// Returns the configured permission gate.
    pub fn permission_gate(&self) -> Rc<dyn PermissionGate> {
        self.permissions.clone()
    }

    /// Returns the panel registry window bodies mount through.
    pub fn panel_registry(&self) -> PanelRegistry {
        self.panels.clone()
    }

    /// Returns the storage scope for the current user context.
    pub fn user_scope(&self) -> UserScope {
        self.scope.clone()
    }

    /// Installs the one-shot boot hydration sequence for the desk provider.
    pub fn install_boot_hydration(&self, dispatch: Callback<DeskAction>) {
        boot::install_boot_hydration(self.clone(), dispatch);
    }

    /// Executes a single [`RuntimeEffect`] emitted by the reducer.
    pub fn run_runtime_effect(&self, runtime: DeskRuntimeContext, effect: RuntimeEffect) {
        match effect {
            RuntimeEffect::PersistLayout => persistence_effects::schedule_layout(self, runtime),
            RuntimeEffect::PersistGeometry(app) => {
                persistence_effects::schedule_geometry(self, runtime, app);
            }
            RuntimeEffect::DropGeometry(app) => persistence_effects::drop_geometry(self, app),
            RuntimeEffect::FlushWrites => persistence_effects::flush_now(self, runtime),
            RuntimeEffect::Notify { title, body } => self.notices.notify(&title, &body),
        }
    }

    /// Forces every pending debounced write out immediately.
    ///
    /// The shell calls this on unmount so a layout or geometry write whose
    /// debounce window is still open is not silently dropped.
    pub fn flush_pending_writes(&self, runtime: DeskRuntimeContext) {
        persistence_effects::flush_now(self, runtime);
    }

    /// Returns the viewport currently available to the window manager.
    pub fn viewport(&self) -> Viewport {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                let width = window
                    .inner_width()
                    .ok()
                    .and_then(|value| value.as_f64())
                    .map(|value| value as i32)
                    .unwrap_or(1280);
                let height = window
                    .inner_height()
                    .ok()
                    .and_then(|value| value.as_f64())
                    .map(|value| value as i32)
                    .unwrap_or(800);

                return Viewport {
                    width: width.max(320),
                    height: height.max(240),
                };
            }
        }

        Viewport::default()
    }
}
