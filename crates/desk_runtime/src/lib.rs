//! Multi-window desk runtime for the LedgerDesk shell: window registry,
//! drag/resize control, layout persistence, and the Leptos components that
//! render it all.

pub mod adjustments;
pub mod catalog;
pub mod components;
pub mod drag;
pub mod host;
pub mod model;
pub mod panels;
pub mod persistence;
pub mod reducer;
pub mod runtime_context;
pub mod scheduler;

pub use components::{use_desk_runtime, DeskProvider, DeskRuntimeContext, DeskShell};
pub use host::DeskHostContext;
pub use model::*;
pub use panels::PanelRegistry;
pub use persistence::{
    drop_app_geometry, load_boot_layout, persist_app_geometry, persist_layout, BootLayout,
};
pub use reducer::{reduce_desk, DeskAction, DeskEnv, RegistryError, RuntimeEffect};
