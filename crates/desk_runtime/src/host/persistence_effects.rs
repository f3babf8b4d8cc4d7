//! Debounced execution of layout and geometry persistence effects.
//!
//! The reducer emits `PersistLayout`/`PersistGeometry` on every mutation;
//! writing through each one would hammer storage during a drag. Deadlines
//! live in [`WriteScheduler`] and each pending key holds one browser timer,
//! so a burst of mutations collapses into a single trailing-edge write per
//! resource. `FlushWrites` and shell unmount drain everything immediately.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc, time::Duration};

use leptos::leptos_dom::helpers::TimeoutHandle;
use leptos::{set_timeout_with_handle, spawn_local, SignalGetUntracked};

use panel_contract::AppKind;
use platform_host::unix_time_ms_now;

use crate::{
    host::DeskHostContext,
    persistence,
    runtime_context::DeskRuntimeContext,
    scheduler::{WriteKey, WriteScheduler},
};

/// Shared deadline bookkeeping plus the live timer per pending key.
///
/// Cloning shares the underlying cells; the driver is cloned into timer
/// closures and must observe the same pending set everywhere.
#[derive(Clone, Default)]
pub(super) struct WriteDriver {
    scheduler: Rc<RefCell<WriteScheduler>>,
    timers: Rc<RefCell<BTreeMap<WriteKey, TimeoutHandle>>>,
}

impl WriteDriver {
    fn clear_timer(&self, key: WriteKey) {
        if let Some(handle) = self.timers.borrow_mut().remove(&key) {
            handle.clear();
        }
    }

    fn fire(&self, key: WriteKey, host: &DeskHostContext, runtime: DeskRuntimeContext) {
        self.timers.borrow_mut().remove(&key);
        // A flush may have already drained this key before its timer ran.
        if !self.scheduler.borrow_mut().cancel(key) {
            return;
        }
        run_write(host, runtime, key);
    }
}

pub(super) fn schedule_layout(host: &DeskHostContext, runtime: DeskRuntimeContext) {
    schedule(host, runtime, WriteKey::Layout);
}

pub(super) fn schedule_geometry(host: &DeskHostContext, runtime: DeskRuntimeContext, app: AppKind) {
    schedule(host, runtime, WriteKey::Geometry(app));
}

fn schedule(host: &DeskHostContext, runtime: DeskRuntimeContext, key: WriteKey) {
    // Boot replay mutates the registry too; nothing persists until the
    // stored snapshot has been applied.
    if !runtime.state.get_untracked().hydrated {
        return;
    }

    let driver = host.writes.clone();
    driver
        .scheduler
        .borrow_mut()
        .schedule(key, unix_time_ms_now());
    driver.clear_timer(key);

    let host = host.clone();
    let timer_driver = driver.clone();
    if let Ok(handle) = set_timeout_with_handle(
        move || timer_driver.fire(key, &host, runtime),
        Duration::from_millis(key.debounce_ms()),
    ) {
        driver.timers.borrow_mut().insert(key, handle);
    }
}

/// Drains every pending write immediately, timers included.
pub(super) fn flush_now(host: &DeskHostContext, runtime: DeskRuntimeContext) {
    let driver = host.writes.clone();
    let keys = driver.scheduler.borrow_mut().flush();
    for key in keys {
        driver.clear_timer(key);
        run_write(host, runtime, key);
    }
}

/// Removes one kind's stored geometry override.
///
/// Any pending debounced write for the same kind is cancelled first so it
/// cannot land after the removal and resurrect the override.
pub(super) fn drop_geometry(host: &DeskHostContext, app: AppKind) {
    let driver = host.writes.clone();
    let key = WriteKey::Geometry(app);
    driver.scheduler.borrow_mut().cancel(key);
    driver.clear_timer(key);

    let prefs = host.prefs_store();
    let scope = host.user_scope();
    spawn_local(async move {
        persistence::drop_app_geometry(prefs.as_ref(), &scope, app).await;
    });
}

fn run_write(host: &DeskHostContext, runtime: DeskRuntimeContext, key: WriteKey) {
    let prefs = host.prefs_store();
    let scope = host.user_scope();

    match key {
        WriteKey::Layout => {
            let snapshot = runtime.state.get_untracked().snapshot();
            spawn_local(async move {
                persistence::persist_layout(prefs.as_ref(), &scope, &snapshot).await;
            });
        }
        WriteKey::Geometry(app) => {
            let state = runtime.state.get_untracked();
            let Some(geometry) = state.per_app_geometry.get(&app).copied() else {
                return;
            };
            spawn_local(async move {
                persistence::persist_app_geometry(prefs.as_ref(), &scope, app, &geometry).await;
            });
        }
    }
}
