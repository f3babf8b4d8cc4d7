//! Reactive wiring for the desk: state signals, the dispatch callback that
//! runs the reducer, and the executor that drains queued runtime effects.

#![allow(clippy::clone_on_copy)]

use leptos::{
    component, create_effect, create_rw_signal, logging, provide_context, store_value,
    use_context, Callable, Callback, Children, IntoView, RwSignal, SignalGet, SignalGetUntracked,
    SignalSet, StoredValue,
};

use crate::{
    host::DeskHostContext,
    model::{DeskState, InteractionState},
    reducer::{reduce_desk, DeskAction, DeskEnv, RuntimeEffect},
};

/// Handles to the desk's reactive state, shared via Leptos context.
///
/// Everything here is `Copy`; components grab the context once and pass it
/// into event closures freely.
#[derive(Clone, Copy)]
pub struct DeskRuntimeContext {
    /// Host services the effect executor runs against.
    pub host: StoredValue<DeskHostContext>,
    /// Window registry, geometry overrides, and the adjustment ledger.
    pub state: RwSignal<DeskState>,
    /// Transient pointer tracking; separated so drag frames do not invalidate
    /// subscribers of the registry itself.
    pub interaction: RwSignal<InteractionState>,
    /// Effects emitted by the reducer, awaiting the executor.
    pub effects: RwSignal<Vec<RuntimeEffect>>,
    /// Entry point for every state mutation.
    pub dispatch: Callback<DeskAction>,
}

impl DeskRuntimeContext {
    pub fn dispatch_action(&self, action: DeskAction) {
        self.dispatch.call(action);
    }
}

/// Owns the desk's signals and provides [`DeskRuntimeContext`] to children.
///
/// Dispatch runs the pure reducer against untracked copies of the state,
/// publishes only what changed, and queues the returned effects; a separate
/// reactive effect drains that queue through the host. Boot hydration is
/// installed here so the provider is all an application shell needs.
#[component]
pub fn DeskProvider(host_context: DeskHostContext, children: Children) -> impl IntoView {
    let host = store_value(host_context);
    let state = create_rw_signal(DeskState::default());
    let interaction = create_rw_signal(InteractionState::default());
    let effects = create_rw_signal(Vec::<RuntimeEffect>::new());

    let dispatch = Callback::new(move |action: DeskAction| {
        let mut desk = state.get_untracked();
        let mut pointer = interaction.get_untracked();
        let previous_desk = desk.clone();
        let previous_pointer = pointer.clone();

        let permissions = host.get_value().permission_gate();
        let env = DeskEnv {
            permissions: permissions.as_ref(),
        };

        match reduce_desk(&mut desk, &mut pointer, &env, action) {
            Ok(new_effects) => {
                if desk != previous_desk {
                    state.set(desk);
                }
                if pointer != previous_pointer {
                    interaction.set(pointer);
                }
                if !new_effects.is_empty() {
                    let mut queue = effects.get_untracked();
                    queue.extend(new_effects);
                    effects.set(queue);
                }
            }
            Err(err) => logging::warn!("desk action rejected: {err}"),
        }
    });

    let runtime = DeskRuntimeContext {
        host,
        state,
        interaction,
        effects,
        dispatch,
    };

    provide_context(runtime.clone());
    host.get_value().install_boot_hydration(dispatch);
    install_effect_executor(runtime);

    children().into_view()
}

/// Drains the effect queue whenever the reducer fills it.
fn install_effect_executor(runtime: DeskRuntimeContext) {
    create_effect(move |_| {
        let queued = runtime.effects.get();
        if queued.is_empty() {
            return;
        }
        // Clear before running: an effect may dispatch again, and that batch
        // must queue fresh instead of replaying alongside this one.
        runtime.effects.set(Vec::new());

        let host = runtime.host.get_value();
        for effect in queued {
            host.run_runtime_effect(runtime, effect);
        }
    });
}

/// Returns the desk runtime provided by the nearest [`DeskProvider`].
///
/// # Panics
///
/// Panics when called outside a `DeskProvider` subtree.
pub fn use_desk_runtime() -> DeskRuntimeContext {
    use_context::<DeskRuntimeContext>().expect("DeskRuntimeContext not provided")
}
