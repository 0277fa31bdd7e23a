//! Composition of partial configurations.
//!
//! [`compose_fsm_config`] folds an ordered list of [`ConfigFragment`]s into
//! one [`MachineConfig`]. Fragments stay independent of each other: a later
//! fragment can gate, extend or replace an earlier one's transitions purely
//! through the selected [`TransitionPolicy`].
//!
//! # Example
//!
//! ```rust
//! use statewright::builder::{MachineBuilder, StateBuilder};
//! use statewright::compose::{compose_fsm_config, ComposeOptions, TransitionPolicy};
//! use statewright::core::{Payload, TransitionEdge};
//! use statewright::machine::Machine;
//! use serde_json::json;
//!
//! let base = MachineBuilder::<serde_json::Value>::new()
//!     .initial("IDLE")
//!     .context(json!({ "authenticated": false }))
//!     .state("IDLE", StateBuilder::new().on("submit", "PROCESSING"))
//!     .fragment();
//!
//! let auth = MachineBuilder::new()
//!     .state(
//!         "IDLE",
//!         StateBuilder::new().on(
//!             "submit",
//!             TransitionEdge::to("LOGIN_REQUIRED")
//!                 .guard(|c: &serde_json::Value, _: &Payload| c["authenticated"] != true),
//!         ),
//!     )
//!     .fragment();
//!
//! let options = ComposeOptions::new().transitions(TransitionPolicy::Prepend);
//! let config = compose_fsm_config(vec![base, auth], options).unwrap();
//!
//! let mut machine = Machine::new(config);
//! assert_eq!(machine.transition("submit", None).unwrap(), "LOGIN_REQUIRED");
//! ```

mod error;
mod fragment;
mod merge;
mod policy;

pub use error::ComposeError;
pub use fragment::ConfigFragment;
pub use merge::MergeContext;
pub use policy::{ComposeOptions, ConflictPolicy, ContextPolicy, HookPolicy, TransitionPolicy};

use crate::core::{
    Context, ContextSource, Hook, MachineConfig, StateConfig, TransitionDefinition,
    DEFAULT_HISTORY_LIMIT,
};
use indexmap::map::Entry;
use indexmap::IndexMap;

/// Merge fragments, in order, into one configuration.
///
/// `None` entries are skipped. Fails when no fragment remains, when no
/// fragment defines `initial`, or, under [`ConflictPolicy::Error`], when two
/// fragments define different initial states.
///
/// The context type must implement [`MergeContext`] under every policy.
/// Struct contexts that only need [`ContextPolicy::Replace`] can use an
/// empty `impl MergeContext for MyContext {}`.
pub fn compose_fsm_config<C, I>(
    fragments: I,
    options: ComposeOptions,
) -> Result<MachineConfig<C>, ComposeError>
where
    C: Context + MergeContext,
    I: IntoIterator,
    I::Item: Into<Option<ConfigFragment<C>>>,
{
    let fragments: Vec<ConfigFragment<C>> =
        fragments.into_iter().filter_map(|fragment| fragment.into()).collect();
    if fragments.is_empty() {
        return Err(ComposeError::NoFragments);
    }
    tracing::debug!(
        fragments = fragments.len(),
        ?options,
        "composing machine configuration"
    );

    let mut initial: Option<String> = None;
    let mut states: IndexMap<String, StateConfig<C>> = IndexMap::new();
    let mut enter_hooks: IndexMap<String, Vec<Hook<C>>> = IndexMap::new();
    let mut exit_hooks: IndexMap<String, Vec<Hook<C>>> = IndexMap::new();
    let mut contexts: Vec<ContextSource<C>> = Vec::new();
    let mut debug = false;
    let mut logger = None;
    let mut history_limit = DEFAULT_HISTORY_LIMIT;

    for fragment in fragments {
        if let Some(next) = fragment.initial {
            initial = Some(merge_initial(initial, next, options.conflicts)?);
        }

        for (name, state) in fragment.states {
            let merged = states.entry(name.clone()).or_default();
            if let Some(hook) = state.on_enter {
                enter_hooks.entry(name.clone()).or_default().push(hook);
            }
            if let Some(hook) = state.on_exit {
                exit_hooks.entry(name).or_default().push(hook);
            }
            if let Some(on) = state.on {
                let target = merged.on.get_or_insert_with(IndexMap::new);
                for (event, definition) in on {
                    merge_definition(target, event, definition, options.transitions);
                }
            }
        }

        contexts.extend(fragment.context);
        debug = fragment.debug.unwrap_or(debug);
        logger = fragment.logger.or(logger);
        history_limit = fragment.history_limit.unwrap_or(history_limit);
    }

    let initial = initial.ok_or(ComposeError::MissingInitialState)?;

    for (name, hooks) in enter_hooks {
        if let Some(state) = states.get_mut(&name) {
            state.on_enter = combine_hooks(hooks, options.hooks);
        }
    }
    for (name, hooks) in exit_hooks {
        if let Some(state) = states.get_mut(&name) {
            state.on_exit = combine_hooks(hooks, options.hooks);
        }
    }

    Ok(MachineConfig {
        initial,
        states,
        context: combine_contexts(contexts, options.context),
        debug,
        logger,
        history_limit,
    })
}

fn merge_initial(
    current: Option<String>,
    next: String,
    policy: ConflictPolicy,
) -> Result<String, ComposeError> {
    match (current, policy) {
        (Some(first), ConflictPolicy::Error) if first != next => {
            Err(ComposeError::ConflictingInitial {
                first,
                second: next,
            })
        }
        _ => Ok(next),
    }
}

fn merge_definition<C>(
    on: &mut IndexMap<String, TransitionDefinition<C>>,
    event: String,
    definition: TransitionDefinition<C>,
    policy: TransitionPolicy,
) {
    match on.entry(event) {
        Entry::Vacant(slot) => {
            slot.insert(definition);
        }
        Entry::Occupied(mut slot) => {
            let earlier =
                std::mem::replace(slot.get_mut(), TransitionDefinition::Sequence(Vec::new()));
            *slot.get_mut() = match policy {
                TransitionPolicy::Replace => definition,
                TransitionPolicy::Prepend => chain(definition, earlier),
                TransitionPolicy::Append => chain(earlier, definition),
            };
        }
    }
}

/// Normalize both definitions to edge lists; `first` is evaluated first.
fn chain<C>(
    first: TransitionDefinition<C>,
    second: TransitionDefinition<C>,
) -> TransitionDefinition<C> {
    let mut edges = first.into_edges();
    edges.extend(second.into_edges());
    TransitionDefinition::Sequence(edges)
}

fn combine_hooks<C: 'static>(mut hooks: Vec<Hook<C>>, policy: HookPolicy) -> Option<Hook<C>> {
    if policy == HookPolicy::Compose && hooks.len() > 1 {
        Some(Hook::compose(hooks))
    } else {
        hooks.pop()
    }
}

fn combine_contexts<C>(
    mut contexts: Vec<ContextSource<C>>,
    policy: ContextPolicy,
) -> Option<ContextSource<C>>
where
    C: Context + MergeContext,
{
    if contexts.is_empty() {
        return None;
    }
    match policy {
        ContextPolicy::Replace => contexts.pop(),
        ContextPolicy::Merge => Some(ContextSource::factory(move || {
            let mut sources = contexts.iter();
            let mut merged = sources.next().map(ContextSource::produce).unwrap_or_default();
            for source in sources {
                merged.merge_from(source.produce());
            }
            merged
        })),
    }
}
