//! The configuration model consumed by the engine, codec and composer.

use super::guard::Hook;
use super::state::{Context, Payload};
use super::transition::TransitionDefinition;
use crate::logging::Logger;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Number of transition records a machine keeps unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Event handlers and lifecycle hooks for one state.
///
/// `on` is optional so that partial fragments can omit it, but a machine
/// that reaches a state without an `on` mapping fails with a configuration
/// error.
pub struct StateConfig<C> {
    pub on_enter: Option<Hook<C>>,
    pub on_exit: Option<Hook<C>>,
    pub on: Option<IndexMap<String, TransitionDefinition<C>>>,
}

impl<C> StateConfig<C> {
    /// State with an empty `on` mapping.
    pub fn new() -> Self {
        Self {
            on_enter: None,
            on_exit: None,
            on: Some(IndexMap::new()),
        }
    }

    /// Look up the definition for an event, falling back to the wildcard.
    pub fn definition(&self, event: &str) -> Option<&TransitionDefinition<C>> {
        let on = self.on.as_ref()?;
        on.get(event).or_else(|| on.get(super::state::WILDCARD))
    }
}

impl<C> Default for StateConfig<C> {
    fn default() -> Self {
        Self {
            on_enter: None,
            on_exit: None,
            on: None,
        }
    }
}

impl<C> Clone for StateConfig<C> {
    fn clone(&self) -> Self {
        Self {
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
            on: self.on.clone(),
        }
    }
}

impl<C> fmt::Debug for StateConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateConfig")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .field("on", &self.on)
            .finish()
    }
}

/// Where a machine's context comes from.
pub enum ContextSource<C> {
    /// A value cloned for every new machine and every reset.
    Value(C),

    /// A factory called for every new machine and every reset.
    Factory(Arc<dyn Fn() -> C + Send + Sync>),
}

impl<C: Clone> ContextSource<C> {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        ContextSource::Factory(Arc::new(factory))
    }

    /// Produce a fresh context.
    pub fn produce(&self) -> C {
        match self {
            ContextSource::Value(value) => value.clone(),
            ContextSource::Factory(factory) => factory(),
        }
    }
}

impl<C: Clone> Clone for ContextSource<C> {
    fn clone(&self) -> Self {
        match self {
            ContextSource::Value(value) => ContextSource::Value(value.clone()),
            ContextSource::Factory(factory) => ContextSource::Factory(Arc::clone(factory)),
        }
    }
}

impl<C> fmt::Debug for ContextSource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextSource::Value(_) => f.write_str("ContextSource::Value"),
            ContextSource::Factory(_) => f.write_str("ContextSource::Factory"),
        }
    }
}

/// Complete machine configuration.
///
/// Immutable once handed to a [`Machine`](crate::machine::Machine). The
/// `initial` state is only checked against `states` when the first transition
/// runs; use [`validate_config`](crate::validation::validate_config) for an
/// eager check.
pub struct MachineConfig<C> {
    pub initial: String,
    pub states: IndexMap<String, StateConfig<C>>,
    pub context: Option<ContextSource<C>>,
    pub debug: bool,
    pub logger: Option<Arc<dyn Logger>>,
    pub history_limit: usize,
}

impl<C> MachineConfig<C> {
    /// Configuration with no states, no context and logging disabled.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            initial: initial.into(),
            states: IndexMap::new(),
            context: None,
            debug: false,
            logger: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn state(&self, name: &str) -> Option<&StateConfig<C>> {
        self.states.get(name)
    }
}

impl<C: Context> MachineConfig<C> {
    /// Produce a fresh context from the configured source, or the default.
    pub fn produce_context(&self) -> C {
        self.context
            .as_ref()
            .map(ContextSource::produce)
            .unwrap_or_default()
    }
}

impl<C: Clone> Clone for MachineConfig<C> {
    fn clone(&self) -> Self {
        Self {
            initial: self.initial.clone(),
            states: self.states.clone(),
            context: self.context.clone(),
            debug: self.debug,
            logger: self.logger.clone(),
            history_limit: self.history_limit,
        }
    }
}

impl<C> fmt::Debug for MachineConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineConfig")
            .field("initial", &self.initial)
            .field("states", &self.states)
            .field("context", &self.context)
            .field("debug", &self.debug)
            .field("logger", &self.logger.is_some())
            .field("history_limit", &self.history_limit)
            .finish()
    }
}

/// Payload used when a caller provides none.
pub(crate) fn payload_or_null(payload: Option<&Payload>) -> &Payload {
    payload.unwrap_or(&super::state::NULL_PAYLOAD)
}
