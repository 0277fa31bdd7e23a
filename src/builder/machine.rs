//! Builder for constructing machine configurations.

use crate::builder::error::BuildError;
use crate::builder::state::StateBuilder;
use crate::compose::ConfigFragment;
use crate::core::{ContextSource, MachineConfig, StateConfig, DEFAULT_HISTORY_LIMIT};
use crate::logging::Logger;
use indexmap::IndexMap;
use std::sync::Arc;

/// Builder for machine configurations with a fluent API.
///
/// The same builder produces either a complete [`MachineConfig`] or a
/// partial [`ConfigFragment`] for composition.
pub struct MachineBuilder<C> {
    initial: Option<String>,
    states: IndexMap<String, StateConfig<C>>,
    context: Option<ContextSource<C>>,
    debug: Option<bool>,
    logger: Option<Arc<dyn Logger>>,
    history_limit: Option<usize>,
}

impl<C: Clone + 'static> MachineBuilder<C> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            states: IndexMap::new(),
            context: None,
            debug: None,
            logger: None,
            history_limit: None,
        }
    }

    /// Set the initial state (required for `build`).
    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Add or replace a state.
    pub fn state(self, name: impl Into<String>, state: StateBuilder<C>) -> Self {
        self.state_config(name, state.build())
    }

    /// Add or replace a state from a pre-built configuration.
    pub fn state_config(mut self, name: impl Into<String>, state: StateConfig<C>) -> Self {
        self.states.insert(name.into(), state);
        self
    }

    /// Use a fixed context value, cloned for each machine and reset.
    pub fn context(mut self, context: C) -> Self {
        self.context = Some(ContextSource::Value(context));
        self
    }

    /// Use a factory producing a fresh context for each machine and reset.
    pub fn context_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.context = Some(ContextSource::factory(factory));
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = Some(enabled);
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Number of transition records kept; zero disables history.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Build the configuration.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<MachineConfig<C>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        Ok(MachineConfig {
            initial,
            states: self.states,
            context: self.context,
            debug: self.debug.unwrap_or(false),
            logger: self.logger,
            history_limit: self.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
        })
    }

    /// Build a partial configuration for composition. Nothing is required.
    pub fn fragment(self) -> ConfigFragment<C> {
        ConfigFragment {
            initial: self.initial,
            states: self.states,
            context: self.context,
            debug: self.debug,
            logger: self.logger,
            history_limit: self.history_limit,
        }
    }
}

impl<C: Clone + 'static> Default for MachineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
