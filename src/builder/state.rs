//! Builder for per-state configuration.

use crate::core::{Hook, Payload, StateConfig, TransitionDefinition};
use indexmap::IndexMap;

/// Builder for one state's handlers and hooks.
///
/// Starts with an empty `on` mapping, so a state built without events is a
/// sink: every event sent to it is refused rather than treated as a
/// configuration error.
pub struct StateBuilder<C> {
    config: StateConfig<C>,
}

impl<C: 'static> StateBuilder<C> {
    /// Create a state with no events and no hooks.
    pub fn new() -> Self {
        Self {
            config: StateConfig::new(),
        }
    }

    /// Create a state with hooks only and no `on` mapping.
    ///
    /// Intended for fragments that decorate a state defined elsewhere.
    pub fn hooks_only() -> Self {
        Self {
            config: StateConfig::default(),
        }
    }

    /// Handle `event` (or `"*"`) with a target, edge or edge sequence.
    pub fn on(
        mut self,
        event: impl Into<String>,
        definition: impl Into<TransitionDefinition<C>>,
    ) -> Self {
        self.config
            .on
            .get_or_insert_with(IndexMap::new)
            .insert(event.into(), definition.into());
        self
    }

    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut C, &Payload) + Send + Sync + 'static,
    {
        self.config.on_enter = Some(Hook::new(hook));
        self
    }

    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut C, &Payload) + Send + Sync + 'static,
    {
        self.config.on_exit = Some(Hook::new(hook));
        self
    }

    pub fn build(self) -> StateConfig<C> {
        self.config
    }
}

impl<C: 'static> Default for StateBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
