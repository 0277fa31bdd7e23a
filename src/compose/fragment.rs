//! Partial configurations consumed by the composer.

use crate::core::{ContextSource, MachineConfig, StateConfig};
use crate::logging::Logger;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A machine configuration with every field optional.
///
/// States may be partial too: a fragment can contribute only hooks, only
/// some events, or both.
pub struct ConfigFragment<C> {
    pub initial: Option<String>,
    pub states: IndexMap<String, StateConfig<C>>,
    pub context: Option<ContextSource<C>>,
    pub debug: Option<bool>,
    pub logger: Option<Arc<dyn Logger>>,
    pub history_limit: Option<usize>,
}

impl<C> ConfigFragment<C> {
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
}

impl<C> Default for ConfigFragment<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> From<MachineConfig<C>> for ConfigFragment<C> {
    fn from(config: MachineConfig<C>) -> Self {
        Self {
            initial: Some(config.initial),
            states: config.states,
            context: config.context,
            debug: Some(config.debug),
            logger: config.logger,
            history_limit: Some(config.history_limit),
        }
    }
}

impl<C> fmt::Debug for ConfigFragment<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigFragment")
            .field("initial", &self.initial)
            .field("states", &self.states)
            .field("context", &self.context)
            .field("debug", &self.debug)
            .field("logger", &self.logger.is_some())
            .field("history_limit", &self.history_limit)
            .finish()
    }
}
