//! Merge policies selectable per composition.

/// How conflicting `initial` values are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// The last fragment defining `initial` wins.
    #[default]
    Override,

    /// Two fragments defining different `initial` values is an error.
    Error,
}

/// How `on` entries for the same state and event are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// The later fragment's entry replaces the earlier one.
    #[default]
    Replace,

    /// Later edges are evaluated before earlier ones.
    Prepend,

    /// Earlier edges are evaluated first; later ones act as fallback.
    Append,
}

/// How `on_enter` / `on_exit` hooks for the same state are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookPolicy {
    /// The later fragment's hook replaces the earlier one.
    #[default]
    Replace,

    /// All hooks run, in fragment order.
    Compose,
}

/// How fragment contexts are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextPolicy {
    /// The last fragment defining a context wins outright.
    Replace,

    /// Shallow-merge every fragment's context in order, later keys
    /// overwriting earlier ones. The result is a factory, so every machine
    /// and every reset gets an independent merge.
    #[default]
    Merge,
}

/// Policies applied by [`compose_fsm_config`](super::compose_fsm_config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComposeOptions {
    pub conflicts: ConflictPolicy,
    pub transitions: TransitionPolicy,
    pub hooks: HookPolicy,
    pub context: ContextPolicy,
}

impl ComposeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conflicts(mut self, policy: ConflictPolicy) -> Self {
        self.conflicts = policy;
        self
    }

    pub fn transitions(mut self, policy: TransitionPolicy) -> Self {
        self.transitions = policy;
        self
    }

    pub fn hooks(mut self, policy: HookPolicy) -> Self {
        self.hooks = policy;
        self
    }

    pub fn context(mut self, policy: ContextPolicy) -> Self {
        self.context = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policies() {
        let options = ComposeOptions::new();

        assert_eq!(options.conflicts, ConflictPolicy::Override);
        assert_eq!(options.transitions, TransitionPolicy::Replace);
        assert_eq!(options.hooks, HookPolicy::Replace);
        assert_eq!(options.context, ContextPolicy::Merge);
    }

    #[test]
    fn setters_chain() {
        let options = ComposeOptions::new()
            .conflicts(ConflictPolicy::Error)
            .transitions(TransitionPolicy::Prepend)
            .hooks(HookPolicy::Compose)
            .context(ContextPolicy::Replace);

        assert_eq!(options.conflicts, ConflictPolicy::Error);
        assert_eq!(options.transitions, TransitionPolicy::Prepend);
        assert_eq!(options.hooks, HookPolicy::Compose);
        assert_eq!(options.context, ContextPolicy::Replace);
    }
}
