//! Guards, actions and lifecycle hooks.
//!
//! Guards are pure predicates that decide whether a transition edge applies.
//! Actions and hooks are the only places where a machine's context changes.
//!
//! Both guards and actions have a `Placeholder` variant. Placeholders come
//! from decoded diagrams: text cannot carry executable logic, so the decoder
//! produces inert stand-ins that keep the label text for re-serialization and
//! code generation.

use super::state::Payload;
use std::fmt;
use std::sync::Arc;

type PredicateFn<C> = Arc<dyn Fn(&C, &Payload) -> bool + Send + Sync>;
type EffectFn<C> = Arc<dyn Fn(&mut C, &Payload) + Send + Sync>;

/// Predicate deciding whether a transition edge applies.
///
/// # Example
///
/// ```rust
/// use statewright::core::{Guard, Payload};
///
/// #[derive(Clone, Default)]
/// struct Session {
///     authenticated: bool,
/// }
///
/// let needs_login = Guard::new(|s: &Session, _: &Payload| !s.authenticated);
///
/// assert!(needs_login.check(&Session::default(), &Payload::Null));
/// assert!(!needs_login.check(&Session { authenticated: true }, &Payload::Null));
/// ```
pub enum Guard<C> {
    /// Executable predicate over context and payload.
    Predicate {
        check: PredicateFn<C>,
        label: Option<String>,
    },

    /// Inert stand-in reconstructed from text. Always permits.
    Placeholder { label: Option<String> },
}

impl<C> Guard<C> {
    /// Create a guard from a pure predicate.
    ///
    /// The predicate must not have side effects: it may run during dry-run
    /// queries and is evaluated against a snapshot of the context.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C, &Payload) -> bool + Send + Sync + 'static,
    {
        Guard::Predicate {
            check: Arc::new(predicate),
            label: None,
        }
    }

    /// Create an inert placeholder guard.
    pub fn placeholder(label: Option<String>) -> Self {
        Guard::Placeholder { label }
    }

    /// Attach a descriptive label, rendered by the diagram encoder.
    pub fn labeled(self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match self {
            Guard::Predicate { check, .. } => Guard::Predicate { check, label: text },
            Guard::Placeholder { .. } => Guard::Placeholder { label: text },
        }
    }

    /// Evaluate the guard.
    pub fn check(&self, context: &C, payload: &Payload) -> bool {
        match self {
            Guard::Predicate { check, .. } => check(context, payload),
            Guard::Placeholder { .. } => true,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Guard::Predicate { label, .. } | Guard::Placeholder { label } => label.as_deref(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Guard::Placeholder { .. })
    }
}

impl<C> Clone for Guard<C> {
    fn clone(&self) -> Self {
        match self {
            Guard::Predicate { check, label } => Guard::Predicate {
                check: Arc::clone(check),
                label: label.clone(),
            },
            Guard::Placeholder { label } => Guard::Placeholder {
                label: label.clone(),
            },
        }
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Predicate { label, .. } => f
                .debug_struct("Predicate")
                .field("label", label)
                .finish_non_exhaustive(),
            Guard::Placeholder { label } => {
                f.debug_struct("Placeholder").field("label", label).finish()
            }
        }
    }
}

/// Side effect run on a transition edge.
///
/// Actions may mutate the context. Their result is discarded.
pub enum Action<C> {
    /// Executable effect.
    Effect { run: EffectFn<C>, label: Option<String> },

    /// Inert stand-in reconstructed from text. Does nothing.
    Placeholder { label: Option<String> },
}

impl<C> Action<C> {
    pub fn new<F>(effect: F) -> Self
    where
        F: Fn(&mut C, &Payload) + Send + Sync + 'static,
    {
        Action::Effect {
            run: Arc::new(effect),
            label: None,
        }
    }

    pub fn placeholder(label: Option<String>) -> Self {
        Action::Placeholder { label }
    }

    /// Attach a descriptive label, rendered by the diagram encoder.
    pub fn labeled(self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match self {
            Action::Effect { run, .. } => Action::Effect { run, label: text },
            Action::Placeholder { .. } => Action::Placeholder { label: text },
        }
    }

    pub fn run(&self, context: &mut C, payload: &Payload) {
        if let Action::Effect { run, .. } = self {
            run(context, payload);
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Action::Effect { label, .. } | Action::Placeholder { label } => label.as_deref(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Action::Placeholder { .. })
    }
}

impl<C> Clone for Action<C> {
    fn clone(&self) -> Self {
        match self {
            Action::Effect { run, label } => Action::Effect {
                run: Arc::clone(run),
                label: label.clone(),
            },
            Action::Placeholder { label } => Action::Placeholder {
                label: label.clone(),
            },
        }
    }
}

impl<C> fmt::Debug for Action<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Effect { label, .. } => f
                .debug_struct("Effect")
                .field("label", label)
                .finish_non_exhaustive(),
            Action::Placeholder { label } => {
                f.debug_struct("Placeholder").field("label", label).finish()
            }
        }
    }
}

/// Entry or exit hook run during external transitions.
pub struct Hook<C>(EffectFn<C>);

impl<C: 'static> Hook<C> {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&mut C, &Payload) + Send + Sync + 'static,
    {
        Hook(Arc::new(hook))
    }

    /// Combine hooks into one that runs each in order.
    pub fn compose(hooks: Vec<Hook<C>>) -> Self {
        Hook::new(move |context: &mut C, payload: &Payload| {
            for hook in &hooks {
                hook.call(context, payload);
            }
        })
    }
}

impl<C> Hook<C> {
    pub fn call(&self, context: &mut C, payload: &Payload) {
        (self.0)(context, payload)
    }
}

impl<C> Clone for Hook<C> {
    fn clone(&self) -> Self {
        Hook(Arc::clone(&self.0))
    }
}

impl<C> fmt::Debug for Hook<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook")
    }
}
