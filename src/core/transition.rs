//! Transition edges, definitions and the pure resolution function.
//!
//! A definition is a closed union of three shapes: a bare target state, a
//! single edge, or an ordered sequence of edges where the first match wins.
//! [`TransitionDefinition::resolve`] collapses any of them into at most one
//! edge without touching the context.

use super::guard::{Action, Guard};
use super::state::Payload;

/// Rule describing one way an event can be handled from a state.
///
/// An edge without a target is an internal transition: only its action runs
/// and the state does not change.
///
/// # Example
///
/// ```rust
/// use statewright::core::{Payload, TransitionEdge};
///
/// #[derive(Clone, Default)]
/// struct Retry {
///     attempts: u32,
///     max: u32,
/// }
///
/// let retry = TransitionEdge::to("RETRYING")
///     .guard(|c: &Retry, _: &Payload| c.attempts < c.max);
/// let bump = TransitionEdge::internal().action(|c: &mut Retry, _: &Payload| c.attempts += 1);
///
/// assert_eq!(retry.target.as_deref(), Some("RETRYING"));
/// assert!(bump.is_internal());
/// ```
pub struct TransitionEdge<C> {
    pub target: Option<String>,
    pub guard: Option<Guard<C>>,
    pub action: Option<Action<C>>,
}

impl<C> TransitionEdge<C> {
    /// Edge to a target state (external transition).
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            guard: None,
            action: None,
        }
    }

    /// Edge without a target (internal transition).
    pub fn internal() -> Self {
        Self {
            target: None,
            guard: None,
            action: None,
        }
    }

    /// Add a guard from a predicate closure.
    pub fn guard<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C, &Payload) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Add a pre-built guard.
    pub fn with_guard(mut self, guard: Guard<C>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add an action from a closure.
    pub fn action<F>(mut self, effect: F) -> Self
    where
        F: Fn(&mut C, &Payload) + Send + Sync + 'static,
    {
        self.action = Some(Action::new(effect));
        self
    }

    /// Add a pre-built action.
    pub fn with_action(mut self, action: Action<C>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn is_internal(&self) -> bool {
        self.target.is_none()
    }

    /// Check whether this edge applies. A guardless edge always matches.
    pub fn matches(&self, context: &C, payload: &Payload) -> bool {
        self.guard
            .as_ref()
            .map_or(true, |guard| guard.check(context, payload))
    }
}

impl<C> Clone for TransitionEdge<C> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            guard: self.guard.clone(),
            action: self.action.clone(),
        }
    }
}

impl<C> std::fmt::Debug for TransitionEdge<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEdge")
            .field("target", &self.target)
            .field("guard", &self.guard)
            .field("action", &self.action)
            .finish()
    }
}

/// How an event is handled from a state.
pub enum TransitionDefinition<C> {
    /// Shorthand for an unguarded edge to this state.
    Target(String),

    /// A single edge.
    Edge(TransitionEdge<C>),

    /// Edges evaluated in declared order; the first whose guard is absent or
    /// passes wins.
    Sequence(Vec<TransitionEdge<C>>),
}

/// Edge selected by resolution, borrowed from its definition.
#[derive(Debug)]
pub struct ResolvedEdge<'a, C> {
    pub target: Option<&'a str>,
    pub action: Option<&'a Action<C>>,
}

impl<C> ResolvedEdge<'_, C> {
    pub fn is_internal(&self) -> bool {
        self.target.is_none()
    }
}

impl<C> TransitionDefinition<C> {
    /// Select the edge that applies, or `None` when every guard rejects.
    ///
    /// This function is pure; callers are responsible for passing a snapshot
    /// when guards must not observe the live context.
    pub fn resolve(&self, context: &C, payload: &Payload) -> Option<ResolvedEdge<'_, C>> {
        match self {
            TransitionDefinition::Target(target) => Some(ResolvedEdge {
                target: Some(target.as_str()),
                action: None,
            }),
            TransitionDefinition::Edge(edge) => edge
                .matches(context, payload)
                .then(|| ResolvedEdge::from_edge(edge)),
            TransitionDefinition::Sequence(edges) => edges
                .iter()
                .find(|edge| edge.matches(context, payload))
                .map(ResolvedEdge::from_edge),
        }
    }

    /// Normalize into an edge list, used when merging definitions.
    pub fn into_edges(self) -> Vec<TransitionEdge<C>> {
        match self {
            TransitionDefinition::Target(target) => vec![TransitionEdge::to(target)],
            TransitionDefinition::Edge(edge) => vec![edge],
            TransitionDefinition::Sequence(edges) => edges,
        }
    }

    /// Borrowing view of the edges. A bare target yields none; use
    /// [`TransitionDefinition::targets`] for graph traversal.
    pub fn edges(&self) -> &[TransitionEdge<C>] {
        match self {
            TransitionDefinition::Target(_) => &[],
            TransitionDefinition::Edge(edge) => std::slice::from_ref(edge),
            TransitionDefinition::Sequence(edges) => edges,
        }
    }

    /// All explicit target states named by this definition.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            TransitionDefinition::Target(target) => vec![target.as_str()],
            _ => self
                .edges()
                .iter()
                .filter_map(|edge| edge.target.as_deref())
                .collect(),
        }
    }
}

impl<'a, C> ResolvedEdge<'a, C> {
    fn from_edge(edge: &'a TransitionEdge<C>) -> Self {
        Self {
            target: edge.target.as_deref(),
            action: edge.action.as_ref(),
        }
    }
}

impl<C> Clone for TransitionDefinition<C> {
    fn clone(&self) -> Self {
        match self {
            TransitionDefinition::Target(target) => TransitionDefinition::Target(target.clone()),
            TransitionDefinition::Edge(edge) => TransitionDefinition::Edge(edge.clone()),
            TransitionDefinition::Sequence(edges) => TransitionDefinition::Sequence(edges.clone()),
        }
    }
}

impl<C> std::fmt::Debug for TransitionDefinition<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionDefinition::Target(target) => f.debug_tuple("Target").field(target).finish(),
            TransitionDefinition::Edge(edge) => f.debug_tuple("Edge").field(edge).finish(),
            TransitionDefinition::Sequence(edges) => {
                f.debug_tuple("Sequence").field(edges).finish()
            }
        }
    }
}

impl<C> From<&str> for TransitionDefinition<C> {
    fn from(target: &str) -> Self {
        TransitionDefinition::Target(target.to_string())
    }
}

impl<C> From<String> for TransitionDefinition<C> {
    fn from(target: String) -> Self {
        TransitionDefinition::Target(target)
    }
}

impl<C> From<TransitionEdge<C>> for TransitionDefinition<C> {
    fn from(edge: TransitionEdge<C>) -> Self {
        TransitionDefinition::Edge(edge)
    }
}

impl<C> From<Vec<TransitionEdge<C>>> for TransitionDefinition<C> {
    fn from(edges: Vec<TransitionEdge<C>>) -> Self {
        TransitionDefinition::Sequence(edges)
    }
}
