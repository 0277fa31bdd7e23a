//! Bidirectional codec between configurations and state-diagram text.
//!
//! The text format is the Mermaid `stateDiagram-v2` notation. Only the
//! transition graph is represented: hooks and guard/action bodies are
//! executable and cannot travel through text. Guards and actions appear as
//! markers in transition labels:
//!
//! ```text
//! stateDiagram-v2
//!     [*] --> IDLE
//!     IDLE --> FETCHING: fetch
//!     FETCHING --> RETRYING: reject [guard 1]
//!     FETCHING --> FAILED: reject [guard 2]
//!     FETCHING --> FETCHING: progress / (action internal)
//!     FAILED --> IDLE: * (any)
//! ```
//!
//! Decoding produces [`Guard::Placeholder`] and [`Action::Placeholder`]
//! values. They are inert but keep the label text, so encoding a decoded
//! diagram reproduces its markers and [`generate_skeleton`] can quote them.
//!
//! [`Diagram`] is the intermediate graph shared by both directions.

mod codegen;
mod decode;
mod encode;
mod error;

pub use codegen::{generate_skeleton, SkeletonOptions};
pub use decode::{decode, parse};
pub use encode::encode;
pub use error::ParseError;

use crate::core::{
    Action, Guard, MachineConfig, StateConfig, TransitionDefinition, TransitionEdge,
};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Marker for a guard or action, with optional descriptive text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Annotation {
    pub fn new(label: Option<String>) -> Self {
        Self { label }
    }
}

/// One edge of a diagram transition. A missing target is internal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Annotation>,
}

impl DiagramEdge {
    /// Whether the edge is a plain target with no markers.
    pub fn is_bare(&self) -> bool {
        self.target.is_some() && self.guard.is_none() && self.action.is_none()
    }
}

/// All edges for one event from one state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramTransition {
    pub source: String,
    pub event: String,
    /// Whether the edges form an ordered sequence rather than one edge.
    #[serde(default)]
    pub sequence: bool,
    pub edges: Vec<DiagramEdge>,
}

/// Transition graph of a state machine, without executable parts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    pub initial: String,
    /// Every state in the graph, in declaration order.
    pub states: Vec<String>,
    pub transitions: Vec<DiagramTransition>,
}

impl Diagram {
    /// Extract the transition graph of a configuration.
    ///
    /// States named only as targets are appended after the declared ones.
    pub fn from_config<C>(config: &MachineConfig<C>) -> Self {
        let mut states: IndexSet<String> = config.states.keys().cloned().collect();
        let mut transitions = Vec::new();

        for (source, state) in &config.states {
            let Some(on) = &state.on else {
                continue;
            };
            for (event, definition) in on {
                let (sequence, edges) = match definition {
                    TransitionDefinition::Target(target) => (
                        false,
                        vec![DiagramEdge {
                            target: Some(target.clone()),
                            guard: None,
                            action: None,
                        }],
                    ),
                    TransitionDefinition::Edge(edge) => (false, vec![diagram_edge(edge)]),
                    TransitionDefinition::Sequence(edges) => {
                        (true, edges.iter().map(diagram_edge).collect())
                    }
                };
                states.extend(edges.iter().filter_map(|edge| edge.target.clone()));
                transitions.push(DiagramTransition {
                    source: source.clone(),
                    event: event.clone(),
                    sequence,
                    edges,
                });
            }
        }

        Self {
            initial: config.initial.clone(),
            states: states.into_iter().collect(),
            transitions,
        }
    }

    /// Build a configuration whose guards and actions are placeholders.
    ///
    /// Every state gets an `on` mapping, possibly empty.
    pub fn into_config<C>(self) -> MachineConfig<C> {
        let mut config = MachineConfig::new(self.initial);
        for state in self.states {
            config.states.insert(state, StateConfig::new());
        }

        for transition in self.transitions {
            let definition = if transition.sequence {
                TransitionDefinition::Sequence(
                    transition.edges.into_iter().map(placeholder_edge).collect(),
                )
            } else {
                match <[DiagramEdge; 1]>::try_from(transition.edges) {
                    Ok([edge]) if edge.is_bare() => {
                        TransitionDefinition::Target(edge.target.unwrap_or_default())
                    }
                    Ok([edge]) => TransitionDefinition::Edge(placeholder_edge(edge)),
                    Err(edges) => TransitionDefinition::Sequence(
                        edges.into_iter().map(placeholder_edge).collect(),
                    ),
                }
            };
            config
                .states
                .entry(transition.source)
                .or_insert_with(StateConfig::new)
                .on
                .get_or_insert_with(Default::default)
                .insert(transition.event, definition);
        }

        config
    }

    /// Render as diagram text.
    pub fn render(&self) -> String {
        encode::render(self)
    }

    /// Distinct event names in first-use order, wildcard included.
    pub fn events(&self) -> Vec<&str> {
        let events: IndexSet<&str> = self
            .transitions
            .iter()
            .map(|transition| transition.event.as_str())
            .collect();
        events.into_iter().collect()
    }
}

fn diagram_edge<C>(edge: &TransitionEdge<C>) -> DiagramEdge {
    DiagramEdge {
        target: edge.target.clone(),
        guard: edge
            .guard
            .as_ref()
            .map(|guard| Annotation::new(guard.label().map(str::to_string))),
        action: edge
            .action
            .as_ref()
            .map(|action| Annotation::new(action.label().map(str::to_string))),
    }
}

fn placeholder_edge<C>(edge: DiagramEdge) -> TransitionEdge<C> {
    TransitionEdge {
        target: edge.target,
        guard: edge.guard.map(|a| Guard::placeholder(a.label)),
        action: edge.action.map(|a| Action::placeholder(a.label)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{MachineBuilder, StateBuilder};
    use crate::core::Payload;

    #[derive(Clone, Default)]
    struct Ctx {
        attempts: u32,
    }

    fn retry_config() -> MachineConfig<Ctx> {
        MachineBuilder::new()
            .initial("IDLE")
            .state("IDLE", StateBuilder::new().on("fetch", "FETCHING"))
            .state(
                "FETCHING",
                StateBuilder::new()
                    .on(
                        "reject",
                        vec![
                            TransitionEdge::to("RETRYING").with_guard(
                                Guard::new(|c: &Ctx, _: &Payload| c.attempts < 2)
                                    .labeled("attempts < max"),
                            ),
                            TransitionEdge::to("FAILED").guard(|_: &Ctx, _: &Payload| true),
                        ],
                    )
                    .on(
                        "progress",
                        TransitionEdge::internal()
                            .action(|c: &mut Ctx, _: &Payload| c.attempts += 1),
                    ),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn from_config_collects_states_and_edges() {
        let diagram = Diagram::from_config(&retry_config());

        assert_eq!(diagram.initial, "IDLE");
        assert_eq!(diagram.states, vec!["IDLE", "FETCHING", "RETRYING", "FAILED"]);
        assert_eq!(diagram.transitions.len(), 3);

        let reject = &diagram.transitions[1];
        assert!(reject.sequence);
        assert_eq!(
            reject.edges[0].guard,
            Some(Annotation::new(Some("attempts < max".to_string())))
        );
        assert_eq!(reject.edges[1].guard, Some(Annotation::default()));

        let progress = &diagram.transitions[2];
        assert_eq!(progress.edges[0].target, None);
        assert!(progress.edges[0].action.is_some());
    }

    #[test]
    fn into_config_uses_placeholders() {
        let config: MachineConfig<Ctx> = Diagram::from_config(&retry_config()).into_config();

        let fetching = config.state("FETCHING").unwrap();
        let Some(TransitionDefinition::Sequence(edges)) = fetching.definition("reject") else {
            panic!("expected a sequence");
        };
        let guard = edges[0].guard.as_ref().unwrap();
        assert!(guard.is_placeholder());
        assert_eq!(guard.label(), Some("attempts < max"));

        assert!(matches!(
            config.state("IDLE").unwrap().definition("fetch"),
            Some(TransitionDefinition::Target(target)) if target == "FETCHING"
        ));
        assert!(config.state("FAILED").unwrap().on.as_ref().unwrap().is_empty());
    }

    #[test]
    fn events_are_distinct_in_order() {
        let diagram = Diagram::from_config(&retry_config());
        assert_eq!(diagram.events(), vec!["fetch", "reject", "progress"]);
    }

    #[test]
    fn diagram_serializes_to_json() {
        let diagram = Diagram::from_config(&retry_config());
        let json = serde_json::to_value(&diagram).unwrap();

        assert_eq!(json["initial"], "IDLE");
        assert_eq!(json["transitions"][0]["edges"][0]["target"], "FETCHING");
        assert!(json["transitions"][0]["edges"][0].get("guard").is_none());

        let restored: Diagram = serde_json::from_value(json).unwrap();
        assert_eq!(restored, diagram);
    }
}
