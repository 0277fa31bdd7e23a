//! Configuration to diagram text.

use super::{Diagram, DiagramEdge, DiagramTransition};
use crate::core::{is_wildcard, MachineConfig};

pub(super) const HEADER: &str = "stateDiagram-v2";
pub(super) const INDENT: &str = "    ";
pub(super) const ANY_EVENT: &str = "* (any)";

/// Encode the transition graph of a configuration as diagram text.
///
/// Hooks, context and guard/action bodies are not represented.
///
/// # Example
///
/// ```rust
/// use statewright::builder::{MachineBuilder, StateBuilder};
/// use statewright::core::MachineConfig;
/// use statewright::diagram::encode;
///
/// let config: MachineConfig<()> = MachineBuilder::new()
///     .initial("OFF")
///     .state("OFF", StateBuilder::new().on("start", "ON"))
///     .state("ON", StateBuilder::new().on("stop", "OFF"))
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     encode(&config),
///     "stateDiagram-v2\n    [*] --> OFF\n    OFF --> ON: start\n    ON --> OFF: stop\n"
/// );
/// ```
pub fn encode<C>(config: &MachineConfig<C>) -> String {
    Diagram::from_config(config).render()
}

pub(super) fn render(diagram: &Diagram) -> String {
    let mut lines = vec![
        HEADER.to_string(),
        format!("{INDENT}[*] --> {}", diagram.initial),
    ];

    for transition in &diagram.transitions {
        for (index, edge) in transition.edges.iter().enumerate() {
            let target = edge.target.as_deref().unwrap_or(&transition.source);
            lines.push(format!(
                "{INDENT}{} --> {}: {}",
                transition.source,
                target,
                label(transition, index, edge)
            ));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Build `event [guard] / (action)` for one edge.
fn label(transition: &DiagramTransition, index: usize, edge: &DiagramEdge) -> String {
    let mut parts = vec![if is_wildcard(&transition.event) {
        ANY_EVENT.to_string()
    } else {
        transition.event.clone()
    }];

    if let Some(guard) = &edge.guard {
        parts.push(match (&guard.label, transition.sequence) {
            (Some(text), _) => format!("[guard {}]", quoted(text, is_number(text))),
            (None, true) => format!("[guard {}]", index + 1),
            (None, false) => "[guarded]".to_string(),
        });
    }

    let internal = edge.target.is_none();
    if edge.action.is_some() || internal {
        let mut clause = String::from("/ (action");
        if internal {
            clause.push_str(" internal");
        }
        if let Some(text) = edge.action.as_ref().and_then(|a| a.label.as_deref()) {
            clause.push(' ');
            clause.push_str(&quoted(text, strip_keyword(text, "internal").is_some()));
        }
        clause.push(')');
        parts.push(clause);
    }

    parts.join(" ")
}

/// Quote label text that would otherwise read back as a marker.
fn quoted(text: &str, reserved: bool) -> String {
    if reserved || is_quoted(text) {
        format!("\"{text}\"")
    } else {
        text.to_string()
    }
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

fn is_number(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Strip a leading marker keyword that is followed by whitespace or nothing.
pub(super) fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    text.strip_prefix(keyword)
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}
