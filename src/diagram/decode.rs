//! Diagram text to configuration.
//!
//! The parser is tolerant: anything that is not a labeled transition or an
//! initial-state marker is skipped. Only a missing header or a missing
//! initial state is an error.

use super::encode::{strip_keyword, ANY_EVENT};
use super::{Annotation, Diagram, DiagramEdge, DiagramTransition, ParseError};
use crate::core::{MachineConfig, WILDCARD};
use indexmap::{IndexMap, IndexSet};

const START: &str = "[*]";

/// Lines that carry presentation only.
const IGNORED_KEYWORDS: &[&str] = &[
    "direction",
    "classDef",
    "class",
    "style",
    "linkStyle",
    "accTitle",
    "accDescr",
    "title",
];

/// Decode diagram text into a configuration with placeholder guards and
/// actions.
///
/// # Example
///
/// ```rust
/// use statewright::core::MachineConfig;
/// use statewright::diagram::decode;
///
/// let text = "stateDiagram-v2\n    [*] --> OFF\n    OFF --> ON: start\n    ON --> OFF: stop\n";
/// let config: MachineConfig<()> = decode(text).unwrap();
///
/// assert_eq!(config.initial, "OFF");
/// assert_eq!(config.states.keys().collect::<Vec<_>>(), vec!["OFF", "ON"]);
/// ```
pub fn decode<C>(text: &str) -> Result<MachineConfig<C>, ParseError> {
    parse(text).map(Diagram::into_config)
}

/// Parse diagram text into the intermediate graph.
///
/// States are ordered by first appearance as a transition source, followed
/// by states that are only ever targets (or only the initial state). The
/// first top-level `[*] --> X` line sets the initial state; without one, the
/// first `[*] --> X` inside a composite state is used.
pub fn parse(text: &str) -> Result<Diagram, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let header = lines
        .iter()
        .position(|line| is_header(line))
        .ok_or(ParseError::MissingHeader)?;

    let mut parser = Parser::default();
    for (offset, raw) in lines[header + 1..].iter().enumerate() {
        parser.line(header + offset + 2, raw.trim());
    }
    parser.finish()
}

fn is_header(line: &str) -> bool {
    matches!(
        line.split_whitespace().next(),
        Some("stateDiagram" | "stateDiagram-v2")
    )
}

#[derive(Default)]
struct Parser {
    initial: Option<String>,
    nested_initial: Option<String>,
    sources: IndexSet<String>,
    mentioned: IndexSet<String>,
    transitions: IndexMap<(String, String), DiagramTransition>,
    depth: usize,
    in_note: bool,
}

impl Parser {
    fn line(&mut self, number: usize, line: &str) {
        if self.in_note {
            if line == "end note" {
                self.in_note = false;
            }
            return;
        }

        if line.is_empty() || line.starts_with("%%") {
            return;
        }

        let keyword = line.split_whitespace().next().unwrap_or_default();
        if keyword == "note" {
            // Single-line notes carry their text after a colon.
            self.in_note = !line.contains(':');
            return;
        }
        if IGNORED_KEYWORDS.contains(&keyword) {
            return;
        }
        if line == "}" {
            self.depth = self.depth.saturating_sub(1);
            return;
        }
        if keyword == "state" {
            if line.ends_with('{') {
                self.depth += 1;
            }
            return;
        }

        match line.split_once("-->") {
            Some((lhs, rhs)) => self.arrow(number, strip_class(lhs.trim()), rhs.trim()),
            None => tracing::trace!(line = number, content = line, "skipping diagram line"),
        }
    }

    fn arrow(&mut self, number: usize, source: &str, rhs: &str) {
        let (target, label) = split_target(rhs);

        if source == START {
            if target.is_empty() {
                return;
            }
            if self.depth == 0 && self.initial.is_none() {
                self.mentioned.insert(target.to_string());
                self.initial = Some(target.to_string());
            } else if self.depth > 0 && self.nested_initial.is_none() {
                self.nested_initial = Some(target.to_string());
            }
            return;
        }
        if target == START {
            self.mentioned.insert(source.to_string());
            return;
        }

        let Some(label) = label.map(parse_label).filter(|l| !l.event.is_empty()) else {
            tracing::trace!(line = number, source, target, "skipping unlabeled transition");
            return;
        };
        if source.is_empty() || target.is_empty() {
            tracing::trace!(line = number, "skipping transition without endpoints");
            return;
        }

        self.sources.insert(source.to_string());
        self.mentioned.insert(source.to_string());
        self.mentioned.insert(target.to_string());

        let internal = label.action.as_ref().is_some_and(|a| a.internal) && source == target;
        let edge = DiagramEdge {
            target: (!internal).then(|| target.to_string()),
            guard: label.guard.as_ref().map(|g| Annotation::new(g.label.clone())),
            action: label.action.map(|a| Annotation::new(a.label)),
        };
        let numbered = label.guard.is_some_and(|g| g.numbered);

        let transition = self
            .transitions
            .entry((source.to_string(), label.event.clone()))
            .or_insert_with(|| DiagramTransition {
                source: source.to_string(),
                event: label.event,
                sequence: false,
                edges: Vec::new(),
            });
        transition.edges.push(edge);
        transition.sequence |= numbered || transition.edges.len() > 1;
    }

    fn finish(self) -> Result<Diagram, ParseError> {
        let initial = self
            .initial
            .or(self.nested_initial)
            .ok_or(ParseError::MissingInitialState)?;

        let mut states = self.sources;
        states.extend(self.mentioned);
        states.insert(initial.clone());

        Ok(Diagram {
            initial,
            states: states.into_iter().collect(),
            transitions: self.transitions.into_values().collect(),
        })
    }
}

/// Drop a `:::className` suffix from a state reference.
fn strip_class(name: &str) -> &str {
    name.split_once(":::").map_or(name, |(name, _)| name).trim()
}

/// Split `Target: label` into the target and optional label.
fn split_target(rhs: &str) -> (&str, Option<&str>) {
    if let Some((target, rest)) = rhs.split_once(":::") {
        let label = rest.split_once(':').map(|(_, label)| label.trim());
        return (target.trim(), label);
    }
    match rhs.split_once(':') {
        Some((target, label)) => (target.trim(), Some(label.trim())),
        None => (rhs.trim(), None),
    }
}

#[derive(Debug, PartialEq)]
struct GuardMarker {
    label: Option<String>,
    numbered: bool,
}

#[derive(Debug, PartialEq)]
struct ActionMarker {
    internal: bool,
    label: Option<String>,
}

#[derive(Debug, PartialEq)]
struct Label {
    event: String,
    guard: Option<GuardMarker>,
    action: Option<ActionMarker>,
}

/// Parse `event [guard ...] / (action ...)`.
fn parse_label(label: &str) -> Label {
    let mut rest = label.trim();

    let mut action = None;
    if let Some(open) = rest.rfind("(action") {
        let before = rest[..open].trim_end();
        if rest.ends_with(')') && before.ends_with('/') {
            let inner = &rest[open + "(action".len()..rest.len() - 1];
            if inner.is_empty() || inner.starts_with(char::is_whitespace) {
                action = Some(action_marker(inner.trim()));
                rest = before[..before.len() - 1].trim_end();
            }
        }
    }

    // The clause opens at the first ` [guard` token, so labels may contain brackets.
    let mut guard = None;
    if rest.ends_with(']') {
        let clause = rest.match_indices(" [guard").find_map(|(open, _)| {
            guard_marker(rest[open + 2..rest.len() - 1].trim()).map(|marker| (open, marker))
        });
        if let Some((open, marker)) = clause {
            guard = Some(marker);
            rest = rest[..open].trim_end();
        }
    }

    let event = match rest {
        ANY_EVENT | WILDCARD => WILDCARD.to_string(),
        other => other.to_string(),
    };

    Label {
        event,
        guard,
        action,
    }
}

fn action_marker(inner: &str) -> ActionMarker {
    let (internal, text) = match strip_keyword(inner, "internal") {
        Some(rest) => (true, rest.trim()),
        None => (false, inner),
    };
    ActionMarker {
        internal,
        label: non_empty(unquote(text)),
    }
}

fn guard_marker(inner: &str) -> Option<GuardMarker> {
    if inner == "guarded" {
        return Some(GuardMarker {
            label: None,
            numbered: false,
        });
    }
    let text = strip_keyword(inner, "guard")?.trim();
    let numbered = !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
    Some(GuardMarker {
        label: if numbered { None } else { non_empty(unquote(text)) },
        numbered,
    })
}

/// Labels that would read as markers are written between double quotes.
fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
