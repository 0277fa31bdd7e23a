//! Rust source skeletons generated from a diagram.

use super::{Annotation, Diagram, DiagramEdge, DiagramTransition};
use crate::core::is_wildcard;
use indexmap::{IndexMap, IndexSet};

/// Options for [`generate_skeleton`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkeletonOptions {
    /// Path the generated code uses to import this crate.
    pub crate_path: String,
    /// Name of the generated configuration function.
    pub function_name: String,
}

impl Default for SkeletonOptions {
    fn default() -> Self {
        Self {
            crate_path: "statewright".to_string(),
            function_name: "machine_config".to_string(),
        }
    }
}

impl SkeletonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crate_path(mut self, path: impl Into<String>) -> Self {
        self.crate_path = path.into();
        self
    }

    pub fn function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = name.into();
        self
    }
}

/// Generate a Rust module declaring the diagram's states and events as enums
/// and a function that builds the transition graph.
///
/// Guards are stubbed to return `true` and actions to do nothing. Each stub
/// carries a `TODO` comment quoting the label text from the diagram.
///
/// # Example
///
/// ```rust
/// use statewright::diagram::{generate_skeleton, parse, SkeletonOptions};
///
/// let text = "stateDiagram-v2\n[*] --> IDLE\nIDLE --> FETCHING: fetch [guard online]\n";
/// let diagram = parse(text).unwrap();
/// let source = generate_skeleton(&diagram, &SkeletonOptions::default());
///
/// assert!(source.contains("pub enum State {"));
/// assert!(source.contains("Fetching,"));
/// assert!(source.contains("// TODO: guard: online"));
/// ```
pub fn generate_skeleton(diagram: &Diagram, options: &SkeletonOptions) -> String {
    let states = Variants::new("State", diagram.states.iter().map(String::as_str));
    let events = Variants::new(
        "Event",
        diagram
            .events()
            .into_iter()
            .filter(|event| !is_wildcard(event)),
    );

    let needs_payload = diagram
        .transitions
        .iter()
        .flat_map(|t| &t.edges)
        .any(|edge| edge.guard.is_some() || edge.action.is_some());
    let needs_edge = diagram.transitions.iter().any(|t| !is_shorthand(t));

    let mut src = Source::default();
    src.line(0, "//! State machine skeleton generated from a state diagram.");
    src.line(0, "//!");
    src.line(0, "//! Guards and actions are stubs. Replace each `TODO` with real logic.");
    src.blank();

    let crate_path = &options.crate_path;
    src.line(
        0,
        format!("use {crate_path}::builder::{{BuildError, MachineBuilder, StateBuilder}};"),
    );
    let mut core_imports = vec!["Context", "MachineConfig"];
    if needs_payload {
        core_imports.push("Payload");
    }
    if needs_edge {
        core_imports.push("TransitionEdge");
    }
    src.line(0, format!("use {crate_path}::core::{{{}}};", core_imports.join(", ")));
    src.blank();

    states.write_enum(&mut src, "States declared in the diagram.");
    src.blank();
    events.write_enum(
        &mut src,
        "Events declared in the diagram. The wildcard `*` has no variant.",
    );
    src.blank();

    write_builder(&mut src, diagram, options, &states, &events);
    src.finish()
}

/// Whether a transition is a single unguarded edge to a target.
fn is_shorthand(transition: &DiagramTransition) -> bool {
    !transition.sequence && matches!(transition.edges.as_slice(), [edge] if edge.is_bare())
}

fn write_builder(
    src: &mut Source,
    diagram: &Diagram,
    options: &SkeletonOptions,
    states: &Variants<'_>,
    events: &Variants<'_>,
) {
    src.line(
        0,
        format!(
            "pub fn {}<C: Context>() -> Result<MachineConfig<C>, BuildError> {{",
            options.function_name
        ),
    );
    src.line(1, "MachineBuilder::new()");
    src.line(2, format!(".initial({})", states.expr(&diagram.initial)));

    for state in &diagram.states {
        let transitions: Vec<&DiagramTransition> = diagram
            .transitions
            .iter()
            .filter(|t| &t.source == state)
            .collect();

        if transitions.is_empty() {
            src.line(2, format!(".state({}, StateBuilder::new())", states.expr(state)));
            continue;
        }

        src.line(2, ".state(");
        src.line(3, format!("{},", states.expr(state)));
        src.line(3, "StateBuilder::new()");
        for transition in transitions {
            let event = events.expr(&transition.event);
            if is_shorthand(transition) {
                let target = transition.edges[0].target.as_deref().unwrap_or(state);
                src.line(4, format!(".on({event}, {})", states.expr(target)));
                continue;
            }

            src.line(4, ".on(");
            src.line(5, format!("{event},"));
            if transition.sequence || transition.edges.len() != 1 {
                src.line(5, "vec![");
                for edge in &transition.edges {
                    write_edge(src, 6, edge, states);
                }
                src.line(5, "],");
            } else {
                write_edge(src, 5, &transition.edges[0], states);
            }
            src.line(4, ")");
        }
        src.line(2, ")");
    }

    src.line(2, ".build()");
    src.line(0, "}");
}

fn write_edge(src: &mut Source, depth: usize, edge: &DiagramEdge, states: &Variants<'_>) {
    let mut lines = vec![match &edge.target {
        Some(target) => format!("TransitionEdge::to({})", states.expr(target)),
        None => "TransitionEdge::internal()".to_string(),
    }];
    let mut comments = Vec::new();

    if let Some(guard) = &edge.guard {
        comments.push((lines.len(), todo("guard", guard)));
        lines.push(".guard(|_context: &C, _payload: &Payload| true)".to_string());
    }
    if let Some(action) = &edge.action {
        comments.push((lines.len(), todo("action", action)));
        lines.push(".action(|_context: &mut C, _payload: &Payload| {})".to_string());
    }

    let last = lines.len() - 1;
    for (index, line) in lines.iter().enumerate() {
        let indent = if index == 0 { depth } else { depth + 1 };
        if let Some((_, comment)) = comments.iter().find(|(at, _)| *at == index) {
            src.line(indent, comment);
        }
        if index == last {
            src.line(indent, format!("{line},"));
        } else {
            src.line(indent, line);
        }
    }
}

fn todo(kind: &str, annotation: &Annotation) -> String {
    match &annotation.label {
        Some(text) => format!("// TODO: {kind}: {text}"),
        None => format!("// TODO: implement {kind}"),
    }
}

/// Mapping from literal names to unique enum variant identifiers.
struct Variants<'a> {
    name: &'static str,
    idents: IndexMap<&'a str, String>,
}

impl<'a> Variants<'a> {
    fn new(name: &'static str, literals: impl Iterator<Item = &'a str>) -> Self {
        let mut used = IndexSet::new();
        let mut idents = IndexMap::new();
        for literal in literals {
            if idents.contains_key(literal) {
                continue;
            }
            let base = pascal_case(literal);
            let mut ident = base.clone();
            let mut suffix = 2;
            while used.contains(&ident) {
                ident = format!("{base}{suffix}");
                suffix += 1;
            }
            used.insert(ident.clone());
            idents.insert(literal, ident);
        }
        Self { name, idents }
    }

    /// Expression yielding the literal: a variant's `as_str()`, or the raw
    /// string when the name has no variant.
    fn expr(&self, literal: &str) -> String {
        match self.idents.get(literal) {
            Some(ident) => format!("{}::{ident}.as_str()", self.name),
            None => format!("{literal:?}"),
        }
    }

    fn write_enum(&self, src: &mut Source, doc: &str) {
        let name = self.name;
        src.line(0, format!("/// {doc}"));
        src.line(0, "#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]");
        src.line(0, format!("pub enum {name} {{"));
        for ident in self.idents.values() {
            src.line(1, format!("{ident},"));
        }
        src.line(0, "}");
        src.blank();

        let all = self
            .idents
            .values()
            .map(|ident| format!("{name}::{ident}"))
            .collect::<Vec<_>>()
            .join(", ");
        src.line(0, format!("impl {name} {{"));
        src.line(1, format!("pub const ALL: &'static [{name}] = &[{all}];"));
        src.blank();
        src.line(1, "pub fn as_str(&self) -> &'static str {");
        src.line(2, "match *self {");
        for (literal, ident) in &self.idents {
            src.line(3, format!("{name}::{ident} => {literal:?},"));
        }
        src.line(2, "}");
        src.line(1, "}");
        src.line(0, "}");
    }
}

/// Convert a state or event name to an enum variant identifier.
///
/// `FETCHING` becomes `Fetching`, `attemptLogin` becomes `AttemptLogin` and
/// `LOGGED_IN` becomes `LoggedIn`.
fn pascal_case(literal: &str) -> String {
    let mut ident = String::new();
    for word in literal
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        let shouting = !word.chars().any(|c| c.is_ascii_lowercase());
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            ident.push(first.to_ascii_uppercase());
            if shouting {
                ident.extend(chars.map(|c| c.to_ascii_lowercase()));
            } else {
                ident.extend(chars);
            }
        }
    }

    if ident.is_empty() {
        ident.push_str("Unnamed");
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, 'V');
    }
    if ident == "Self" {
        ident.push('_');
    }
    ident
}

/// Indented line buffer.
#[derive(Default)]
struct Source {
    lines: Vec<String>,
}

impl Source {
    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", "    ".repeat(depth), text.as_ref()));
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}
