//! End-to-end scenarios across the engine, codec, composer and validation.

use serde_json::{json, Value};
use statewright::builder::{MachineBuilder, StateBuilder};
use statewright::compose::{compose_fsm_config, ComposeOptions, ContextPolicy, TransitionPolicy};
use statewright::core::{MachineConfig, Payload, StateTransition, TransitionEdge, TransitionKind};
use statewright::diagram::{decode, encode, parse};
use statewright::machine::{Machine, MachineError};
use statewright::validation::validate_config;
use std::sync::{Arc, Mutex};

fn attempts(context: &Value) -> i64 {
    context["attempts"].as_i64().unwrap_or(0)
}

fn max(context: &Value) -> i64 {
    context["max"].as_i64().unwrap_or(0)
}

fn retry_config() -> MachineConfig<Value> {
    MachineBuilder::new()
        .initial("IDLE")
        .context(json!({ "attempts": 0, "max": 2 }))
        .state("IDLE", StateBuilder::new().on("fetch", "FETCHING"))
        .state(
            "FETCHING",
            StateBuilder::new()
                .on_enter(|c: &mut Value, _: &Payload| c["attempts"] = json!(attempts(c) + 1))
                .on("resolve", "IDLE")
                .on(
                    "reject",
                    vec![
                        TransitionEdge::to("RETRYING")
                            .guard(|c: &Value, _: &Payload| attempts(c) < max(c)),
                        TransitionEdge::to("FAILED")
                            .guard(|c: &Value, _: &Payload| attempts(c) >= max(c)),
                    ],
                ),
        )
        .state("RETRYING", StateBuilder::new().on("retry", "FETCHING"))
        .state("FAILED", StateBuilder::new().on("*", "IDLE"))
        .build()
        .unwrap()
}

#[test]
fn retry_scenario_progresses_to_failure() {
    let mut machine = Machine::new(retry_config());
    let mut observed = Vec::new();

    for event in ["fetch", "reject", "retry", "reject"] {
        let state = machine.transition(event, None).unwrap();
        observed.push((state, attempts(machine.context())));
    }

    assert_eq!(
        observed,
        vec![
            ("FETCHING".to_string(), 1),
            ("RETRYING".to_string(), 1),
            ("FETCHING".to_string(), 2),
            ("FAILED".to_string(), 2),
        ]
    );
    assert_eq!(
        machine.history().path(),
        vec!["IDLE", "FETCHING", "RETRYING", "FETCHING", "FAILED"]
    );
}

#[test]
fn wildcard_recovers_from_failure_and_reset_restores_context() {
    let mut machine = Machine::new(retry_config());
    for event in ["fetch", "reject", "retry", "reject"] {
        machine.transition(event, None).unwrap();
    }

    assert!(machine.can_transition("anything", None));
    assert_eq!(machine.transition("anything", None).unwrap(), "IDLE");

    machine.reset();
    assert!(machine.is("IDLE"));
    assert_eq!(machine.context(), &json!({ "attempts": 0, "max": 2 }));
    assert!(machine.history().is_empty());
}

#[test]
fn refused_event_depends_on_assert_mode() {
    let mut machine = Machine::new(retry_config());

    let err = machine.transition("retry", None).unwrap_err();
    assert!(matches!(
        err,
        MachineError::InvalidTransition { ref state, ref event }
            if state == "IDLE" && event == "retry"
    ));

    assert_eq!(machine.transition_with("retry", None, false).unwrap(), "IDLE");
    assert!(machine.history().is_empty());
}

#[test]
fn subscribers_observe_every_change() {
    let mut machine = Machine::new(retry_config());
    let seen: Arc<Mutex<Vec<(TransitionKind, String)>>> = Arc::default();

    let sink = Arc::clone(&seen);
    machine.subscribe(move |_: &mut Machine<Value>, record: &StateTransition| {
        sink.lock().unwrap().push((record.kind, record.to.clone()));
    });

    machine.transition("fetch", None).unwrap();
    machine.transition("reject", None).unwrap();
    machine.reset();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (TransitionKind::External, "FETCHING".to_string()),
            (TransitionKind::External, "RETRYING".to_string()),
            (TransitionKind::Reset, "IDLE".to_string()),
        ]
    );
}

#[test]
fn retry_config_encodes_with_sequence_markers() {
    let text = encode(&retry_config());

    assert_eq!(
        text,
        "stateDiagram-v2\n\
         \x20   [*] --> IDLE\n\
         \x20   IDLE --> FETCHING: fetch\n\
         \x20   FETCHING --> IDLE: resolve\n\
         \x20   FETCHING --> RETRYING: reject [guard 1]\n\
         \x20   FETCHING --> FAILED: reject [guard 2]\n\
         \x20   RETRYING --> FETCHING: retry\n\
         \x20   FAILED --> IDLE: * (any)\n"
    );
}

#[test]
fn string_graph_round_trips_unchanged() {
    let config: MachineConfig<()> = MachineBuilder::new()
        .initial("OFF")
        .state("OFF", StateBuilder::new().on("start", "ON"))
        .state("ON", StateBuilder::new().on("stop", "OFF"))
        .build()
        .unwrap();

    let text = encode(&config);
    let decoded: MachineConfig<()> = decode(&text).unwrap();

    assert_eq!(encode(&decoded), text);
    assert_eq!(
        text,
        "stateDiagram-v2\n    [*] --> OFF\n    OFF --> ON: start\n    ON --> OFF: stop\n"
    );
}

#[test]
fn decoded_diagram_drives_a_machine() {
    let text = "\
stateDiagram-v2
    [*] --> IDLE
    IDLE --> FETCHING: fetch
    FETCHING --> FETCHING: progress / (action internal)
    FETCHING --> DONE: resolve [guarded]
";
    let config: MachineConfig<Value> = decode(text).unwrap();
    assert!(validate_config(&config).is_success());

    let mut machine = Machine::new(config);
    machine.transition("fetch", None).unwrap();
    machine.transition("progress", Some(&json!({ "loaded": 10 }))).unwrap();
    assert!(machine.is("FETCHING"));
    assert_eq!(machine.history().last().unwrap().kind, TransitionKind::Internal);

    // Placeholder guards always permit.
    assert_eq!(machine.transition("resolve", None).unwrap(), "DONE");
    assert!(!machine.can_transition("fetch", None));
}

#[test]
fn malformed_diagrams_are_rejected() {
    assert!(parse("IDLE --> FETCHING: fetch\n").is_err());
    assert!(parse("stateDiagram-v2\n    IDLE --> FETCHING: fetch\n").is_err());
}

#[test]
fn prepended_login_gate_blocks_unauthenticated_submit() {
    let base = MachineBuilder::new()
        .initial("IDLE")
        .context(json!({ "authenticated": false }))
        .state("IDLE", StateBuilder::new().on("submit", TransitionEdge::to("PROCESSING")))
        .state("PROCESSING", StateBuilder::new())
        .fragment();
    let auth = MachineBuilder::new()
        .state(
            "IDLE",
            StateBuilder::new().on(
                "submit",
                TransitionEdge::to("LOGIN_REQUIRED")
                    .guard(|c: &Value, _: &Payload| c["authenticated"] != json!(true)),
            ),
        )
        .state("LOGIN_REQUIRED", StateBuilder::new().on("login", "IDLE"))
        .fragment();

    let options = ComposeOptions::new().transitions(TransitionPolicy::Prepend);
    let config = compose_fsm_config(vec![base, auth], options).unwrap();
    assert!(validate_config(&config).is_success());

    let mut machine = Machine::new(config);
    assert_eq!(machine.transition("submit", None).unwrap(), "LOGIN_REQUIRED");
}

#[test]
fn merged_contexts_combine_keys_with_later_winning() {
    let first = MachineBuilder::new()
        .initial("A")
        .context(json!({ "a": 1, "shared": "first" }))
        .state("A", StateBuilder::new())
        .fragment();
    let second = MachineBuilder::new()
        .context_factory(|| json!({ "b": 2, "shared": "second" }))
        .fragment();

    let options = ComposeOptions::new().context(ContextPolicy::Merge);
    let config = compose_fsm_config(vec![first, second], options).unwrap();
    let mut machine = Machine::new(config);

    assert_eq!(
        machine.context(),
        &json!({ "a": 1, "b": 2, "shared": "second" })
    );

    machine.reset();
    assert_eq!(machine.context()["b"], json!(2));
}
