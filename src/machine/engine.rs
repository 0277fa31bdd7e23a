//! Machine that resolves and executes transitions synchronously.

use crate::core::{
    payload_or_null, Context, MachineConfig, Payload, StateConfig, StateHistory, StateTransition,
    TransitionKind,
};
use crate::logging::{Logger, TracingLogger};
use crate::machine::error::MachineError;
use std::fmt;
use std::sync::Arc;

/// Callback notified after every executed transition and reset.
///
/// Subscribers receive the machine mutably and may call
/// [`Machine::transition`] again from inside the callback.
pub type Subscriber<C> = Arc<dyn Fn(&mut Machine<C>, &StateTransition) + Send + Sync>;

/// Handle returned by [`Machine::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Finite-state machine executing a [`MachineConfig`].
///
/// # Example
///
/// ```rust
/// use statewright::builder::{MachineBuilder, StateBuilder};
/// use statewright::machine::Machine;
///
/// let config = MachineBuilder::<()>::new()
///     .initial("OFF")
///     .state("OFF", StateBuilder::new().on("start", "ON"))
///     .state("ON", StateBuilder::new().on("stop", "OFF"))
///     .build()
///     .unwrap();
///
/// let mut machine = Machine::new(config);
/// assert_eq!(machine.transition("start", None).unwrap(), "ON");
/// assert_eq!(machine.previous(), Some("OFF"));
/// assert!(!machine.can_transition("start", None));
/// ```
pub struct Machine<C: Context> {
    config: Arc<MachineConfig<C>>,
    logger: Arc<dyn Logger>,
    current: String,
    previous: Option<String>,
    context: C,
    history: StateHistory,
    subscribers: Vec<(SubscriptionId, Subscriber<C>)>,
    next_subscription: u64,
}

impl<C: Context> Machine<C> {
    /// Create a machine in the configured initial state.
    ///
    /// The initial state is not checked here; a missing definition surfaces
    /// as a configuration error on the first transition.
    pub fn new(config: MachineConfig<C>) -> Self {
        let logger = config
            .logger
            .clone()
            .unwrap_or_else(|| Arc::new(TracingLogger));
        Self {
            current: config.initial.clone(),
            previous: None,
            context: config.produce_context(),
            history: StateHistory::new(config.history_limit),
            config: Arc::new(config),
            logger,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Get current state (pure)
    pub fn state(&self) -> &str {
        &self.current
    }

    /// State before the last external transition, if any.
    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn config(&self) -> &MachineConfig<C> {
        &self.config
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Check whether the machine is in `state`.
    pub fn is(&self, state: &str) -> bool {
        self.current == state
    }

    /// Request a transition, failing when the event is not accepted.
    pub fn transition(
        &mut self,
        event: &str,
        payload: Option<&Payload>,
    ) -> Result<String, MachineError> {
        self.transition_with(event, payload, true)
    }

    /// Request a transition.
    ///
    /// Resolution looks up `event` in the current state's `on` mapping,
    /// falling back to the wildcard entry, and selects the first edge whose
    /// guard is absent or passes. Guards see a clone of the context.
    ///
    /// When nothing matches, `assert` decides between returning
    /// [`MachineError::InvalidTransition`] and returning the unchanged
    /// state without side effects. A state that is undefined or has no `on`
    /// mapping is always an error.
    ///
    /// An internal edge (no target) runs only its action. An external edge,
    /// including a self-loop, runs `on_exit` of the old state, the action,
    /// switches state, then runs `on_enter` of the new state. Subscribers
    /// are notified last.
    ///
    /// Panics raised by guards, actions or hooks propagate to the caller and
    /// may leave this one transition partially applied.
    ///
    /// Returns the current state after subscribers have run.
    pub fn transition_with(
        &mut self,
        event: &str,
        payload: Option<&Payload>,
        assert: bool,
    ) -> Result<String, MachineError> {
        let payload = payload_or_null(payload);
        let config = Arc::clone(&self.config);
        let state = state_config(&config, &self.current)?;

        self.debug(|| format!("transition requested: `{}` on `{}`", event, self.current));

        let snapshot = self.context.clone();
        let resolved = state
            .definition(event)
            .and_then(|definition| definition.resolve(&snapshot, payload));

        let Some(edge) = resolved else {
            self.debug(|| format!("transition refused: `{}` on `{}`", event, self.current));
            if assert {
                return Err(MachineError::InvalidTransition {
                    state: self.current.clone(),
                    event: event.to_string(),
                });
            }
            return Ok(self.current.clone());
        };

        let record = match edge.target {
            None => {
                if let Some(action) = edge.action {
                    action.run(&mut self.context, payload);
                }
                self.debug(|| format!("internal transition: `{}` on `{}`", event, self.current));
                StateTransition::new(
                    TransitionKind::Internal,
                    Some(event),
                    self.current.as_str(),
                    self.current.as_str(),
                )
            }
            Some(target) => {
                if let Some(hook) = &state.on_exit {
                    hook.call(&mut self.context, payload);
                }
                if let Some(action) = edge.action {
                    action.run(&mut self.context, payload);
                }
                let from = std::mem::replace(&mut self.current, target.to_string());
                self.previous = Some(from.clone());
                if let Some(hook) = config.state(target).and_then(|s| s.on_enter.as_ref()) {
                    hook.call(&mut self.context, payload);
                }
                self.debug(|| format!("state changed: `{}` -> `{}` via `{}`", from, target, event));
                StateTransition::new(TransitionKind::External, Some(event), from, target)
            }
        };

        self.history.record(record.clone());
        self.notify(&record);
        Ok(self.current.clone())
    }

    /// Dry-run query: would [`Machine::transition`] succeed?
    ///
    /// Never mutates state or context. Guards run against a clone of the
    /// context.
    pub fn can_transition(&self, event: &str, payload: Option<&Payload>) -> bool {
        let Ok(state) = state_config(&self.config, &self.current) else {
            return false;
        };
        let snapshot = self.context.clone();
        state
            .definition(event)
            .and_then(|definition| definition.resolve(&snapshot, payload_or_null(payload)))
            .is_some()
    }

    /// Restore the initial state and a fresh context, clear history and
    /// notify subscribers once.
    pub fn reset(&mut self) -> &mut Self {
        let initial = self.config.initial.clone();
        let from = std::mem::replace(&mut self.current, initial);
        self.previous = None;
        self.context = self.config.produce_context();
        self.history.clear();
        self.debug(|| format!("reset: `{}` -> `{}`", from, self.current));

        let record =
            StateTransition::new(TransitionKind::Reset, None, from, self.current.as_str());
        self.notify(&record);
        self
    }

    /// Register a callback run after every transition and reset.
    ///
    /// Notification is synchronous and reentrant: the callback may call
    /// [`Machine::transition`]. Nothing guards against unbounded recursion,
    /// so a subscriber that re-triggers a self-loop on every notification
    /// never returns.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&mut Machine<C>, &StateTransition) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Arc::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, record: &StateTransition) {
        let subscribers = self.subscribers.clone();
        for (id, subscriber) in subscribers {
            // Skip subscribers removed earlier in this round.
            if self.subscribers.iter().any(|(existing, _)| *existing == id) {
                subscriber(self, record);
            }
        }
    }

    fn debug(&self, message: impl FnOnce() -> String) {
        if self.config.debug {
            self.logger.debug(&message());
        }
    }
}

fn state_config<'a, C>(
    config: &'a MachineConfig<C>,
    state: &str,
) -> Result<&'a StateConfig<C>, MachineError> {
    let Some(state_config) = config.state(state) else {
        return Err(MachineError::Configuration {
            state: state.to_string(),
            reason: "state is not defined".to_string(),
        });
    };
    if state_config.on.is_none() {
        return Err(MachineError::Configuration {
            state: state.to_string(),
            reason: "state has no `on` mapping".to_string(),
        });
    }
    Ok(state_config)
}

impl<C: Context + fmt::Debug> fmt::Debug for Machine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("context", &self.context)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{MachineBuilder, StateBuilder};
    use crate::core::{StateConfig, TransitionEdge};
    use serde_json::json;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    #[derive(Clone, Default, Debug, PartialEq)]
    struct Counter {
        value: i64,
        log: Vec<String>,
    }

    fn push(c: &mut Counter, entry: &str) {
        c.log.push(entry.to_string());
    }

    fn switch() -> MachineConfig<Counter> {
        MachineBuilder::new()
            .initial("OFF")
            .state("OFF", StateBuilder::new().on("start", "ON"))
            .state(
                "ON",
                StateBuilder::new()
                    .on("stop", "OFF")
                    .on(
                        "tick",
                        TransitionEdge::internal().action(|c: &mut Counter, _: &Payload| {
                            c.value += 1
                        }),
                    )
                    .on_enter(|c: &mut Counter, _: &Payload| push(c, "enter ON"))
                    .on_exit(|c: &mut Counter, _: &Payload| push(c, "exit ON")),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn external_transition_changes_state() {
        let mut machine = Machine::new(switch());

        assert_eq!(machine.transition("start", None).unwrap(), "ON");
        assert!(machine.is("ON"));
        assert_eq!(machine.previous(), Some("OFF"));
        assert_eq!(machine.context().log, vec!["enter ON"]);
    }

    #[test]
    fn unknown_event_fails_in_assert_mode() {
        let mut machine = Machine::new(switch());
        let err = machine.transition("stop", None).unwrap_err();

        assert_eq!(
            err,
            MachineError::InvalidTransition {
                state: "OFF".to_string(),
                event: "stop".to_string(),
            }
        );
        assert!(machine.is("OFF"));
    }

    #[test]
    fn unknown_event_returns_current_state_when_not_asserting() {
        let mut machine = Machine::new(switch());
        let notified = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&notified);
        machine.subscribe(move |_, _| *seen.lock().unwrap() += 1);

        assert_eq!(machine.transition_with("stop", None, false).unwrap(), "OFF");
        assert_eq!(*notified.lock().unwrap(), 0);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn missing_on_mapping_is_fatal_in_both_modes() {
        let config: MachineConfig<Counter> = MachineBuilder::new()
            .initial("BROKEN")
            .state_config("BROKEN", StateConfig::default())
            .build()
            .unwrap();
        let mut machine = Machine::new(config);

        assert!(machine.transition("go", None).unwrap_err().is_configuration());
        assert!(machine
            .transition_with("go", None, false)
            .unwrap_err()
            .is_configuration());
        assert!(!machine.can_transition("go", None));
    }

    #[test]
    fn undefined_initial_state_is_reported_lazily() {
        let config: MachineConfig<Counter> = MachineBuilder::new()
            .initial("NOWHERE")
            .state("OFF", StateBuilder::new())
            .build()
            .unwrap();
        let mut machine = Machine::new(config);

        assert!(machine.is("NOWHERE"));
        let err = machine.transition_with("go", None, false).unwrap_err();
        assert!(err.to_string().contains("state is not defined"));
    }

    #[test]
    fn internal_transition_runs_action_only() {
        let mut machine = Machine::new(switch());
        machine.transition("start", None).unwrap();
        let notified = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&notified);
        machine.subscribe(move |_, record| seen.lock().unwrap().push(record.kind));

        assert_eq!(machine.transition("tick", None).unwrap(), "ON");

        assert_eq!(machine.context().value, 1);
        assert_eq!(machine.context().log, vec!["enter ON"]);
        assert_eq!(machine.previous(), Some("OFF"));
        assert_eq!(*notified.lock().unwrap(), vec![TransitionKind::Internal]);
    }

    #[test]
    fn self_loop_runs_exit_action_enter() {
        let config: MachineConfig<Counter> = MachineBuilder::new()
            .initial("POLL")
            .state(
                "POLL",
                StateBuilder::new()
                    .on(
                        "refresh",
                        TransitionEdge::to("POLL")
                            .action(|c: &mut Counter, _: &Payload| push(c, "action")),
                    )
                    .on_enter(|c: &mut Counter, _: &Payload| push(c, "enter"))
                    .on_exit(|c: &mut Counter, _: &Payload| push(c, "exit")),
            )
            .build()
            .unwrap();
        let mut machine = Machine::new(config);

        machine.transition("refresh", None).unwrap();

        assert_eq!(machine.context().log, vec!["exit", "action", "enter"]);
        assert_eq!(machine.previous(), Some("POLL"));
    }

    #[test]
    fn wildcard_is_used_when_event_is_missing() {
        let config: MachineConfig<Counter> = MachineBuilder::new()
            .initial("A")
            .state("A", StateBuilder::new().on("go", "B").on("*", "ERROR"))
            .state("B", StateBuilder::new())
            .state("ERROR", StateBuilder::new())
            .build()
            .unwrap();
        let mut machine = Machine::new(config);

        assert_eq!(machine.transition("whatever", None).unwrap(), "ERROR");
        machine.reset();
        assert_eq!(machine.transition("go", None).unwrap(), "B");
    }

    #[test]
    fn guards_see_payload() {
        let config: MachineConfig<Counter> = MachineBuilder::new()
            .initial("LOCKED")
            .state(
                "LOCKED",
                StateBuilder::new().on(
                    "unlock",
                    TransitionEdge::to("OPEN").guard(|_: &Counter, p: &Payload| p["code"] == 42),
                ),
            )
            .state("OPEN", StateBuilder::new())
            .build()
            .unwrap();
        let mut machine = Machine::new(config);

        assert!(!machine.can_transition("unlock", Some(&json!({ "code": 1 }))));
        assert!(machine.can_transition("unlock", Some(&json!({ "code": 42 }))));
        assert!(!machine.can_transition("unlock", None));
        assert_eq!(
            machine.transition("unlock", Some(&json!({ "code": 42 }))).unwrap(),
            "OPEN"
        );
    }

    #[test]
    fn can_transition_does_not_mutate() {
        let mut machine = Machine::new(switch());
        machine.transition("start", None).unwrap();
        let before = machine.context().clone();

        assert!(machine.can_transition("tick", None));
        assert!(machine.can_transition("stop", None));
        assert!(!machine.can_transition("start", None));

        assert_eq!(machine.context(), &before);
        assert!(machine.is("ON"));
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn reset_restores_initial_state_and_notifies_once() {
        let config: MachineConfig<Counter> = MachineBuilder::new()
            .initial("OFF")
            .context_factory(|| Counter {
                value: 10,
                log: Vec::new(),
            })
            .state("OFF", StateBuilder::new().on("start", "ON"))
            .state(
                "ON",
                StateBuilder::new().on_enter(|c: &mut Counter, _: &Payload| c.value += 1),
            )
            .build()
            .unwrap();
        let mut machine = Machine::new(config);
        machine.transition("start", None).unwrap();
        assert_eq!(machine.context().value, 11);

        let notified = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&notified);
        machine.subscribe(move |_, record| seen.lock().unwrap().push(record.clone()));
        machine.reset();

        assert!(machine.is("OFF"));
        assert_eq!(machine.previous(), None);
        assert_eq!(machine.context().value, 10);
        assert!(machine.history().is_empty());
        let notified = notified.lock().unwrap();
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].kind, TransitionKind::Reset);
        assert_eq!(notified[0].from, "ON");
        assert_eq!(notified[0].to, "OFF");
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut machine = Machine::new(switch());
        let count = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&count);
        let id = machine.subscribe(move |_, _| *seen.lock().unwrap() += 1);

        machine.transition("start", None).unwrap();
        assert!(machine.unsubscribe(id));
        assert!(!machine.unsubscribe(id));
        machine.transition("stop", None).unwrap();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn subscribers_may_transition_reentrantly() {
        let config: MachineConfig<Counter> = MachineBuilder::new()
            .initial("A")
            .state("A", StateBuilder::new().on("next", "B"))
            .state("B", StateBuilder::new().on("next", "C"))
            .state("C", StateBuilder::new())
            .build()
            .unwrap();
        let mut machine = Machine::new(config);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        machine.subscribe(move |machine, record| {
            log.lock().unwrap().push(record.to.clone());
            if machine.is("B") {
                machine.transition("next", None).unwrap();
            }
        });

        assert_eq!(machine.transition("next", None).unwrap(), "C");
        assert_eq!(*seen.lock().unwrap(), vec!["B", "C"]);
        assert_eq!(machine.history().path(), vec!["A", "B", "C"]);
    }

    #[test]
    fn subscriber_removed_mid_round_is_skipped() {
        let mut machine = Machine::new(switch());
        let calls = Arc::new(Mutex::new(Vec::new()));

        let later = SubscriptionId(1);
        let log = Arc::clone(&calls);
        machine.subscribe(move |machine, _| {
            log.lock().unwrap().push("first");
            machine.unsubscribe(later);
        });
        let log = Arc::clone(&calls);
        let second = machine.subscribe(move |_, _| log.lock().unwrap().push("second"));
        assert_eq!(second, later);

        machine.transition("start", None).unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["first"]);
    }

    struct RecordingLogger(Mutex<Vec<String>>);

    impl Logger for RecordingLogger {
        fn debug(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
        fn log(&self, _: &str) {}
        fn warn(&self, _: &str) {}
        fn error(&self, _: &str) {}
    }

    #[test]
    fn debug_flag_gates_injected_logger() {
        let logger = Arc::new(RecordingLogger(Mutex::new(Vec::new())));
        let mut quiet = switch();
        quiet.logger = Some(logger.clone());
        Machine::new(quiet).transition("start", None).unwrap();
        assert!(logger.0.lock().unwrap().is_empty());

        let mut loud = switch();
        loud.debug = true;
        loud.logger = Some(logger.clone());
        Machine::new(loud).transition("start", None).unwrap();

        let messages = logger.0.lock().unwrap();
        assert!(messages.iter().any(|m| m.contains("state changed: `OFF` -> `ON`")));
    }

    #[traced_test]
    #[test]
    fn default_logger_uses_tracing() {
        let mut config = switch();
        config.debug = true;
        let mut machine = Machine::new(config);

        machine.transition_with("stop", None, false).unwrap();

        assert!(logs_contain("transition refused: `stop` on `OFF`"));
    }

    #[test]
    fn history_limit_is_respected() {
        let mut config = switch();
        config.history_limit = 2;
        let mut machine = Machine::new(config);

        for _ in 0..3 {
            machine.transition("start", None).unwrap();
            machine.transition("stop", None).unwrap();
        }

        assert_eq!(machine.history().len(), 2);
        assert_eq!(machine.history().path(), vec!["OFF", "ON", "OFF"]);
    }
}
