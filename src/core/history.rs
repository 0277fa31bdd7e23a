//! Transition records and bounded in-memory history.
//!
//! Every executed transition produces a [`StateTransition`]. The same record
//! is delivered to subscribers and appended to the machine's history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// What kind of change a record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Edge without a target: the action ran, the state did not change.
    Internal,
    /// Edge with a target, including self-loops.
    External,
    /// The machine was reset to its initial state.
    Reset,
}

/// Record of a single executed transition.
///
/// # Example
///
/// ```rust
/// use statewright::core::{StateTransition, TransitionKind};
///
/// let record = StateTransition::new(TransitionKind::External, Some("start"), "OFF", "ON");
///
/// assert_eq!(record.from, "OFF");
/// assert_eq!(record.to, "ON");
/// assert!(record.changed_state());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub kind: TransitionKind,
    /// Triggering event; `None` for resets.
    pub event: Option<String>,
    pub from: String,
    pub to: String,
    pub timestamp: DateTime<Utc>,
}

impl StateTransition {
    pub fn new(
        kind: TransitionKind,
        event: Option<&str>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            event: event.map(str::to_string),
            from: from.into(),
            to: to.into(),
            timestamp: Utc::now(),
        }
    }

    /// Whether the record moved the machine to a different state.
    pub fn changed_state(&self) -> bool {
        self.from != self.to
    }
}

/// Ordered history of the most recent transitions.
///
/// Keeps at most `limit` records, discarding the oldest first. A limit of
/// zero disables recording.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory {
    limit: usize,
    transitions: VecDeque<StateTransition>,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::new(super::config::DEFAULT_HISTORY_LIMIT)
    }
}

impl StateHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            transitions: VecDeque::with_capacity(limit.min(16)),
        }
    }

    /// Append a record, evicting the oldest when full.
    pub fn record(&mut self, transition: StateTransition) {
        if self.limit == 0 {
            return;
        }
        while self.transitions.len() >= self.limit {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` of the oldest kept record, then the `to` of each
    /// record. Internal transitions repeat the current state.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(first.from.as_str());
        }
        path.extend(self.transitions.iter().map(|t| t.to.as_str()));
        path
    }

    /// Time between the oldest and newest kept records.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.front()?;
        let last = self.transitions.back()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition> {
        self.transitions.iter()
    }

    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
