//! Eager configuration validation.
//!
//! The engine validates lazily: a broken configuration only fails when a
//! transition reaches the broken part. [`validate_config`] checks the whole
//! graph up front and accumulates every violation instead of stopping at the
//! first one, using Stillwater's `Validation`.
//!
//! # Example
//!
//! ```rust
//! use statewright::builder::{MachineBuilder, StateBuilder};
//! use statewright::validation::{validate_config, ConfigViolation};
//! use stillwater::validation::Validation;
//!
//! let config = MachineBuilder::<()>::new()
//!     .initial("START")
//!     .state("IDLE", StateBuilder::new().on("go", "MISSING"))
//!     .build()
//!     .unwrap();
//!
//! match validate_config(&config) {
//!     Validation::Failure(violations) => assert_eq!(violations.len(), 2),
//!     Validation::Success(_) => panic!("expected violations"),
//! }
//! ```

pub mod violations;

pub use violations::ConfigViolation;

use crate::core::{is_wildcard, MachineConfig, TransitionDefinition};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<ConfigViolation>>;

/// Check a configuration, reporting ALL violations.
pub fn validate_config<C>(config: &MachineConfig<C>) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    checks.push(require(
        config.states.contains_key(&config.initial),
        || ConfigViolation::UnknownInitialState {
            initial: config.initial.clone(),
        },
    ));

    for (name, state) in &config.states {
        checks.push(require(!is_wildcard(name), || {
            ConfigViolation::ReservedStateName
        }));

        let Some(on) = &state.on else {
            checks.push(Validation::fail(ConfigViolation::MissingTransitions {
                state: name.clone(),
            }));
            continue;
        };

        for (event, definition) in on {
            checks.push(require(!event.is_empty(), || {
                ConfigViolation::EmptyEventName {
                    state: name.clone(),
                }
            }));

            if let TransitionDefinition::Sequence(edges) = definition {
                checks.push(require(!edges.is_empty(), || ConfigViolation::EmptySequence {
                    state: name.clone(),
                    event: event.clone(),
                }));
            }

            for target in definition.targets() {
                checks.push(require(config.states.contains_key(target), || {
                    ConfigViolation::UnknownTarget {
                        state: name.clone(),
                        event: event.clone(),
                        target: target.to_string(),
                    }
                }));
            }
        }
    }

    Validation::all_vec(checks).map(|_| ())
}

fn require(ok: bool, violation: impl FnOnce() -> ConfigViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}
