//! State and event labels, payloads and the context capability.
//!
//! States and events are plain string labels compared by value. The literal
//! `"*"` is reserved as the wildcard event key and is never a real state.

/// Reserved event key matched when the current state has no entry for the
/// requested event.
pub const WILDCARD: &str = "*";

/// Data passed alongside an event to guards, actions and hooks.
///
/// An absent payload is represented as `Value::Null`.
pub type Payload = serde_json::Value;

/// Trait for machine context types.
///
/// The context is application data owned by exactly one machine. It must
/// contain data only, so it can be cloned and serialized.
///
/// # Required Traits
///
/// - `Clone`: guards run against a cloned snapshot of the live context. The
///   snapshot only isolates the machine if `clone` is a deep copy; a context
///   sharing interior-mutable state through `Arc`/`Rc` cannot offer dry-run
///   safety.
/// - `Default`: supplies the context when a configuration defines none.
///
/// The trait is implemented for every type meeting its bounds.
///
/// # Example
///
/// ```rust
/// use statewright::core::Context;
///
/// #[derive(Clone, Default)]
/// struct Counter {
///     attempts: u32,
/// }
///
/// fn assert_context<C: Context>() {}
/// assert_context::<Counter>();
/// assert_context::<serde_json::Value>();
/// ```
pub trait Context: Clone + Default + Send + Sync + 'static {}

impl<T> Context for T where T: Clone + Default + Send + Sync + 'static {}

/// Check whether an event key is the wildcard.
pub fn is_wildcard(event: &str) -> bool {
    event == WILDCARD
}

/// Shared null payload for callers that pass none.
pub(crate) static NULL_PAYLOAD: Payload = Payload::Null;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_is_recognized() {
        assert!(is_wildcard("*"));
        assert!(!is_wildcard("any"));
        assert!(!is_wildcard(""));
    }

    #[test]
    fn null_payload_is_null() {
        assert!(NULL_PAYLOAD.is_null());
    }
}
