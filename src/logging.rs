//! Logger capability injected into machines.
//!
//! Machines never write to a process-wide logger. Each configuration may
//! carry its own [`Logger`]; when none is supplied the engine falls back to
//! [`TracingLogger`], which forwards to `tracing` and is silent unless the
//! embedding application installs a subscriber.

/// Four-level logging capability.
///
/// The engine only calls [`Logger::debug`], and only when the machine's
/// `debug` flag is set.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn log(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default sink forwarding to `tracing` under the `statewright` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "statewright", "{message}");
    }

    fn log(&self, message: &str) {
        tracing::info!(target: "statewright", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "statewright", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "statewright", "{message}");
    }
}
