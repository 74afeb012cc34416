//! Warning and error reporting.
//!
//! Configuration problems are reported through an `ErrorReporter` that is
//! created once by the application and handed to every component that can
//! encounter them. Consecutive identical messages are emitted only once.

use std::sync::{Arc, Mutex};

/// Callback run before the process exits on a fatal error.
pub type CleanupFn = Box<dyn Fn() + Send + Sync>;

/// Reports deduplicated warnings and errors through the `log` macros.
pub struct ErrorReporter {
    /// Most recently emitted message.
    last_message: Mutex<Option<String>>,

    /// Suppress warnings.
    quiet: bool,

    /// Callbacks run by `error_exit()`.
    cleanup: Mutex<Vec<CleanupFn>>,
}

/// Atomic reference counted `ErrorReporter`.
pub type ArcErrorReporter = Arc<ErrorReporter>;

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ErrorReporter {
    /// Create a new `ErrorReporter`.
    ///
    /// * `quiet` - Suppress warnings.
    pub fn new(quiet: bool) -> Self {
        Self {
            last_message: Mutex::new(None),
            quiet,
            cleanup: Mutex::new(vec![]),
        }
    }

    /// Records `msg` as the most recent message. Returns false if it repeats
    /// the previous one.
    ///
    /// * `msg` - The message.
    fn record(&self, msg: &str) -> bool {
        let mut last = match self.last_message.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if last.as_deref() == Some(msg) {
            false
        } else {
            *last = Some(msg.to_string());
            true
        }
    }

    /// Reports a warning unless quiet.
    ///
    /// * `msg` - The message.
    pub fn warning(&self, msg: &str) {
        if !self.quiet && self.record(msg) {
            warn!("{msg}");
        }
    }

    /// Reports a recoverable error.
    ///
    /// * `msg` - The message.
    pub fn error(&self, msg: &str) {
        if self.record(msg) {
            error!("{msg}");
        }
    }

    /// Reports an unrecoverable error, runs the cleanup callbacks and exits
    /// the process.
    ///
    /// * `msg` - The message.
    pub fn error_exit(&self, msg: &str) -> ! {
        self.record(msg);
        error!("{msg}");

        let hooks = match self.cleanup.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        hooks.iter().for_each(|hook| hook());

        std::process::exit(1);
    }

    /// Registers a callback to run before a fatal exit.
    ///
    /// * `hook` - The callback.
    pub fn add_cleanup(&self, hook: CleanupFn) {
        match self.cleanup.lock() {
            Ok(mut guard) => guard.push(hook),
            Err(poisoned) => poisoned.into_inner().push(hook),
        }
    }

    /// Returns the most recently emitted message.
    pub fn last_message(&self) -> Option<String> {
        match self.last_message.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns true if warnings are suppressed.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn repeated_messages_are_deduplicated() {
        let reporter = ErrorReporter::new(false);
        assert!(reporter.record("bad value"));
        assert!(!reporter.record("bad value"));
        assert!(reporter.record("other value"));
        assert!(reporter.record("bad value"));
        assert_eq!(reporter.last_message().as_deref(), Some("bad value"));
    }

    #[test]
    fn quiet_suppresses_warnings_but_not_errors() {
        let reporter = ErrorReporter::new(true);
        reporter.warning("ignored");
        assert_eq!(reporter.last_message(), None);
        reporter.error("shown");
        assert_eq!(reporter.last_message().as_deref(), Some("shown"));
        assert!(reporter.is_quiet());
    }

    #[test]
    fn cleanup_hooks_are_registered() {
        let reporter = ErrorReporter::default();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        reporter.add_cleanup(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        reporter.cleanup.lock().unwrap().iter().for_each(|h| h());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
