//! Trace sink wrappers
//!
//! The platform hands plug-ins a line-oriented trace sink. The helpers here
//! add a severity prefix to each line and walk error chains.

use std::error::Error;
use std::fmt::Display;

use tracing::{error, info, warn};

/// Severity tag written at the start of a trace line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn prefix(&self) -> &'static str {
        match self {
            Severity::Error => "[Error] ",
            Severity::Warning => "[Warning] ",
            Severity::Info => "[Info] ",
        }
    }

    /// Splits a trace line into its severity and message
    pub fn split(line: &str) -> (Option<Severity>, &str) {
        for severity in [Severity::Error, Severity::Warning, Severity::Info] {
            if let Some(rest) = line.strip_prefix(severity.prefix()) {
                return (Some(severity), rest);
            }
        }
        (None, line)
    }

    fn format(&self, message: impl Display) -> String {
        format!("{}{}", self.prefix(), message)
    }
}

/// Line-oriented trace sink supplied by the host
pub trait TracingService: Send + Sync {
    fn trace(&self, message: &str);
}

/// Extension trait for TracingService with severity-prefixed helpers
pub trait TracingServiceExt: TracingService {
    /// Traces an error followed by each of its sources, innermost last
    fn trace_error(&self, error: &dyn Error) {
        let mut current = Some(error);
        while let Some(err) = current {
            self.trace(&Severity::Error.format(err));
            current = err.source();
        }
    }

    fn trace_warning(&self, message: impl Display) {
        self.trace(&Severity::Warning.format(message));
    }

    fn trace_info(&self, message: impl Display) {
        self.trace(&Severity::Info.format(message));
    }
}

// Blanket implementation for all TracingService implementors
impl<T: TracingService + ?Sized> TracingServiceExt for T {}

/// Forwards trace lines to the `tracing` subscriber
///
/// The event level follows the line's severity tag; untagged lines are
/// logged at info.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracingService;

impl LogTracingService {
    pub fn new() -> Self {
        Self
    }
}

impl TracingService for LogTracingService {
    fn trace(&self, message: &str) {
        match Severity::split(message) {
            (Some(Severity::Error), rest) => error!(target: "xrm_trace", "{}", rest),
            (Some(Severity::Warning), rest) => warn!(target: "xrm_trace", "{}", rest),
            (_, rest) => info!(target: "xrm_trace", "{}", rest),
        }
    }
}

/// In-memory trace sink for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    /// Records every traced line
    #[derive(Debug, Default)]
    pub struct MemoryTracingService {
        lines: Mutex<Vec<String>>,
    }

    impl MemoryTracingService {
        pub fn new() -> Self {
            Self::default()
        }

        /// Lines traced so far, oldest first
        pub fn lines(&self) -> Vec<String> {
            self.lines
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn clear(&self) {
            self.lines
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }

    impl TracingService for MemoryTracingService {
        fn trace(&self, message: &str) {
            self.lines
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(message.to_string());
        }
    }
}
