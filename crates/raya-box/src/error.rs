//! Runtime errors raised by the object model and the boxing engine

use crate::function::capture_stack;
use std::fmt;

/// Result type for fallible object model operations
pub type BoxResult<T> = Result<T, BoxError>;

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A boxed-type method ran on a value that does not carry its brand
    IncompatibleReceiver,
    /// Generic type error
    TypeError,
    /// Argument out of range
    RangeError,
}

impl ErrorKind {
    /// Error name as it appears in reports
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::IncompatibleReceiver | ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An error raised while running object model code
///
/// The native call stack is captured when the error is created, so a
/// report produced further up still shows where it was raised.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct BoxError {
    kind: ErrorKind,
    message: String,
    stack: Vec<String>,
}

impl BoxError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: capture_stack(),
        }
    }

    /// `TypeError`
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// `RangeError`
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeError, message)
    }

    /// Brand check failure for `type_name.prototype.method`
    pub fn incompatible_receiver(type_name: &str, method: &str, receiver: &str) -> Self {
        Self::new(
            ErrorKind::IncompatibleReceiver,
            format!(
                "Method {}.prototype.{} called on incompatible receiver {}",
                type_name, method, receiver
            ),
        )
    }

    /// Error classification
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Error name (`TypeError`, `RangeError`)
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Error message without the name prefix
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Native frames active when the error was created, innermost first
    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    /// Check for a brand check failure
    pub fn is_incompatible_receiver(&self) -> bool {
        self.kind == ErrorKind::IncompatibleReceiver
    }
}
