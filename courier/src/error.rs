use std::{borrow::Cow, fmt, sync::Arc};

/// The single error type for all courier operations.
///
/// Every fallible courier API returns `courier::Result<T>` (alias for
/// `Result<T, courier::Error>`). Handlers under test return the same type,
/// so a fault raised by a handler reaches the test author exactly as the
/// handler produced it. Foreign errors are brought in with
/// [`Error::external`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("Header '{0}' was not configured for this test")]
    MissingHeader(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Expectation(#[from] ExpectationError),

    #[error("Operation issued after the handler completed; the context is sealed")]
    ContextSealed,

    #[error("External error: {0}")]
    External(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn external(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::External(Arc::new(e))
    }

    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Error::Configuration(reason.into())
    }

    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Error::InvalidArgument(reason.into())
    }

    /// Returns the expectation failure, if this error is one.
    pub fn as_expectation(&self) -> Option<&ExpectationError> {
        match self {
            Error::Expectation(e) => Some(e),
            _ => None,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingHeader(a), Self::MissingHeader(b)) => a == b,
            (Self::Configuration(a), Self::Configuration(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::Expectation(a), Self::Expectation(b)) => a == b,
            (Self::ContextSealed, Self::ContextSealed) => true,
            (Self::External(a), Self::External(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Error {}

/// Which way an expectation was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    /// Expected but absent: no recorded operation matched.
    Absent,
    /// Forbidden but present: a recorded operation matched.
    Present,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Absent => f.write_str("expected but absent"),
            Violation::Present => f.write_str("forbidden but present"),
        }
    }
}

/// A violated expectation.
///
/// Carries the name of the target (a message type such as `Outgoing`, or an
/// operation such as `forward_current_message_to`), the direction of the
/// violation and the rendered diagnostic shown to the test author.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ExpectationError {
    target: Cow<'static, str>,
    violation: Violation,
    message: String,
}

impl ExpectationError {
    pub(crate) fn absent(target: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            violation: Violation::Absent,
            message: message.into(),
        }
    }

    pub(crate) fn present(
        target: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            violation: Violation::Present,
            message: message.into(),
        }
    }

    /// Name of the message type or operation the expectation targeted.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn violation(&self) -> Violation {
        self.violation
    }

    /// The human-readable diagnostic.
    pub fn message(&self) -> &str {
        &self.message
    }
}
