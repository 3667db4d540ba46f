//! Declarative checks evaluated against a handler run.
//!
//! Each expectation inspects a [`Snapshot`] and either passes or reports
//! an [`ExpectationError`]. Expectations never mutate what they inspect, so
//! verifying the same snapshot twice gives the same outcome.
//!
//! Most tests register expectations through the `expect_*` methods on
//! [`HandlerTest`](crate::HandlerTest). Implement [`Expectation`] directly
//! for checks those methods don't cover, and add it with
//! [`HandlerTest::expect`](crate::HandlerTest::expect).

mod control;
mod deferral;
mod forward;
mod message;

pub use control::{ControlFlag, ExpectFlag};
pub use deferral::{ExpectDefer, ExpectDelay};
pub use forward::ExpectForward;
pub use message::ExpectMessage;

use std::fmt;

use crate::{ExpectationError, Snapshot};

/// Whether an expectation requires or forbids a matching operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// At least one recorded operation must match.
    MustOccur,
    /// No recorded operation may match.
    MustNotOccur,
}

impl Polarity {
    /// Decide the outcome from the first match found, if any.
    ///
    /// `absent` and `present` build the diagnostic for the two ways the
    /// expectation can be violated.
    pub(crate) fn judge<T>(
        self,
        found: Option<T>,
        absent: impl FnOnce() -> ExpectationError,
        present: impl FnOnce(T) -> ExpectationError,
    ) -> Result<(), ExpectationError> {
        match (self, found) {
            (Polarity::MustOccur, None) => Err(absent()),
            (Polarity::MustNotOccur, Some(found)) => Err(present(found)),
            _ => Ok(()),
        }
    }
}

/// A predicate over one handler run.
pub trait Expectation: fmt::Debug + Send + Sync {
    /// Check the run. Returns the violation, if any.
    fn validate(&self, snapshot: &Snapshot) -> Result<(), ExpectationError>;
}

/// The ordered expectations of one test run.
#[derive(Debug, Default)]
pub struct Expectations {
    items: Vec<Box<dyn Expectation>>,
}

impl Expectations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, expectation: impl Expectation + 'static) {
        self.items.push(Box::new(expectation));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Evaluate every expectation in registration order and stop at the
    /// first violation.
    pub fn verify(&self, snapshot: &Snapshot) -> Result<(), ExpectationError> {
        for (index, expectation) in self.items.iter().enumerate() {
            if let Err(e) = expectation.validate(snapshot) {
                tracing::debug!(
                    index,
                    expected = e.target(),
                    violation = %e.violation(),
                    "expectation failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}
