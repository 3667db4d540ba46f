use std::fmt;

use crate::{ExpectationError, OperationKind, Snapshot};

use super::{Expectation, Polarity};

/// Expects the inbound message to be (or not be) forwarded to a destination
/// accepted by the check.
pub struct ExpectForward {
    polarity: Polarity,
    check: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl ExpectForward {
    pub fn new(polarity: Polarity, check: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            polarity,
            check: Box::new(check),
        }
    }

    /// Match one destination exactly.
    pub fn to(polarity: Polarity, destination: impl Into<String>) -> Self {
        let destination = destination.into();
        Self::new(polarity, move |d| d == destination)
    }
}

impl Expectation for ExpectForward {
    fn validate(&self, snapshot: &Snapshot) -> Result<(), ExpectationError> {
        let found = snapshot
            .forwarded_destinations()
            .find(|&destination| (self.check)(destination));

        let target = OperationKind::Forward.to_string();
        self.polarity.judge(
            found,
            || {
                ExpectationError::absent(
                    target.clone(),
                    "Expected the current message to be forwarded, but it was not forwarded to a matching destination",
                )
            },
            |destination| {
                ExpectationError::present(
                    target.clone(),
                    format!(
                        "Expected the current message not to be forwarded, but it was forwarded to '{destination}'"
                    ),
                )
            },
        )
    }
}

impl fmt::Debug for ExpectForward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectForward")
            .field("polarity", &self.polarity)
            .finish_non_exhaustive()
    }
}
