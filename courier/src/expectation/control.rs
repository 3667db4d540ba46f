use crate::{ExpectationError, OperationKind, Snapshot};

use super::{Expectation, Polarity};

/// A control directive a handler can issue about the inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlFlag {
    /// [`Context::do_not_continue_dispatching_current_message_to_handlers`](crate::Context::do_not_continue_dispatching_current_message_to_handlers)
    DoNotContinueDispatching,
    /// [`Context::handle_current_message_later`](crate::Context::handle_current_message_later)
    HandleCurrentMessageLater,
}

impl ControlFlag {
    fn operation(self) -> OperationKind {
        match self {
            ControlFlag::DoNotContinueDispatching => OperationKind::DoNotContinueDispatching,
            ControlFlag::HandleCurrentMessageLater => OperationKind::HandleCurrentMessageLater,
        }
    }

    fn is_set(self, snapshot: &Snapshot) -> bool {
        match self {
            ControlFlag::DoNotContinueDispatching => snapshot.is_dispatch_stopped(),
            ControlFlag::HandleCurrentMessageLater => snapshot.is_handle_later_requested(),
        }
    }
}

/// Expects a control directive to have been (or not been) issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectFlag {
    flag: ControlFlag,
    polarity: Polarity,
}

impl ExpectFlag {
    pub fn new(flag: ControlFlag, polarity: Polarity) -> Self {
        Self { flag, polarity }
    }
}

impl Expectation for ExpectFlag {
    fn validate(&self, snapshot: &Snapshot) -> Result<(), ExpectationError> {
        let operation = self.flag.operation();
        let found = self.flag.is_set(snapshot).then_some(());
        self.polarity.judge(
            found,
            || {
                ExpectationError::absent(
                    operation.to_string(),
                    format!("Expected {operation} to be called, but it was not"),
                )
            },
            |()| {
                ExpectationError::present(
                    operation.to_string(),
                    format!("Expected {operation} not to be called, but it was"),
                )
            },
        )
    }
}
