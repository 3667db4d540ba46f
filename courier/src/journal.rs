use std::sync::{Mutex, MutexGuard};

use crate::{Error, Operation, Record, Result, Snapshot};

/// The append-only log behind a [`Context`](crate::Context).
///
/// Records, control flags and the sealed marker live under one lock, so
/// appending an operation and assigning its sequence number is a single
/// exclusive step no matter how many tasks the handler fans out to.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    state: Mutex<JournalState>,
}

#[derive(Debug, Default)]
struct JournalState {
    records: Vec<Record>,
    dispatch_stopped: bool,
    handle_later: bool,
    sealed: bool,
}

impl Journal {
    fn lock(&self) -> MutexGuard<'_, JournalState> {
        // A handler task that panicked mid-append cannot leave a half-written
        // record behind: the push is the last step under the lock.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Build an operation while holding the lock, append it and return its
    /// sequence number.
    pub(crate) fn record(&self, build: impl FnOnce() -> Result<Operation>) -> Result<u64> {
        let mut state = self.lock();
        let operation = build()?;
        state.append(operation)
    }

    pub(crate) fn stop_dispatching(&self) -> Result<()> {
        let mut state = self.lock();
        if state.dispatch_stopped {
            return state.check_open();
        }
        state.append(Operation::DoNotContinueDispatching)?;
        state.dispatch_stopped = true;
        Ok(())
    }

    pub(crate) fn handle_later(&self) -> Result<()> {
        let mut state = self.lock();
        if state.handle_later {
            return state.check_open();
        }
        state.append(Operation::HandleCurrentMessageLater)?;
        state.handle_later = true;
        Ok(())
    }

    pub(crate) fn is_dispatch_stopped(&self) -> bool {
        self.lock().dispatch_stopped
    }

    pub(crate) fn is_handle_later_requested(&self) -> bool {
        self.lock().handle_later
    }

    /// Copy of everything recorded so far. The journal stays open.
    pub(crate) fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    /// Reject further operations and return the final snapshot.
    pub(crate) fn seal(&self) -> Snapshot {
        let mut state = self.lock();
        state.sealed = true;
        state.snapshot()
    }
}

impl JournalState {
    fn check_open(&self) -> Result<()> {
        if self.sealed {
            Err(Error::ContextSealed)
        } else {
            Ok(())
        }
    }

    fn append(&mut self, operation: Operation) -> Result<u64> {
        if self.sealed {
            tracing::warn!(
                kind = %operation.kind(),
                "operation issued after the handler completed; not recorded"
            );
            return Err(Error::ContextSealed);
        }
        let sequence = self.records.len() as u64;
        tracing::trace!(sequence, kind = %operation.kind(), "operation recorded");
        self.records.push(Record::new(sequence, operation));
        Ok(sequence)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.records.clone(),
            self.dispatch_stopped,
            self.handle_later,
        )
    }
}
