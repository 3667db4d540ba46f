use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};

use crate::{ExpectationError, Message, MessageType, Snapshot};

use super::{Expectation, Polarity};

/// Expects a message of type `M` to be (or not be) deferred, checked
/// against its absolute delivery date.
///
/// Covers both [`Context::defer`](crate::Context::defer) style delays and
/// not-before dates, on regular and local sends alike. A delay is resolved
/// against the time the send was recorded, so pair this with a
/// [`Clock::Fixed`](crate::Clock::Fixed) when asserting exact dates.
pub struct ExpectDefer<M> {
    polarity: Polarity,
    check: Box<dyn Fn(&M, DateTime<Utc>) -> bool + Send + Sync>,
}

impl<M: Message> ExpectDefer<M> {
    pub fn new(
        polarity: Polarity,
        check: impl Fn(&M, DateTime<Utc>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            polarity,
            check: Box::new(check),
        }
    }
}

impl<M: Message> Expectation for ExpectDefer<M> {
    fn validate(&self, snapshot: &Snapshot) -> Result<(), ExpectationError> {
        let found = snapshot.deferred().find_map(|m| {
            let at = m.delivery_date()?;
            m.message::<M>()
                .filter(|&message| (self.check)(message, at))
                .map(|message| (message, at))
        });
        judge::<M, _>(self.polarity, found, |(message, at)| {
            format!("{message:?} at {at}")
        })
    }
}

/// Expects a message of type `M` to be (or not be) deferred by a duration.
///
/// Only sends deferred with a delay match; a not-before date does not. Use
/// this to assert "deferred by ten minutes" without depending on when the
/// send was recorded.
pub struct ExpectDelay<M> {
    polarity: Polarity,
    check: Box<dyn Fn(&M, Duration) -> bool + Send + Sync>,
}

impl<M: Message> ExpectDelay<M> {
    pub fn new(
        polarity: Polarity,
        check: impl Fn(&M, Duration) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            polarity,
            check: Box::new(check),
        }
    }
}

impl<M: Message> Expectation for ExpectDelay<M> {
    fn validate(&self, snapshot: &Snapshot) -> Result<(), ExpectationError> {
        let found = snapshot.deferred().find_map(|m| {
            let delay = m.delivery_delay()?;
            m.message::<M>()
                .filter(|&message| (self.check)(message, delay))
                .map(|message| (message, delay))
        });
        judge::<M, _>(self.polarity, found, |(message, delay)| {
            format!("{message:?} delayed by {delay:?}")
        })
    }
}

fn judge<M: Message, T>(
    polarity: Polarity,
    found: Option<T>,
    describe: impl FnOnce(T) -> String,
) -> Result<(), ExpectationError> {
    let target = MessageType::of::<M>().name();
    polarity.judge(
        found,
        || {
            ExpectationError::absent(
                target.clone(),
                format!(
                    "Expected a message of type {target} to be deferred, but no message matching your constraints was deferred"
                ),
            )
        },
        |found| {
            ExpectationError::present(
                target.clone(),
                format!(
                    "Expected no message of type {target} to be deferred, but a matching message was deferred: {}",
                    describe(found)
                ),
            )
        },
    )
}

impl<M> fmt::Debug for ExpectDefer<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectDefer")
            .field("polarity", &self.polarity)
            .field("message_type", &std::any::type_name::<M>())
            .finish_non_exhaustive()
    }
}

impl<M> fmt::Debug for ExpectDelay<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectDelay")
            .field("polarity", &self.polarity)
            .field("message_type", &std::any::type_name::<M>())
            .finish_non_exhaustive()
    }
}
