use std::fmt;

use crate::{
    ExpectationError, Message, MessageType, Operation, OperationKind, OutgoingMessage,
    PublishOptions, ReplyOptions, SendOptions, Snapshot,
};

use super::{Expectation, Polarity};

type Select<O> = fn(&Operation) -> Option<&OutgoingMessage<O>>;
type Check<M, O> = Box<dyn Fn(&M, &O) -> bool + Send + Sync>;

/// Expects a message of declared type `M` to be (or not be) emitted by one
/// kind of operation.
///
/// A record matches when its operation kind is the expected one, the type
/// the handler declared for the message is `M`, and the check accepts the
/// message together with the exact options the handler supplied.
///
/// ```rust
/// use courier::{ExpectMessage, Message, Polarity};
///
/// #[derive(Debug)]
/// struct Invoice { total: u32 }
/// impl Message for Invoice {}
///
/// let large_invoice_sent =
///     ExpectMessage::send(Polarity::MustOccur, |m: &Invoice, _| m.total > 1_000);
/// let no_billing_copy = ExpectMessage::publish(Polarity::MustNotOccur, |_: &Invoice, opts| {
///     opts.destination() == Some("billing")
/// });
/// ```
pub struct ExpectMessage<M, O> {
    kind: OperationKind,
    polarity: Polarity,
    select: Select<O>,
    check: Check<M, O>,
}

impl<M: Message, O: 'static> ExpectMessage<M, O> {
    fn new(
        kind: OperationKind,
        polarity: Polarity,
        select: Select<O>,
        check: impl Fn(&M, &O) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            polarity,
            select,
            check: Box::new(check),
        }
    }
}

impl<M: Message> ExpectMessage<M, SendOptions> {
    pub fn send(
        polarity: Polarity,
        check: impl Fn(&M, &SendOptions) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(OperationKind::Send, polarity, Operation::as_send, check)
    }

    pub fn send_local(
        polarity: Polarity,
        check: impl Fn(&M, &SendOptions) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            OperationKind::SendLocal,
            polarity,
            Operation::as_send_local,
            check,
        )
    }
}

impl<M: Message> ExpectMessage<M, PublishOptions> {
    pub fn publish(
        polarity: Polarity,
        check: impl Fn(&M, &PublishOptions) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(OperationKind::Publish, polarity, Operation::as_publish, check)
    }
}

impl<M: Message> ExpectMessage<M, ReplyOptions> {
    pub fn reply(
        polarity: Polarity,
        check: impl Fn(&M, &ReplyOptions) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::new(OperationKind::Reply, polarity, Operation::as_reply, check)
    }
}

impl<M: Message, O: 'static> Expectation for ExpectMessage<M, O> {
    fn validate(&self, snapshot: &Snapshot) -> Result<(), ExpectationError> {
        let found = snapshot
            .records()
            .iter()
            .filter_map(|r| (self.select)(r.operation()))
            .find_map(|m| {
                m.message::<M>()
                    .filter(|&message| (self.check)(message, m.options()))
            });

        let target = MessageType::of::<M>().name();
        let verb = self.kind.past_tense();
        self.polarity.judge(
            found,
            || {
                ExpectationError::absent(
                    target.clone(),
                    format!(
                        "Expected a message of type {target} to be {verb}, but no message matching your constraints was {verb}"
                    ),
                )
            },
            |message| {
                ExpectationError::present(
                    target.clone(),
                    format!(
                        "Expected no message of type {target} to be {verb}, but a matching message was {verb}: {message:?}"
                    ),
                )
            },
        )
    }
}

impl<M, O> fmt::Debug for ExpectMessage<M, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectMessage")
            .field("kind", &self.kind)
            .field("polarity", &self.polarity)
            .field("message_type", &std::any::type_name::<M>())
            .finish_non_exhaustive()
    }
}
