use std::{any::Any, fmt, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};

use crate::{Message, MessageType, Options, PublishOptions, ReplyOptions, SendOptions};

/// The kind of an outgoing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Send,
    SendLocal,
    Publish,
    Reply,
    Forward,
    DoNotContinueDispatching,
    HandleCurrentMessageLater,
}

impl OperationKind {
    /// How the operation reads in a diagnostic: "a message was {past_tense}".
    pub fn past_tense(&self) -> &'static str {
        match self {
            OperationKind::Send => "sent",
            OperationKind::SendLocal => "sent locally",
            OperationKind::Publish => "published",
            OperationKind::Reply => "sent as a reply",
            OperationKind::Forward => "forwarded",
            OperationKind::DoNotContinueDispatching => "stopped from dispatching",
            OperationKind::HandleCurrentMessageLater => "handled later",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Send => "send",
            OperationKind::SendLocal => "send_local",
            OperationKind::Publish => "publish",
            OperationKind::Reply => "reply",
            OperationKind::Forward => "forward_current_message_to",
            OperationKind::DoNotContinueDispatching => {
                "do_not_continue_dispatching_current_message_to_handlers"
            }
            OperationKind::HandleCurrentMessageLater => "handle_current_message_later",
        };
        f.write_str(name)
    }
}

/// A message a handler emitted, with the options it was emitted with.
///
/// The message is stored type-erased and tagged with the type the handler
/// declared. Use [`message`](Self::message) to get it back.
#[derive(Clone)]
pub struct OutgoingMessage<O> {
    message: Arc<dyn Message>,
    message_type: MessageType,
    options: O,
    recorded_at: DateTime<Utc>,
}

impl<O> OutgoingMessage<O> {
    pub(crate) fn new<M: Message>(message: M, options: O, recorded_at: DateTime<Utc>) -> Self {
        Self {
            message: Arc::new(message),
            message_type: MessageType::of::<M>(),
            options,
            recorded_at,
        }
    }

    /// The message, if it was declared as `M`.
    pub fn message<M: Message>(&self) -> Option<&M> {
        let any: &dyn Any = &*self.message;
        any.downcast_ref::<M>()
    }

    #[inline]
    pub fn is<M: Message>(&self) -> bool {
        self.message_type.is::<M>()
    }

    #[inline]
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    #[inline]
    pub fn options(&self) -> &O {
        &self.options
    }

    /// When the handler issued the operation, per the run's [`Clock`](crate::Clock).
    #[inline]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

impl<K> OutgoingMessage<Options<K>> {
    /// The absolute date the message becomes deliverable, if it was deferred.
    ///
    /// A delay is resolved against the recording time, a not-before date is
    /// returned as given.
    pub fn delivery_date(&self) -> Option<DateTime<Utc>> {
        self.options
            .delivery_constraint()
            .and_then(|c| c.delivery_date(self.recorded_at))
    }

    /// The delay, if the message was deferred by a duration.
    pub fn delivery_delay(&self) -> Option<Duration> {
        self.options.delivery_delay()
    }
}

impl<O: fmt::Debug> fmt::Debug for OutgoingMessage<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutgoingMessage")
            .field("message_type", &self.message_type)
            .field("message", &self.message)
            .field("options", &self.options)
            .field("recorded_at", &self.recorded_at)
            .finish()
    }
}

/// One outgoing operation issued by the handler.
#[derive(Debug, Clone)]
pub enum Operation {
    Send(OutgoingMessage<SendOptions>),
    SendLocal(OutgoingMessage<SendOptions>),
    Publish(OutgoingMessage<PublishOptions>),
    Reply(OutgoingMessage<ReplyOptions>),
    Forward { destination: String },
    DoNotContinueDispatching,
    HandleCurrentMessageLater,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Send(_) => OperationKind::Send,
            Operation::SendLocal(_) => OperationKind::SendLocal,
            Operation::Publish(_) => OperationKind::Publish,
            Operation::Reply(_) => OperationKind::Reply,
            Operation::Forward { .. } => OperationKind::Forward,
            Operation::DoNotContinueDispatching => OperationKind::DoNotContinueDispatching,
            Operation::HandleCurrentMessageLater => OperationKind::HandleCurrentMessageLater,
        }
    }

    pub fn as_send(&self) -> Option<&OutgoingMessage<SendOptions>> {
        match self {
            Operation::Send(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_send_local(&self) -> Option<&OutgoingMessage<SendOptions>> {
        match self {
            Operation::SendLocal(m) => Some(m),
            _ => None,
        }
    }

    /// Either kind of send. Deferrals are sends with a delivery constraint.
    pub fn as_any_send(&self) -> Option<&OutgoingMessage<SendOptions>> {
        match self {
            Operation::Send(m) | Operation::SendLocal(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_publish(&self) -> Option<&OutgoingMessage<PublishOptions>> {
        match self {
            Operation::Publish(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_reply(&self) -> Option<&OutgoingMessage<ReplyOptions>> {
        match self {
            Operation::Reply(m) => Some(m),
            _ => None,
        }
    }

    pub fn forward_destination(&self) -> Option<&str> {
        match self {
            Operation::Forward { destination } => Some(destination),
            _ => None,
        }
    }
}

/// An [`Operation`] with its position in the run's emission order.
#[derive(Debug, Clone)]
pub struct Record {
    sequence: u64,
    operation: Operation,
}

impl Record {
    pub(crate) fn new(sequence: u64, operation: Operation) -> Self {
        Self {
            sequence,
            operation,
        }
    }

    /// Zero-based position; strictly increasing in emission order.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[inline]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    #[inline]
    pub fn kind(&self) -> OperationKind {
        self.operation.kind()
    }
}
