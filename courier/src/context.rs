use std::{
    fmt,
    future::{Ready, ready},
    sync::Arc,
    time::Duration,
};

use chrono::{DateTime, Utc};

use crate::{
    Clock, Config, Error, Headers, Message, MessageId, Operation, OutgoingMessage, PublishOptions,
    ReplyOptions, Result, SendOptions, Snapshot, instantiate, journal::Journal,
};

/// Completion signal returned by every [`Context`] operation.
///
/// Operations are recorded when they are called, so the signal is already
/// resolved. Awaiting it only surfaces the result.
pub type Completion = Ready<Result>;

/// Recording execution context handed to a handler under test.
///
/// Use it to:
/// - `send`, `send_local`, `publish`, `reply`: emit messages (or their `*_new`
///   variants, which build the message from `Default` plus an initializer)
/// - `defer`, `defer_until`: send a message for delayed delivery
/// - `forward_current_message_to`: forward the inbound message
/// - `do_not_continue_dispatching_current_message_to_handlers`,
///   `handle_current_message_later`: control directives
/// - `message_id`, `reply_to_address`, `message_headers`: inspect the inbound message
///
/// Nothing is dispatched. Every operation is appended to the run's record
/// with its arguments intact, in the order the handler issued it. The
/// context is cheap to clone and safe to use from tasks the handler spawns;
/// concurrent operations are serialized, never lost.
///
/// See also: [`HandlerTest`](crate::HandlerTest), [`Snapshot`].
#[derive(Clone)]
pub struct Context {
    incoming: Arc<Incoming>,
    journal: Arc<Journal>,
    clock: Clock,
}

#[derive(Debug, Clone)]
struct Incoming {
    message_id: MessageId,
    reply_to_address: Option<String>,
    headers: Headers,
}

impl Context {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            incoming: Arc::new(Incoming {
                message_id: MessageId::new(),
                reply_to_address: config.reply_to_address().map(str::to_owned),
                headers: config.default_headers().clone(),
            }),
            journal: Arc::new(Journal::default()),
            clock: config.clock(),
        }
    }

    // ==================== Inbound Message ====================

    #[inline]
    pub fn message_id(&self) -> &MessageId {
        &self.incoming.message_id
    }

    #[inline]
    pub fn reply_to_address(&self) -> Option<&str> {
        self.incoming.reply_to_address.as_deref()
    }

    #[inline]
    pub fn message_headers(&self) -> &Headers {
        &self.incoming.headers
    }

    /// Shorthand for `self.message_headers().get(key)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeader`] if the test did not configure `key`.
    pub fn header(&self, key: &str) -> Result<&str> {
        self.incoming.headers.get(key)
    }

    pub fn set_message_id(&mut self, id: impl Into<MessageId>) {
        Arc::make_mut(&mut self.incoming).message_id = id.into();
    }

    pub fn set_reply_to_address(&mut self, address: impl Into<String>) {
        Arc::make_mut(&mut self.incoming).reply_to_address = Some(address.into());
    }

    /// Set a header on the inbound message. The last value set for a key wins.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        Arc::make_mut(&mut self.incoming).headers.insert(key, value);
    }

    // ==================== Outgoing Messages ====================

    /// Send `message`. Options routed to this endpoint make it a send-local.
    pub fn send<M: Message>(&self, message: M, options: SendOptions) -> Completion {
        ready(self.record_send(message, options))
    }

    pub fn send_new<M: Message + Default>(
        &self,
        init: impl FnOnce(&mut M),
        options: SendOptions,
    ) -> Completion {
        self.send(instantiate(init), options)
    }

    /// Send to the endpoint handling the current message.
    ///
    /// Same as [`send`](Self::send) with
    /// [`route_to_this_endpoint`](SendOptions::route_to_this_endpoint) set, so
    /// options that already name a destination fail with
    /// [`Error::Configuration`].
    pub fn send_local<M: Message>(&self, message: M, mut options: SendOptions) -> Completion {
        if let Err(e) = options.route_to_this_endpoint() {
            return ready(Err(e));
        }
        ready(self.record_send(message, options))
    }

    pub fn send_local_new<M: Message + Default>(
        &self,
        init: impl FnOnce(&mut M),
        options: SendOptions,
    ) -> Completion {
        self.send_local(instantiate(init), options)
    }

    pub fn publish<M: Message>(&self, message: M, options: PublishOptions) -> Completion {
        ready(self.record(|now| {
            Ok(Operation::Publish(OutgoingMessage::new(message, options, now)))
        }))
    }

    pub fn publish_new<M: Message + Default>(
        &self,
        init: impl FnOnce(&mut M),
        options: PublishOptions,
    ) -> Completion {
        self.publish(instantiate(init), options)
    }

    pub fn reply<M: Message>(&self, message: M, options: ReplyOptions) -> Completion {
        ready(self.record(|now| {
            Ok(Operation::Reply(OutgoingMessage::new(message, options, now)))
        }))
    }

    pub fn reply_new<M: Message + Default>(
        &self,
        init: impl FnOnce(&mut M),
        options: ReplyOptions,
    ) -> Completion {
        self.reply(instantiate(init), options)
    }

    // ==================== Deferral ====================

    /// Send `message` for delivery once `delay` has passed.
    pub fn defer<M: Message>(&self, delay: Duration, message: M) -> Completion {
        let mut options = SendOptions::new();
        if let Err(e) = options.delay_delivery_with(delay) {
            return ready(Err(e));
        }
        self.send(message, options)
    }

    /// Send `message` for delivery no earlier than `at`.
    pub fn defer_until<M: Message>(&self, at: DateTime<Utc>, message: M) -> Completion {
        let mut options = SendOptions::new();
        if let Err(e) = options.do_not_deliver_before(at) {
            return ready(Err(e));
        }
        self.send(message, options)
    }

    // ==================== Control ====================

    /// Forward the inbound message to `destination`. Each call is recorded
    /// separately.
    pub fn forward_current_message_to(&self, destination: impl Into<String>) -> Completion {
        let destination = destination.into();
        if destination.trim().is_empty() {
            return ready(Err(Error::invalid_argument(
                "forward destination must not be empty",
            )));
        }
        ready(self.record(|_| Ok(Operation::Forward { destination })))
    }

    /// Stop dispatching the inbound message to further handlers. Idempotent.
    pub fn do_not_continue_dispatching_current_message_to_handlers(&self) -> Completion {
        ready(self.journal.stop_dispatching())
    }

    /// Ask for the inbound message to be handled again later. Idempotent.
    pub fn handle_current_message_later(&self) -> Completion {
        ready(self.journal.handle_later())
    }

    // ==================== Inspection ====================

    pub fn is_dispatch_stopped(&self) -> bool {
        self.journal.is_dispatch_stopped()
    }

    pub fn is_handle_later_requested(&self) -> bool {
        self.journal.is_handle_later_requested()
    }

    /// Everything recorded so far.
    pub fn snapshot(&self) -> Snapshot {
        self.journal.snapshot()
    }

    /// Freeze the record. Operations issued afterwards fail with
    /// [`Error::ContextSealed`].
    pub(crate) fn seal(&self) -> Snapshot {
        self.journal.seal()
    }

    fn record_send<M: Message>(&self, message: M, options: SendOptions) -> Result {
        self.record(|now| {
            let local = options.is_routed_to_this_endpoint();
            let outgoing = OutgoingMessage::new(message, options, now);
            if outgoing.options().delivery_constraint().is_some()
                && outgoing.delivery_date().is_none()
            {
                return Err(Error::invalid_argument(format!(
                    "delivery delay {:?} is out of range",
                    outgoing.delivery_delay().unwrap_or_default()
                )));
            }
            Ok(if local {
                Operation::SendLocal(outgoing)
            } else {
                Operation::Send(outgoing)
            })
        })
    }

    /// Build and append an operation. The clock is read under the journal
    /// lock, so recording times never decrease along the sequence.
    fn record(&self, build: impl FnOnce(DateTime<Utc>) -> Result<Operation>) -> Result {
        self.journal.record(|| build(self.clock.now())).map(|_| ())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("message_id", &self.incoming.message_id)
            .field("reply_to_address", &self.incoming.reply_to_address)
            .field("headers", &self.incoming.headers)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
