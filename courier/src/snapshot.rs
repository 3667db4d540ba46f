use std::{fmt, sync::Arc};

use crate::{
    Message, OperationKind, OutgoingMessage, PublishOptions, Record, ReplyOptions, SendOptions,
};

/// Frozen view of everything a handler did during one run.
///
/// Expectations are evaluated against a snapshot, and a passing
/// [`HandlerTest`](crate::HandlerTest) returns it so tests can inspect the
/// recorded operations directly. Snapshots are cheap to clone.
#[derive(Clone)]
pub struct Snapshot {
    records: Arc<Vec<Record>>,
    dispatch_stopped: bool,
    handle_later: bool,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("records", &self.records.len())
            .field("dispatch_stopped", &self.dispatch_stopped)
            .field("handle_later", &self.handle_later)
            .finish()
    }
}

impl Snapshot {
    pub(crate) fn new(records: Vec<Record>, dispatch_stopped: bool, handle_later: bool) -> Self {
        Self {
            records: Arc::new(records),
            dispatch_stopped,
            handle_later,
        }
    }

    /// All records in emission order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn of_kind(&self, kind: OperationKind) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |r| r.kind() == kind)
    }

    pub fn sent(&self) -> impl Iterator<Item = &OutgoingMessage<SendOptions>> {
        self.records.iter().filter_map(|r| r.operation().as_send())
    }

    pub fn sent_locally(&self) -> impl Iterator<Item = &OutgoingMessage<SendOptions>> {
        self.records.iter().filter_map(|r| r.operation().as_send_local())
    }

    pub fn published(&self) -> impl Iterator<Item = &OutgoingMessage<PublishOptions>> {
        self.records.iter().filter_map(|r| r.operation().as_publish())
    }

    pub fn replied(&self) -> impl Iterator<Item = &OutgoingMessage<ReplyOptions>> {
        self.records.iter().filter_map(|r| r.operation().as_reply())
    }

    /// Sends (local or not) that carry a delivery constraint.
    pub fn deferred(&self) -> impl Iterator<Item = &OutgoingMessage<SendOptions>> {
        self.records
            .iter()
            .filter_map(|r| r.operation().as_any_send())
            .filter(|m| m.options().delivery_constraint().is_some())
    }

    pub fn forwarded_destinations(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter_map(|r| r.operation().forward_destination())
    }

    /// Messages of declared type `M` sent with [`Context::send`](crate::Context::send).
    pub fn sent_messages<M: Message>(&self) -> Vec<&M> {
        self.sent().filter_map(OutgoingMessage::message::<M>).collect()
    }

    pub fn published_messages<M: Message>(&self) -> Vec<&M> {
        self.published()
            .filter_map(OutgoingMessage::message::<M>)
            .collect()
    }

    pub fn replied_messages<M: Message>(&self) -> Vec<&M> {
        self.replied()
            .filter_map(OutgoingMessage::message::<M>)
            .collect()
    }

    pub fn is_dispatch_stopped(&self) -> bool {
        self.dispatch_stopped
    }

    pub fn is_handle_later_requested(&self) -> bool {
        self.handle_later
    }
}
