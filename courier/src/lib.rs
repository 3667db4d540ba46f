#![cfg_attr(docsrs, feature(doc_cfg))]
//! # Courier
//!
//! A behavior-verification harness for message handlers.
//!
//! A handler receives one message and reacts by sending, publishing or
//! replying with other messages, deferring them, forwarding the inbound
//! message, or telling the pipeline to stop dispatching. Courier runs a
//! handler once against a recording [`Context`] and then checks, declaratively,
//! which of those operations did or did not happen. No transport, broker or
//! process is involved.
//!
//! ## Quick Start
//!
//! ```rust
//! use courier::*;
//!
//! #[derive(Debug, Default)]
//! struct PlaceOrder {
//!     id: u64,
//! }
//! impl Message for PlaceOrder {}
//!
//! #[derive(Debug)]
//! struct OrderPlaced {
//!     id: u64,
//! }
//! impl Message for OrderPlaced {}
//!
//! struct PlaceOrderHandler;
//!
//! impl Handler<PlaceOrder> for PlaceOrderHandler {
//!     async fn handle(&mut self, message: &PlaceOrder, ctx: &Context) -> Result {
//!         ctx.publish(OrderPlaced { id: message.id }, PublishOptions::new()).await?;
//!         ctx.forward_current_message_to("audit").await
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result {
//!     let snapshot = courier::handler(PlaceOrderHandler)
//!         .expect_publish(|m: &OrderPlaced| m.id == 7)
//!         .expect_forward(|destination| destination == "audit")
//!         .expect_not_reply(|_: &OrderPlaced| true)
//!         .on_message_new(|m: &mut PlaceOrder| m.id = 7)
//!         .await?;
//!
//!     assert_eq!(snapshot.len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Marker trait for inbound and outgoing message types |
//! | [`Handler`] | Trait implemented by the component under test |
//! | [`Context`] | Records every operation the handler issues |
//! | [`HandlerTest`] | Configures, runs and verifies one handler invocation |
//! | [`Expectation`] | A check over the recorded operations |
//! | [`Snapshot`] | The frozen record of one run |
//! | [`Config`] | Clock, reply-to address and default headers for a run |
//!
//! ## Expectations
//!
//! Every operation kind has a "must occur" and a "must not occur" form. A
//! message expectation matches on the operation kind and on the type the
//! handler declared for the message, then runs the check:
//!
//! ```rust,ignore
//! courier::handler(MyHandler)
//!     .expect_send_with(|m: &Invoice, opts| opts.destination() == Some("billing"))
//!     .expect_not_publish(|_: &InvoiceFailed| true)
//!     .expect_delayed_by(|_: &Reminder, delay| delay == Duration::from_secs(600))
//!     .expect_do_not_continue_dispatching()
//!     .on_message(incoming)
//!     .await?;
//! ```
//!
//! Expectations are evaluated in registration order once the handler has
//! completed. The first violation is returned as [`Error::Expectation`],
//! carrying an [`ExpectationError`] that names the target and whether it
//! was absent or present.
//!
//! ## Concurrency
//!
//! [`Context`] is cheap to clone and can be moved into tasks the handler
//! spawns. Operations from concurrent tasks are serialized in the order they
//! acquire the record, each with its own sequence number. Once the handler's
//! future resolves the record is sealed; work still running in the
//! background is rejected with [`Error::ContextSealed`].
//!
//! ## Features
//!
//! - **`serde`** - `Serialize`/`Deserialize` for [`Config`], [`Clock`],
//!   [`MessageId`], [`Headers`] and the delivery option types

mod clock;
mod config;
mod context;
mod error;
mod handler;
mod headers;
mod journal;
mod message;
mod message_id;
mod operation;
mod options;
mod snapshot;

pub mod expectation;

pub use clock::Clock;
pub use config::Config;
pub use context::{Completion, Context};
pub use error::{Error, ExpectationError, Violation};
pub use expectation::{
    ControlFlag, ExpectDefer, ExpectDelay, ExpectFlag, ExpectForward, ExpectMessage, Expectation,
    Expectations, Polarity,
};
pub use handler::Handler;
pub use handler_test::{HandlerTest, handler, handler_default};
pub use headers::Headers;
pub use message::{Message, MessageType, instantiate};
pub use message_id::MessageId;
pub use operation::{Operation, OperationKind, OutgoingMessage, Record};
pub use options::{
    DeliveryConstraint, Options, PublishKind, PublishOptions, ReplyKind, ReplyOptions, SendKind,
    SendOptions,
};
pub use snapshot::Snapshot;

/// Convenience alias for `Result<T, courier::Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
