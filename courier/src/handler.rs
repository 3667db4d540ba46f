use std::future::Future;

use crate::{Context, Message, Result};

/// A component that handles one inbound message of type `M`.
///
/// A type may implement `Handler` for several message types. The test runner
/// always invokes the implementation for the message type it was given, so
/// an inherent method with the same name on the handler is never called by
/// mistake.
///
/// # Ergonomics
///
/// `handle` returns a future but can be implemented as `async fn` directly.
/// No `#[async_trait]` macro is required.
///
/// # Example
///
/// ```rust
/// use courier::{Context, Handler, Message, PublishOptions, Result};
///
/// #[derive(Debug)]
/// struct PlaceOrder { id: u64 }
/// impl Message for PlaceOrder {}
///
/// #[derive(Debug)]
/// struct OrderPlaced { id: u64 }
/// impl Message for OrderPlaced {}
///
/// struct PlaceOrderHandler;
///
/// impl Handler<PlaceOrder> for PlaceOrderHandler {
///     async fn handle(&mut self, message: &PlaceOrder, ctx: &Context) -> Result {
///         ctx.publish(OrderPlaced { id: message.id }, PublishOptions::new()).await
///     }
/// }
/// ```
///
/// See also: [`Context`], [`HandlerTest`](crate::HandlerTest).
pub trait Handler<M: Message>: Send {
    /// Handle `message`, issuing outgoing operations through `ctx`.
    ///
    /// Returning an error signals a handler fault. The runner hands it back
    /// to the test unchanged and skips verification.
    fn handle(&mut self, message: &M, ctx: &Context) -> impl Future<Output = Result> + Send;
}

impl<M: Message, H: Handler<M>> Handler<M> for &mut H {
    fn handle(&mut self, message: &M, ctx: &Context) -> impl Future<Output = Result> + Send {
        (**self).handle(message, ctx)
    }
}
