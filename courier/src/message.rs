use std::{
    any::{Any, TypeId, type_name},
    fmt, hash,
    sync::Arc,
};

/// Marker trait for messages a handler receives or emits.
///
/// Implement this for every inbound and outgoing message type. Messages must
/// be `Debug` (failure diagnostics echo offending messages) and
/// `Send + Sync + 'static` because handlers may emit them from spawned tasks.
///
/// Trait objects work too: declare a message trait with `Message` as a
/// supertrait and emit `Box<dyn MyTrait>` or `Arc<dyn MyTrait>`.
/// Expectations match on that declared type, whatever concrete value sits
/// behind it.
///
/// # Example
///
/// ```rust
/// use courier::Message;
///
/// #[derive(Debug, Default)]
/// struct OrderPlaced {
///     order_id: u64,
/// }
///
/// impl Message for OrderPlaced {}
/// ```
pub trait Message: Any + fmt::Debug + Send + Sync {}

impl<M: Message + ?Sized> Message for Box<M> {}

impl<M: Message + ?Sized> Message for Arc<M> {}

/// Create a default message and apply `init` to it.
///
/// This is how the `*_new` operations on [`Context`](crate::Context) and
/// [`HandlerTest::on_message_new`](crate::HandlerTest::on_message_new)
/// build messages: every field starts at its `Default` value and the
/// initializer sets the ones the test cares about.
pub fn instantiate<M: Default>(init: impl FnOnce(&mut M)) -> M {
    let mut message = M::default();
    init(&mut message);
    message
}

/// Discriminator for the declared type of a recorded message.
///
/// Records are tagged with the type the handler *declared* when emitting the
/// message (the generic parameter of `send::<M>`), not the runtime type of a
/// value behind a trait object.
#[derive(Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    pub fn of<M: Message>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: type_name::<M>(),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, e.g. `my_app::messages::Outgoing`.
    #[inline]
    pub fn full_name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths stripped, e.g. `Outgoing` or
    /// `Box<dyn Notification>`.
    pub fn name(&self) -> String {
        short_type_name(self.name)
    }

    #[inline]
    pub fn is<M: Message>(&self) -> bool {
        self.id == TypeId::of::<M>()
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl hash::Hash for MessageType {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageType").field(&self.name).finish()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
        } else {
            out.push(c);
            if !(c.is_alphanumeric() || c == '_') {
                segment_start = out.len();
            }
        }
    }
    out
}
