//! Shared messages and handlers for the integration tests.

#![allow(dead_code)] // Each test file uses a different subset.

use courier::{Context, Error, Handler, Message, Result, Violation};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Incoming {
    pub number: i32,
    pub header1: String,
    pub header2: String,
}
impl Message for Incoming {}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Outgoing {
    pub number: i32,
}
impl Message for Outgoing {}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Outgoing2 {
    pub number: i32,
}
impl Message for Outgoing2 {}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Event1 {
    pub data: String,
}
impl Message for Event1 {}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Event2 {
    pub data: String,
}
impl Message for Event2 {}

/// A handler whose body is a plain closure.
///
/// Context operations are recorded when they are called, so a synchronous
/// closure can drive them with `Ready::into_inner`.
pub struct Scripted<F>(pub F);

impl<F> Handler<Incoming> for Scripted<F>
where
    F: FnMut(&Incoming, &Context) -> Result + Send,
{
    async fn handle(&mut self, message: &Incoming, ctx: &Context) -> Result {
        (self.0)(message, ctx)
    }
}

pub fn script<F>(body: F) -> Scripted<F>
where
    F: FnMut(&Incoming, &Context) -> Result + Send,
{
    Scripted(body)
}

/// Does nothing with the message.
#[derive(Debug, Default)]
pub struct EmptyHandler;

impl Handler<Incoming> for EmptyHandler {
    async fn handle(&mut self, _message: &Incoming, _ctx: &Context) -> Result {
        Ok(())
    }
}

/// Assert that a run failed verification in the given direction.
#[track_caller]
pub fn assert_violation<T: std::fmt::Debug>(result: Result<T>, expected: Violation) -> String {
    match result {
        Err(Error::Expectation(e)) => {
            assert_eq!(e.violation(), expected, "{}", e.message());
            e.message().to_owned()
        }
        other => panic!("expected an expectation failure, got {other:?}"),
    }
}
