//! Deferred sends and control directives.

mod common;

use std::{future::Ready, time::Duration};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use courier::{Clock, Config, Context, Handler, Result, SendOptions, Violation, handler, handler_default};

use common::*;

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn fixed_clock() -> Config {
    Config::default().with_clock(Clock::Fixed(noon()))
}

#[derive(Default)]
struct DeferringTimeSpanHandler {
    defer: Duration,
}

impl Handler<Incoming> for DeferringTimeSpanHandler {
    async fn handle(&mut self, _message: &Incoming, ctx: &Context) -> Result {
        ctx.defer(self.defer, Outgoing::default()).await
    }
}

#[derive(Default)]
struct DeferringDateTimeHandler {
    defer: Option<DateTime<Utc>>,
}

impl Handler<Incoming> for DeferringDateTimeHandler {
    async fn handle(&mut self, _message: &Incoming, ctx: &Context) -> Result {
        match self.defer {
            Some(at) => ctx.defer_until(at, Outgoing::default()).await,
            None => Ok(()),
        }
    }
}

#[tokio::test]
async fn defer_by_duration_is_visible_as_a_delay() {
    let ten_minutes = Duration::from_secs(600);
    handler_default::<DeferringTimeSpanHandler>()
        .with_external_dependencies(|h| h.defer = ten_minutes)
        .expect_delayed_by(move |_: &Outgoing, delay| delay == ten_minutes)
        .on_message(Incoming::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn defer_by_date_is_visible_as_a_delivery_date() {
    let at = noon() + TimeDelta::hours(3);
    handler_default::<DeferringDateTimeHandler>()
        .with_external_dependencies(|h| h.defer = Some(at))
        .expect_defer(move |_: &Outgoing, date| date == at)
        .expect_not_delayed_by(|_: &Outgoing, _| true)
        .on_message(Incoming::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn delay_and_date_resolve_to_the_same_delivery_date() {
    let expected = noon() + TimeDelta::minutes(10);

    handler_default::<DeferringTimeSpanHandler>()
        .with_config(fixed_clock())
        .with_external_dependencies(|h| h.defer = Duration::from_secs(600))
        .expect_defer(move |_: &Outgoing, date| date == expected)
        .on_message(Incoming::default())
        .await
        .unwrap();

    handler_default::<DeferringDateTimeHandler>()
        .with_config(fixed_clock())
        .with_external_dependencies(|h| h.defer = Some(expected))
        .expect_defer(move |_: &Outgoing, date| date == expected)
        .on_message(Incoming::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn expect_defer_fails_when_nothing_is_deferred() {
    let message = assert_violation(
        handler_default::<EmptyHandler>()
            .expect_defer(|_: &Outgoing, _| true)
            .on_message(Incoming::default())
            .await,
        Violation::Absent,
    );
    assert!(message.contains("to be deferred"));

    assert_violation(
        handler_default::<EmptyHandler>()
            .expect_delayed_by(|_: &Outgoing, _| true)
            .on_message(Incoming::default())
            .await,
        Violation::Absent,
    );
}

#[tokio::test]
async fn expect_not_defer_passes_when_nothing_is_deferred() {
    handler_default::<EmptyHandler>()
        .expect_not_defer(|_: &Outgoing, _| true)
        .expect_not_delayed_by(|_: &Outgoing, _| true)
        .on_message(Incoming::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn expect_not_defer_fails_when_deferred() {
    let ten_minutes = Duration::from_secs(600);
    assert_violation(
        handler_default::<DeferringTimeSpanHandler>()
            .with_external_dependencies(|h| h.defer = ten_minutes)
            .expect_not_delayed_by(move |_: &Outgoing, delay| delay == ten_minutes)
            .on_message(Incoming::default())
            .await,
        Violation::Present,
    );

    let at = Utc::now();
    assert_violation(
        handler_default::<DeferringDateTimeHandler>()
            .with_external_dependencies(|h| h.defer = Some(at))
            .expect_not_defer(move |_: &Outgoing, date| date == at)
            .on_message(Incoming::default())
            .await,
        Violation::Present,
    );
}

#[tokio::test]
async fn a_plain_send_is_not_a_deferral() {
    handler(script(|_, ctx| {
        Ready::into_inner(ctx.send(Outgoing::default(), SendOptions::new()))
    }))
    .expect_send(|_: &Outgoing| true)
    .expect_not_defer(|_: &Outgoing, _| true)
    .on_message(Incoming::default())
    .await
    .unwrap();
}

#[tokio::test]
async fn deferred_local_sends_count_as_deferrals() {
    handler(script(|_, ctx| {
        let mut options = SendOptions::new();
        options.delay_delivery_with(Duration::from_secs(30))?;
        Ready::into_inner(ctx.send_local(Outgoing::default(), options))
    }))
    .expect_delayed_by(|_: &Outgoing, delay| delay == Duration::from_secs(30))
    .on_message(Incoming::default())
    .await
    .unwrap();
}

#[tokio::test]
async fn conflicting_delivery_options_fail_the_handler() {
    let err = handler(script(|_, ctx| {
        let mut options = SendOptions::new();
        options.delay_delivery_with(Duration::from_secs(30))?;
        options.do_not_deliver_before(Utc::now())?;
        Ready::into_inner(ctx.send(Outgoing::default(), options))
    }))
    .expect_defer(|_: &Outgoing, _| true)
    .on_message(Incoming::default())
    .await
    .unwrap_err();

    assert!(matches!(err, courier::Error::Configuration(_)));
}

// ==================== Control ====================

#[tokio::test]
async fn do_not_continue_dispatching_is_asserted() {
    let body = |_: &Incoming, ctx: &Context| {
        Ready::into_inner(ctx.do_not_continue_dispatching_current_message_to_handlers())
    };

    handler(script(body))
        .expect_do_not_continue_dispatching()
        .on_message(Incoming::default())
        .await
        .unwrap();

    assert_violation(
        handler(script(body))
            .expect_continue_dispatching()
            .on_message(Incoming::default())
            .await,
        Violation::Present,
    );

    assert_violation(
        handler_default::<EmptyHandler>()
            .expect_do_not_continue_dispatching()
            .on_message(Incoming::default())
            .await,
        Violation::Absent,
    );
}

#[tokio::test]
async fn handle_current_message_later_is_asserted() {
    let body = |_: &Incoming, ctx: &Context| Ready::into_inner(ctx.handle_current_message_later());

    let snapshot = handler(script(body))
        .expect_handle_current_message_later()
        .expect_continue_dispatching()
        .on_message(Incoming::default())
        .await
        .unwrap();
    assert!(snapshot.is_handle_later_requested());

    assert_violation(
        handler_default::<EmptyHandler>()
            .expect_handle_current_message_later()
            .on_message(Incoming::default())
            .await,
        Violation::Absent,
    );

    assert_violation(
        handler(script(body))
            .expect_not_handle_current_message_later()
            .on_message(Incoming::default())
            .await,
        Violation::Present,
    );
}

#[tokio::test]
async fn control_directives_are_idempotent() {
    let snapshot = handler(script(|_, ctx| {
        Ready::into_inner(ctx.do_not_continue_dispatching_current_message_to_handlers())?;
        Ready::into_inner(ctx.do_not_continue_dispatching_current_message_to_handlers())?;
        Ready::into_inner(ctx.handle_current_message_later())?;
        Ready::into_inner(ctx.handle_current_message_later())
    }))
    .expect_do_not_continue_dispatching()
    .expect_handle_current_message_later()
    .on_message(Incoming::default())
    .await
    .unwrap();

    assert_eq!(snapshot.len(), 2);
}

struct Stopper;

impl Handler<Incoming> for Stopper {
    async fn handle(&mut self, _message: &Incoming, ctx: &Context) -> Result {
        ctx.do_not_continue_dispatching_current_message_to_handlers().await?;
        ctx.handle_current_message_later().await
    }
}

#[tokio::test]
async fn control_directives_can_be_awaited() {
    handler(Stopper)
        .expect_do_not_continue_dispatching()
        .expect_handle_current_message_later()
        .on_message(Incoming::default())
        .await
        .unwrap();
}
