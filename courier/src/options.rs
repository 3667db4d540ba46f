//! Delivery options handlers attach to outgoing operations.

use std::{fmt, marker::PhantomData, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};

use crate::{Error, Headers, Result};

/// When a deferred message becomes deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeliveryConstraint {
    /// Deliver once this much time has passed since the operation was recorded.
    DelayFor(Duration),
    /// Deliver no earlier than this instant.
    NotBefore(DateTime<Utc>),
}

impl DeliveryConstraint {
    /// Resolve to an absolute delivery date for an operation recorded at
    /// `recorded_at`. Returns `None` if the delay overflows the calendar.
    pub fn delivery_date(&self, recorded_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DeliveryConstraint::DelayFor(delay) => TimeDelta::from_std(*delay)
                .ok()
                .and_then(|delta| recorded_at.checked_add_signed(delta)),
            DeliveryConstraint::NotBefore(at) => Some(*at),
        }
    }
}

/// Marker for [`SendOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendKind {}

/// Marker for [`PublishOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishKind {}

/// Marker for [`ReplyOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyKind {}

pub type SendOptions = Options<SendKind>;
pub type PublishOptions = Options<PublishKind>;
pub type ReplyOptions = Options<ReplyKind>;

/// Options for one outgoing operation.
///
/// The harness never acts on these; it records them so expectations can
/// inspect destination overrides, deferrals and custom headers. The marker
/// parameter keeps send, publish and reply options from being mixed up.
///
/// Conflicting settings fail when they are introduced: a delay and a
/// not-before date cannot both be set, and a send cannot both be routed to
/// this endpoint and to an explicit destination.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct Options<K> {
    destination: Option<String>,
    delivery: Option<DeliveryConstraint>,
    route_to_this_endpoint: bool,
    headers: Headers,
    #[cfg_attr(feature = "serde", serde(skip))]
    _kind: PhantomData<fn() -> K>,
}

impl<K> Options<K> {
    pub fn new() -> Self {
        Self {
            destination: None,
            delivery: None,
            route_to_this_endpoint: false,
            headers: Headers::new(),
            _kind: PhantomData,
        }
    }

    /// Override the destination the message is sent to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty destination and
    /// [`Error::Configuration`] if the message is already routed to this
    /// endpoint.
    pub fn set_destination(&mut self, destination: impl Into<String>) -> Result<()> {
        let destination = destination.into();
        if destination.trim().is_empty() {
            return Err(Error::invalid_argument("destination must not be empty"));
        }
        if self.route_to_this_endpoint {
            return Err(Error::configuration(
                "cannot set an explicit destination on a message routed to this endpoint",
            ));
        }
        self.destination = Some(destination);
        Ok(())
    }

    /// Defer delivery by `delay`, measured from the time the operation is
    /// recorded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a not-before date is already set.
    pub fn delay_delivery_with(&mut self, delay: Duration) -> Result<()> {
        if let Some(DeliveryConstraint::NotBefore(at)) = self.delivery {
            return Err(Error::configuration(format!(
                "delivery is already constrained to not before {at}; cannot also delay by {delay:?}"
            )));
        }
        self.delivery = Some(DeliveryConstraint::DelayFor(delay));
        Ok(())
    }

    /// Defer delivery until `at`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a delay is already set.
    pub fn do_not_deliver_before(&mut self, at: DateTime<Utc>) -> Result<()> {
        if let Some(DeliveryConstraint::DelayFor(delay)) = self.delivery {
            return Err(Error::configuration(format!(
                "delivery is already delayed by {delay:?}; cannot also constrain to not before {at}"
            )));
        }
        self.delivery = Some(DeliveryConstraint::NotBefore(at));
        Ok(())
    }

    /// Set a custom header on the outgoing message.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key, value);
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key, value);
        self
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn delivery_constraint(&self) -> Option<DeliveryConstraint> {
        self.delivery
    }

    /// The delay set with [`delay_delivery_with`](Self::delay_delivery_with).
    pub fn delivery_delay(&self) -> Option<Duration> {
        match self.delivery {
            Some(DeliveryConstraint::DelayFor(delay)) => Some(delay),
            _ => None,
        }
    }

    /// The date set with [`do_not_deliver_before`](Self::do_not_deliver_before).
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        match self.delivery {
            Some(DeliveryConstraint::NotBefore(at)) => Some(at),
            _ => None,
        }
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn is_routed_to_this_endpoint(&self) -> bool {
        self.route_to_this_endpoint
    }
}

impl SendOptions {
    /// Send the message to the endpoint that is handling the current message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if an explicit destination is set.
    pub fn route_to_this_endpoint(&mut self) -> Result<()> {
        if let Some(destination) = &self.destination {
            return Err(Error::configuration(format!(
                "cannot route to this endpoint; destination is already set to '{destination}'"
            )));
        }
        self.route_to_this_endpoint = true;
        Ok(())
    }
}

impl<K> Default for Options<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for Options<K> {
    fn clone(&self) -> Self {
        Self {
            destination: self.destination.clone(),
            delivery: self.delivery,
            route_to_this_endpoint: self.route_to_this_endpoint,
            headers: self.headers.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K> PartialEq for Options<K> {
    fn eq(&self, other: &Self) -> bool {
        self.destination == other.destination
            && self.delivery == other.delivery
            && self.route_to_this_endpoint == other.route_to_this_endpoint
            && self.headers == other.headers
    }
}

impl<K> Eq for Options<K> {}

impl<K> fmt::Debug for Options<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("destination", &self.destination)
            .field("delivery", &self.delivery)
            .field("route_to_this_endpoint", &self.route_to_this_endpoint)
            .field("headers", &self.headers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn delay_resolves_against_recording_time() {
        let constraint = DeliveryConstraint::DelayFor(Duration::from_secs(600));
        assert_eq!(
            constraint.delivery_date(noon()),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 10, 0).unwrap())
        );
    }

    #[test]
    fn not_before_is_literal() {
        let at = noon();
        let constraint = DeliveryConstraint::NotBefore(at);
        assert_eq!(constraint.delivery_date(Utc::now()), Some(at));
    }

    #[test]
    fn overflowing_delay_has_no_date() {
        let constraint = DeliveryConstraint::DelayFor(Duration::MAX);
        assert_eq!(constraint.delivery_date(noon()), None);
    }

    #[test]
    fn delay_and_not_before_conflict() {
        let mut options = SendOptions::new();
        options.delay_delivery_with(Duration::from_secs(5)).unwrap();
        assert!(matches!(
            options.do_not_deliver_before(noon()),
            Err(Error::Configuration(_))
        ));
        assert_eq!(options.delivery_delay(), Some(Duration::from_secs(5)));

        let mut options = SendOptions::new();
        options.do_not_deliver_before(noon()).unwrap();
        assert!(matches!(
            options.delay_delivery_with(Duration::from_secs(5)),
            Err(Error::Configuration(_))
        ));
        assert_eq!(options.not_before(), Some(noon()));
    }

    #[test]
    fn resetting_the_same_constraint_kind_overwrites() {
        let mut options = SendOptions::new();
        options.delay_delivery_with(Duration::from_secs(5)).unwrap();
        options.delay_delivery_with(Duration::from_secs(9)).unwrap();
        assert_eq!(options.delivery_delay(), Some(Duration::from_secs(9)));
    }

    #[test]
    fn route_to_this_endpoint_conflicts_with_destination() {
        let mut options = SendOptions::new();
        options.set_destination("billing").unwrap();
        assert!(matches!(
            options.route_to_this_endpoint(),
            Err(Error::Configuration(_))
        ));

        let mut options = SendOptions::new();
        options.route_to_this_endpoint().unwrap();
        assert!(matches!(
            options.set_destination("billing"),
            Err(Error::Configuration(_))
        ));
        assert!(options.is_routed_to_this_endpoint());
    }

    #[test]
    fn empty_destination_is_rejected() {
        let mut options = PublishOptions::new();
        assert!(matches!(
            options.set_destination("  "),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(options.destination(), None);
    }

    #[test]
    fn equality_covers_all_settings() {
        let a = ReplyOptions::new().with_header("CorrelationId", "42");
        let b = ReplyOptions::new().with_header("CorrelationId", "42");
        let c = ReplyOptions::new().with_header("CorrelationId", "43");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.headers().get("CorrelationId"), Ok("42"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn round_trips_through_json() {
        let mut options = SendOptions::new().with_header("Key", "Value");
        options.set_destination("billing").unwrap();
        options.delay_delivery_with(Duration::from_secs(30)).unwrap();

        let json = serde_json::to_string(&options).unwrap();
        let back: SendOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
