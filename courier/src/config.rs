use crate::{Clock, Headers};

/// Per-run configuration for a [`HandlerTest`](crate::HandlerTest).
///
/// Holds the defaults a test suite usually shares between runs: the
/// recording clock, the reply-to address of the inbound message and a base
/// set of incoming headers. Nothing here is process-wide; every runner gets
/// its own copy. Use the builder methods to customize, or [`Default`].
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use courier::{Clock, Config};
///
/// let config = Config::default()
///     .with_clock(Clock::Fixed(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()))
///     .with_reply_to_address("billing")
///     .with_default_header("TenantId", "acme");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Time source for recorded operations.
    /// Default: [`Clock::System`]
    clock: Clock,

    /// Reply-to address of the inbound message.
    /// Default: none
    reply_to_address: Option<String>,

    /// Headers present on every inbound message before per-test headers
    /// are applied.
    /// Default: empty
    default_headers: Headers,
}

impl Config {
    /// Set the clock used to stamp recorded operations.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Set the reply-to address of the inbound message.
    pub fn with_reply_to_address(mut self, address: impl Into<String>) -> Self {
        self.reply_to_address = Some(address.into());
        self
    }

    pub fn reply_to_address(&self) -> Option<&str> {
        self.reply_to_address.as_deref()
    }

    /// Add a header present on every inbound message.
    ///
    /// Headers set on the runner with
    /// [`set_incoming_header`](crate::HandlerTest::set_incoming_header)
    /// override these.
    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key, value);
        self
    }

    pub fn default_headers(&self) -> &Headers {
        &self.default_headers
    }
}
