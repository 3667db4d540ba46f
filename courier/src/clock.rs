use chrono::{DateTime, Utc};

/// Source of the recording time stamped on every operation.
///
/// Duration-based deferrals are resolved against this clock: a
/// `delay_delivery_with(d)` recorded at `t0` has the delivery date `t0 + d`.
/// Pin the clock with [`Clock::Fixed`] to assert on exact delivery dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Clock {
    /// Wall-clock UTC time.
    #[default]
    System,
    /// Every operation is recorded at the same instant.
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}
