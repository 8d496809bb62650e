//! Timer Abstractions
//!
//! The link counts time in 16 µs ticks on a 16-bit counter. On target the
//! counter is derived from the embassy time driver, which already runs
//! from a hardware timer.

use embassy_time::{Duration, Instant};

use crate::radio::link::TimeBase;
use crate::types::Tick;

/// Tick source backed by `embassy_time`
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyTickClock;

impl EmbassyTickClock {
    /// Create the clock
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TimeBase for EmbassyTickClock {
    fn now(&self) -> Tick {
        Tick::from_micros(Instant::now().as_micros())
    }
}

/// Deadline measured in link ticks
#[derive(Clone, Copy, Debug)]
pub struct TickDeadline {
    deadline: Instant,
}

impl TickDeadline {
    /// A deadline `ticks` from now
    #[must_use]
    pub fn after_ticks(ticks: u32) -> Self {
        let us = u64::from(ticks) * u64::from(crate::config::TICK_PERIOD_US);
        Self {
            deadline: Instant::now() + Duration::from_micros(us),
        }
    }

    /// A deadline that has already passed
    #[must_use]
    pub fn expired() -> Self {
        Self {
            deadline: Instant::from_ticks(0),
        }
    }

    /// Check if the deadline has passed
    #[must_use]
    pub fn has_passed(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

impl defmt::Format for TickDeadline {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "TickDeadline({}us)", self.deadline.as_micros());
    }
}
