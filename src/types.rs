//! Shared types used across the link firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

use crate::config::TICK_PERIOD_US;

/// A reading of the 16-bit link timer
///
/// One tick is 16 µs and the counter wraps every 65536 ticks (~1.049 s).
/// Ticks are instants on a circle: the only meaningful comparison between
/// two of them is how many ticks elapsed from one to the other.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Tick(u16);

impl Tick {
    /// Create a tick from a raw counter value
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Derive the tick counter from a free-running microsecond clock
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_micros(us: u64) -> Self {
        // Truncation is the wrap
        Self((us / TICK_PERIOD_US as u64) as u16)
    }

    /// Get the raw counter value
    #[must_use]
    pub const fn as_raw(self) -> u16 {
        self.0
    }

    /// Ticks elapsed from `earlier` to `self`, modulo 2^16
    #[must_use]
    pub const fn elapsed_since(self, earlier: Self) -> u16 {
        self.0.wrapping_sub(earlier.0)
    }

    /// The tick `ticks` after this one
    #[must_use]
    pub const fn wrapping_add(self, ticks: u16) -> Self {
        Self(self.0.wrapping_add(ticks))
    }
}

impl fmt::Debug for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tick({})", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Tick {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "t{}", self.0);
    }
}

/// Over-the-air data rate in kbit/s
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AirRate(u8);

impl AirRate {
    /// Create an air rate, returns None for zero
    #[must_use]
    pub const fn from_kbps(kbps: u8) -> Option<Self> {
        if kbps == 0 {
            None
        } else {
            Some(Self(kbps))
        }
    }

    /// Get the rate in kbit/s
    #[must_use]
    pub const fn as_kbps(self) -> u8 {
        self.0
    }

    /// Microseconds needed to put one byte on the air
    #[must_use]
    pub const fn byte_time_us(self) -> u32 {
        8_000_000 / (self.0 as u32 * 1000)
    }
}

impl fmt::Display for AirRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}kbps", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for AirRate {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}kbps", self.0);
    }
}

/// Which end of the link this firmware is
///
/// Fixed for the lifetime of a scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Samples local pins and sends them; never receives
    Transmit,
    /// Receives pin states and mirrors them; never transmits
    Receive,
}

impl Role {
    /// Check if this is the sending end
    #[must_use]
    pub const fn is_transmit(self) -> bool {
        matches!(self, Self::Transmit)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Role {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Transmit => defmt::write!(f, "TX"),
            Self::Receive => defmt::write!(f, "RX"),
        }
    }
}

/// Status LED state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LedState {
    /// LED is off
    #[default]
    Off,
    /// LED is on
    On,
}

impl LedState {
    /// LED state for a boolean level
    #[must_use]
    pub const fn from_bool(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LedState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "OFF"),
            Self::On => defmt::write!(f, "ON"),
        }
    }
}

/// Direction of a user pin
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinDirection {
    /// Pin is sampled
    Input,
    /// Pin is driven
    Output,
}

#[cfg(feature = "embedded")]
impl defmt::Format for PinDirection {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Input => defmt::write!(f, "IN"),
            Self::Output => defmt::write!(f, "OUT"),
        }
    }
}
