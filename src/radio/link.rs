//! External collaborators of the link loop
//!
//! The scheduler only talks to hardware through these traits. On target
//! they are implemented in `hal` and `drivers`; host tests use mocks.

use crate::radio::signals::LinkSignals;
use crate::types::{AirRate, LedState, Tick};

/// Half-duplex packet transceiver
pub trait RadioLink {
    /// Error reported when a frame cannot be queued
    type Error: core::fmt::Debug;

    /// Configured air data rate
    fn air_rate(&self) -> AirRate;

    /// Check if a frame is still being sent
    fn transmit_in_progress(&self) -> bool;

    /// Start sending `frame`, keeping the channel for `trailing_gap` ticks after it
    ///
    /// # Errors
    ///
    /// Returns the transceiver's error if the frame was not queued.
    fn transmit(&mut self, frame: &[u8], trailing_gap: u16) -> Result<(), Self::Error>;

    /// Copy a pending frame into `buf` without blocking, returning its length
    fn receive(&mut self, buf: &mut [u8]) -> Option<usize>;

    /// Power amplifier temperature in °C
    fn temperature(&mut self) -> i16;

    /// Transmit power in dBm
    fn transmit_power(&self) -> u8;
}

/// Free-running 16-bit tick counter
pub trait TimeBase {
    /// Current tick
    fn now(&self) -> Tick;
}

/// The two status LEDs
pub trait StatusLeds {
    /// Set the radio (green) LED
    fn set_radio(&mut self, state: LedState);

    /// Set the activity (red) LED
    fn set_activity(&mut self, state: LedState);
}

/// Command console that gets the loop while console mode is selected
pub trait CommandConsole {
    /// Handle any pending command input
    fn process(&mut self);
}

/// Console that ignores input
#[derive(Clone, Copy, Debug, Default)]
pub struct NoConsole;

impl CommandConsole for NoConsole {
    fn process(&mut self) {}
}

/// Per-iteration pin change detector
pub trait PinHook {
    /// Sample or apply pin states, returning whether console mode is selected
    ///
    /// May update the shared packet and raise the pending-update flag.
    fn check(&mut self, signals: &LinkSignals) -> bool;
}
