//! Link Activity Indicator
//!
//! Blinks the status LEDs every half timer wrap (~0.524 s) and paces the
//! thermal governor, which runs on every fourth blink (~2 s).
//!
//! On the transmitting end the two LEDs alternate with the blink flag.
//! On the receiving end the activity LED blinks while the radio LED only
//! lights for a blink in which at least one packet arrived.

use crate::config::GOVERNOR_DIVIDER;
use crate::radio::link::StatusLeds;
use crate::radio::signals::LinkSignals;
use crate::types::{LedState, Role};

/// Blink and governor pacing state
#[derive(Clone, Copy, Debug)]
pub struct LinkActivityIndicator {
    role: Role,
    blink_state: bool,
    calls: u8,
}

impl LinkActivityIndicator {
    /// Create with the blink flag clear
    #[must_use]
    pub const fn new(role: Role) -> Self {
        Self {
            role,
            blink_state: false,
            calls: 0,
        }
    }

    /// Get the blink flag
    #[must_use]
    pub const fn blink_state(&self) -> bool {
        self.blink_state
    }

    /// Update the LEDs, returning true when the thermal governor is due
    pub fn update<L: StatusLeds>(&mut self, leds: &mut L, signals: &LinkSignals) -> bool {
        if self.role.is_transmit() {
            leds.set_radio(LedState::from_bool(self.blink_state));
            leds.set_activity(LedState::from_bool(!self.blink_state));
        } else {
            let received = signals.take_received();
            leds.set_radio(LedState::from_bool(received));
            leds.set_activity(LedState::from_bool(!self.blink_state));
        }
        self.blink_state = !self.blink_state;

        self.calls += 1;
        if self.calls >= GOVERNOR_DIVIDER {
            self.calls = 0;
            true
        } else {
            false
        }
    }
}
