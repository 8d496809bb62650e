//! User Pins
//!
//! The transmitting end samples its user pins every loop iteration and
//! requests an urgent burst when they change. The receiving end drives its
//! user pins from the last valid packet, touching them only when the
//! mirrored state actually changes.
//!
//! On boards with more than five user pins, pin 4 selects console mode
//! (pulled up, so it is active unless grounded) and pin 5 is a ground
//! reference for it.

use crate::config::{CONSOLE_GROUND_PIN, CONSOLE_MODE_PIN, PIN_SEND_MAX};
use crate::protocol::PinStatePacket;
use crate::radio::link::PinHook;
use crate::radio::signals::LinkSignals;
use crate::types::{PinDirection, Role};

/// Electrical access to the numbered user pins
///
/// Pins outside `0..count()` are rejected: setters return false and
/// `read` returns None.
pub trait UserPins {
    /// Number of user pins on the board
    fn count(&self) -> u8;

    /// Make a pin an input or an output
    fn set_direction(&mut self, pin: u8, direction: PinDirection) -> bool;

    /// Drive an output pin, or enable (high) / disable (low) the pull-up of an input
    fn set_level(&mut self, pin: u8, high: bool) -> bool;

    /// Sample a pin
    fn read(&mut self, pin: u8) -> Option<bool>;
}

/// Per-iteration pin change detector
pub struct PinMonitor<P> {
    role: Role,
    pins: P,
    /// Mask last sampled (TX) or last applied (RX)
    last_mask: u8,
}

impl<P: UserPins> PinMonitor<P> {
    /// Create a detector for `role`
    #[must_use]
    pub const fn new(role: Role, pins: P) -> Self {
        Self {
            role,
            pins,
            last_mask: 0,
        }
    }

    /// Get the pins
    #[must_use]
    pub const fn pins(&self) -> &P {
        &self.pins
    }

    /// Number of pins carried in the packet
    #[must_use]
    pub fn send_count(&self) -> u8 {
        self.pins.count().min(PIN_SEND_MAX)
    }

    /// Configure the pins for the role and seed the shared packet
    pub fn init(&mut self, signals: &LinkSignals) {
        signals.set_packet(PinStatePacket::new(self.send_count(), 0));
        self.last_mask = 0;

        let (direction, level) = match self.role {
            Role::Transmit => (PinDirection::Input, true),
            Role::Receive => (PinDirection::Output, false),
        };
        for pin in 0..self.pins.count() {
            self.pins.set_direction(pin, direction);
            self.pins.set_level(pin, level);
        }

        if self.has_console_pin() {
            self.pins.set_direction(CONSOLE_MODE_PIN, PinDirection::Input);
            self.pins.set_level(CONSOLE_MODE_PIN, true);
            self.pins.set_direction(CONSOLE_GROUND_PIN, PinDirection::Output);
            self.pins.set_level(CONSOLE_GROUND_PIN, false);
        }

        link_info!(
            "{} user pins, {} mirrored",
            self.pins.count(),
            self.send_count()
        );
    }

    fn has_console_pin(&self) -> bool {
        CONSOLE_GROUND_PIN < self.pins.count()
    }

    fn sample(&mut self) -> u8 {
        (0..self.send_count()).fold(0, |mask, pin| {
            if self.pins.read(pin).unwrap_or(false) {
                mask | (1 << pin)
            } else {
                mask
            }
        })
    }

    fn apply(&mut self, packet: PinStatePacket) {
        let count = packet.pin_count().min(PIN_SEND_MAX);
        for pin in 0..count {
            self.pins.set_level(pin, packet.pin(pin));
        }
        self.last_mask = packet.pin_state();
    }
}

impl<P: UserPins> PinHook for PinMonitor<P> {
    fn check(&mut self, signals: &LinkSignals) -> bool {
        match self.role {
            Role::Transmit => {
                let mask = self.sample();
                let previous = signals.swap_packet(signals.packet().with_pin_state(mask));
                self.last_mask = mask;
                if previous.pin_state() != mask {
                    signals.request_update();
                }
            }
            Role::Receive => {
                let packet = signals.packet();
                if packet.is_valid() && packet.pin_state() != self.last_mask {
                    self.apply(packet);
                }
            }
        }

        self.has_console_pin() && self.pins.read(CONSOLE_MODE_PIN).unwrap_or(false)
    }
}
