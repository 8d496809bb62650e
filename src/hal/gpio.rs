//! GPIO Abstractions
//!
//! Status LEDs and the numbered user pins of the link board.

use embassy_stm32::gpio::{Flex, Pull, Speed};
use embedded_hal::digital::{OutputPin, PinState};

use crate::pins::UserPins;
use crate::radio::link::StatusLeds;
use crate::types::{LedState, PinDirection};

/// Status LED driver
pub struct StatusLed<P> {
    pin: P,
    state: LedState,
}

impl<P: OutputPin> StatusLed<P> {
    /// Create a new status LED (initially off)
    #[must_use]
    pub fn new(pin: P) -> Self {
        let mut led = Self {
            pin,
            state: LedState::On,
        };
        led.set(LedState::Off);
        led
    }

    /// Drive the LED, keeping the last state that reached the pin
    pub fn set(&mut self, state: LedState) {
        let level = PinState::from(state == LedState::On);
        if self.pin.set_state(level).is_ok() {
            self.state = state;
        }
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> LedState {
        self.state
    }
}

/// The green radio LED and red activity LED
pub struct LinkLeds<R, A> {
    radio: StatusLed<R>,
    activity: StatusLed<A>,
}

impl<R: OutputPin, A: OutputPin> LinkLeds<R, A> {
    /// Pair the two LEDs
    #[must_use]
    pub fn new(radio: R, activity: A) -> Self {
        Self {
            radio: StatusLed::new(radio),
            activity: StatusLed::new(activity),
        }
    }
}

impl<R: OutputPin, A: OutputPin> StatusLeds for LinkLeds<R, A> {
    fn set_radio(&mut self, state: LedState) {
        self.radio.set(state);
    }

    fn set_activity(&mut self, state: LedState) {
        self.activity.set(state);
    }
}

/// User pins on flexible GPIOs
///
/// An input with its level set high has the internal pull-up enabled.
pub struct FlexPins<'d, const N: usize> {
    pins: [Flex<'d>; N],
    directions: [PinDirection; N],
}

impl<'d, const N: usize> FlexPins<'d, N> {
    /// Take the pins, all starting as floating inputs
    #[must_use]
    pub fn new(mut pins: [Flex<'d>; N]) -> Self {
        for pin in &mut pins {
            pin.set_as_input(Pull::None);
        }
        Self {
            pins,
            directions: [PinDirection::Input; N],
        }
    }
}

impl<const N: usize> UserPins for FlexPins<'_, N> {
    #[allow(clippy::cast_possible_truncation)]
    fn count(&self) -> u8 {
        N.min(usize::from(u8::MAX)) as u8
    }

    fn set_direction(&mut self, pin: u8, direction: PinDirection) -> bool {
        let index = usize::from(pin);
        let (Some(flex), Some(slot)) = (self.pins.get_mut(index), self.directions.get_mut(index))
        else {
            return false;
        };
        match direction {
            PinDirection::Input => flex.set_as_input(Pull::None),
            PinDirection::Output => flex.set_as_output(Speed::Low),
        }
        *slot = direction;
        true
    }

    fn set_level(&mut self, pin: u8, high: bool) -> bool {
        let index = usize::from(pin);
        let (Some(flex), Some(direction)) = (self.pins.get_mut(index), self.directions.get(index))
        else {
            return false;
        };
        match (direction, high) {
            (PinDirection::Input, true) => flex.set_as_input(Pull::Up),
            (PinDirection::Input, false) => flex.set_as_input(Pull::None),
            (PinDirection::Output, true) => flex.set_high(),
            (PinDirection::Output, false) => flex.set_low(),
        }
        true
    }

    fn read(&mut self, pin: u8) -> Option<bool> {
        self.pins.get(usize::from(pin)).map(Flex::is_high)
    }
}
