//! UART-attached Packet Transceiver
//!
//! Drives a radio modem that exchanges length-prefixed frames over a UART:
//! each frame on the wire is one length byte followed by the payload. The
//! modem handles modulation, so the host only tracks how long a frame keeps
//! the channel busy and reads the power amplifier temperature from a
//! thermistor on the ADC.

use embassy_stm32::adc::{Adc, AdcChannel, AnyAdcChannel, SampleTime};
use embassy_stm32::mode::Blocking;
use embassy_stm32::peripherals::ADC1;
use embassy_stm32::usart::{self, Uart};
use heapless::Vec;

use crate::config::{MAX_PACKET_LENGTH, TICK_PERIOD_US};
use crate::hal::timer::TickDeadline;
use crate::radio::link::RadioLink;
use crate::types::AirRate;

/// ADC full-scale count
const ADC_FULL_SCALE: i32 = 4095;
/// ADC reference in millivolts
const ADC_REFERENCE_MV: i32 = 3300;
/// Thermistor output at 0 °C (mV)
const THERMISTOR_OFFSET_MV: i32 = 500;
/// Thermistor slope (mV per °C)
const THERMISTOR_MV_PER_C: i32 = 10;

/// Transceiver error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadioError {
    /// UART transfer failed
    Uart(usart::Error),
    /// Frame does not fit the length prefix
    FrameTooLong(usize),
}

impl From<usart::Error> for RadioError {
    fn from(err: usart::Error) -> Self {
        Self::Uart(err)
    }
}

impl defmt::Format for RadioError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Uart(err) => defmt::write!(f, "UART error: {}", err),
            Self::FrameTooLong(len) => defmt::write!(f, "frame too long: {}", len),
        }
    }
}

/// Linear-output PA thermistor
pub struct PaThermistor<'d> {
    adc: Adc<'d, ADC1>,
    channel: AnyAdcChannel<ADC1>,
}

impl<'d> PaThermistor<'d> {
    /// Take the ADC and the thermistor input
    #[must_use]
    pub fn new(mut adc: Adc<'d, ADC1>, channel: AnyAdcChannel<ADC1>) -> Self {
        adc.set_sample_time(SampleTime::CYCLES247_5);
        Self { adc, channel }
    }

    /// Read the temperature in whole °C
    #[allow(clippy::cast_possible_truncation)]
    pub fn read_celsius(&mut self) -> i16 {
        let raw = i32::from(self.adc.blocking_read(&mut self.channel));
        let mv = raw * ADC_REFERENCE_MV / ADC_FULL_SCALE;
        ((mv - THERMISTOR_OFFSET_MV) / THERMISTOR_MV_PER_C) as i16
    }
}

/// Receive framing state
enum RxState {
    /// Waiting for a length byte
    Length,
    /// Collecting `remaining` more payload bytes
    Payload { remaining: usize },
}

/// Modem on a blocking UART
pub struct UartRadio<'d> {
    uart: Uart<'d, Blocking>,
    thermistor: PaThermistor<'d>,
    air_rate: AirRate,
    tx_power_dbm: u8,
    busy_until: TickDeadline,
    rx_state: RxState,
    rx_frame: Vec<u8, MAX_PACKET_LENGTH>,
}

impl<'d> UartRadio<'d> {
    /// Wrap a configured UART and thermistor
    #[must_use]
    pub fn new(
        uart: Uart<'d, Blocking>,
        thermistor: PaThermistor<'d>,
        air_rate: AirRate,
        tx_power_dbm: u8,
    ) -> Self {
        Self {
            uart,
            thermistor,
            air_rate,
            tx_power_dbm,
            busy_until: TickDeadline::expired(),
            rx_state: RxState::Length,
            rx_frame: Vec::new(),
        }
    }

    /// Ticks `bytes` bytes spend on the air
    fn air_ticks(&self, bytes: usize) -> u32 {
        let bytes = u32::try_from(bytes).unwrap_or(u32::MAX);
        bytes.saturating_mul(self.air_rate.byte_time_us()) / TICK_PERIOD_US
    }

    /// Feed one received byte, returning true when a frame is complete
    fn push_byte(&mut self, byte: u8) -> bool {
        match self.rx_state {
            RxState::Length => {
                self.rx_frame.clear();
                let len = usize::from(byte);
                if len == 0 || len > MAX_PACKET_LENGTH {
                    link_debug!("discarding frame of length {}", byte);
                    return false;
                }
                self.rx_state = RxState::Payload { remaining: len };
                false
            }
            RxState::Payload { remaining } => {
                // capacity equals the largest accepted length
                let _ = self.rx_frame.push(byte);
                if remaining <= 1 {
                    self.rx_state = RxState::Length;
                    true
                } else {
                    self.rx_state = RxState::Payload {
                        remaining: remaining - 1,
                    };
                    false
                }
            }
        }
    }
}

impl RadioLink for UartRadio<'_> {
    type Error = RadioError;

    fn air_rate(&self) -> AirRate {
        self.air_rate
    }

    fn transmit_in_progress(&self) -> bool {
        !self.busy_until.has_passed()
    }

    fn transmit(&mut self, frame: &[u8], trailing_gap: u16) -> Result<(), Self::Error> {
        let len = u8::try_from(frame.len())
            .ok()
            .filter(|&len| usize::from(len) <= MAX_PACKET_LENGTH)
            .ok_or(RadioError::FrameTooLong(frame.len()))?;
        self.uart.blocking_write(&[len])?;
        self.uart.blocking_write(frame)?;
        let busy = self
            .air_ticks(frame.len() + 1)
            .saturating_add(u32::from(trailing_gap));
        self.busy_until = TickDeadline::after_ticks(busy);
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Option<usize> {
        while let Ok(byte) = self.uart.nb_read() {
            if self.push_byte(byte) {
                let len = self.rx_frame.len().min(buf.len());
                buf[..len].copy_from_slice(&self.rx_frame[..len]);
                return Some(self.rx_frame.len());
            }
        }
        None
    }

    fn temperature(&mut self) -> i16 {
        self.thermistor.read_celsius()
    }

    fn transmit_power(&self) -> u8 {
        self.tx_power_dbm
    }
}
