//! TDM Window Timing
//!
//! Derives the fixed timing of the link from the air rate and preamble
//! length. Both ends must arrive at the same round timing even when their
//! preamble settings differ, so the packet latency is first computed for
//! the reference 40-bit preamble and only then corrected for the real one.
//!
//! All values are in 16 µs ticks.

use crate::config::{
    LinkConfig, ConfigError, LBT_MIN_TIME_USEC, MAX_PACKET_LENGTH, MAX_WINDOW_FIELD,
    REFERENCE_PREAMBLE_LENGTH, REGULATORY_MAX_WINDOW, TICK_PERIOD_US, TRAILER_LEN,
};
use crate::types::AirRate;

/// Fixed per-packet overhead in ticks (sync word, header, turnaround)
const PACKET_OVERHEAD_TICKS: u32 = 13;

/// Bytes before the payload, counting the reference preamble
const REFERENCE_HEADER_BYTES: u32 = 8 + (REFERENCE_PREAMBLE_LENGTH as u32) / 2;

/// Full-size packets that fit in one transmit window
const PACKETS_PER_WINDOW: u32 = 3;

/// Timing of the link, computed once at startup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingParameters {
    /// Ticks to send one byte
    ticks_per_byte: u16,
    /// Ticks to send a zero-length packet
    packet_latency: u16,
    /// Width of a transmit window
    tx_window_width: u16,
    /// Quiet time between transmit windows
    silence_period: u16,
    /// Largest payload in one packet
    max_data_packet_length: u8,
    /// Listen time before talking, 0 when LBT is off
    lbt_min_time: u16,
}

/// Inputs to the window calculation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowInputs {
    /// Air data rate
    pub air_rate: AirRate,
    /// Preamble length (nibbles)
    pub preamble_length: u8,
    /// Listen-before-talk enabled
    pub lbt: bool,
    /// Cap on the transmit window (ms)
    pub max_window_ms: u16,
    /// Number of hopping channels
    pub num_channels: u8,
}

impl WindowInputs {
    /// Take the inputs from a link configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAirRate` for a zero air rate.
    pub fn from_config(config: &LinkConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            air_rate: config.air_rate().ok_or(ConfigError::InvalidAirRate)?,
            preamble_length: config.preamble_length,
            lbt: config.lbt_enabled(),
            max_window_ms: config.max_window_ms,
            num_channels: config.num_channels,
        })
    }
}

impl TimingParameters {
    /// Derive the link timing
    ///
    /// Deterministic: the same inputs always give the same parameters.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn calculate(inputs: &WindowInputs) -> Self {
        let ticks_per_byte = (8 + inputs.air_rate.byte_time_us()) / TICK_PERIOD_US + 1;

        let reference_latency = REFERENCE_HEADER_BYTES * ticks_per_byte + PACKET_OVERHEAD_TICKS;
        let preamble_adjust = (i32::from(inputs.preamble_length)
            - i32::from(REFERENCE_PREAMBLE_LENGTH))
            / 2
            * to_i32(ticks_per_byte);
        let packet_latency = clamp_u16(i64::from(reference_latency) + i64::from(preamble_adjust));

        let max_data_packet_length = MAX_PACKET_LENGTH - TRAILER_LEN;
        let silence_period = clamp_u16(2 * i64::from(packet_latency));

        let mut window = PACKETS_PER_WINDOW
            * (u32::from(packet_latency) + max_data_packet_length as u32 * ticks_per_byte);

        let lbt_min_time = if inputs.lbt {
            let min_time = LBT_MIN_TIME_USEC / TICK_PERIOD_US;
            window = window.max(PACKETS_PER_WINDOW * min_time);
            min_time
        } else {
            0
        };

        if window >= REGULATORY_MAX_WINDOW && inputs.num_channels > 1 {
            window = REGULATORY_MAX_WINDOW;
        }

        let user_max = u32::from(inputs.max_window_ms) * 1000 / TICK_PERIOD_US;
        window = window.min(user_max).min(MAX_WINDOW_FIELD);

        Self {
            ticks_per_byte: clamp_u16(i64::from(ticks_per_byte)),
            packet_latency,
            tx_window_width: window as u16,
            silence_period,
            max_data_packet_length: max_data_packet_length as u8,
            lbt_min_time: lbt_min_time as u16,
        }
    }

    /// Derive the link timing from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAirRate` for a zero air rate.
    pub fn from_config(config: &LinkConfig) -> Result<Self, ConfigError> {
        WindowInputs::from_config(config).map(|inputs| Self::calculate(&inputs))
    }

    /// Get ticks per byte
    #[must_use]
    pub const fn ticks_per_byte(&self) -> u16 {
        self.ticks_per_byte
    }

    /// Get the zero-length packet latency
    #[must_use]
    pub const fn packet_latency(&self) -> u16 {
        self.packet_latency
    }

    /// Get the transmit window width
    #[must_use]
    pub const fn tx_window_width(&self) -> u16 {
        self.tx_window_width
    }

    /// Get the silence period
    #[must_use]
    pub const fn silence_period(&self) -> u16 {
        self.silence_period
    }

    /// Get the largest payload length
    #[must_use]
    pub const fn max_data_packet_length(&self) -> u8 {
        self.max_data_packet_length
    }

    /// Get the LBT listen time
    #[must_use]
    pub const fn lbt_min_time(&self) -> u16 {
        self.lbt_min_time
    }

    /// Gap left after each of our frames
    #[must_use]
    pub const fn trailing_gap(&self) -> u16 {
        self.silence_period / 2
    }

    /// Ticks a packet with `payload_len` bytes spends on the air
    #[must_use]
    pub fn flight_time_estimate(&self, payload_len: usize) -> u16 {
        let len = i64::try_from(payload_len).unwrap_or(i64::MAX);
        clamp_u16(
            i64::from(self.packet_latency)
                .saturating_add(len.saturating_mul(i64::from(self.ticks_per_byte))),
        )
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimingParameters {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Timing(tpb={}, latency={}, window={}, silence={})",
            self.ticks_per_byte,
            self.packet_latency,
            self.tx_window_width,
            self.silence_period
        );
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn clamp_u16(value: i64) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(kbps: u8, preamble: u8) -> WindowInputs {
        WindowInputs {
            air_rate: AirRate::from_kbps(kbps).unwrap(),
            preamble_length: preamble,
            lbt: false,
            max_window_ms: 131,
            num_channels: 20,
        }
    }

    #[test]
    fn reference_preamble_has_no_adjustment() {
        let timing = TimingParameters::calculate(&inputs(64, 10));
        assert_eq!(timing.ticks_per_byte(), 9);
        assert_eq!(timing.packet_latency(), 13 * 9 + 13);
    }

    #[test]
    fn flight_time_grows_per_byte() {
        let timing = TimingParameters::calculate(&inputs(64, 10));
        assert_eq!(timing.flight_time_estimate(0), timing.packet_latency());
        assert_eq!(timing.flight_time_estimate(3), timing.packet_latency() + 27);
    }
}
