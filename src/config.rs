//! System configuration and link constants
//!
//! This module defines compile-time constants for the link firmware and the
//! runtime [`LinkConfig`] loaded before the scheduler starts. Timer units,
//! intervals and thermal limits are centralized here.

use core::fmt;

use crate::types::{AirRate, Role};

/// Link timer period in microseconds
pub const TICK_PERIOD_US: u32 = 16;

/// Ticks between activity indicator updates (half the timer wrap, ~0.524 s)
pub const LINK_UPDATE_INTERVAL_TICKS: u16 = 32_768;

/// Ticks between periodic restatements of the pin state
pub const SEND_INTERVAL_TICKS: u16 = 32_768;

/// Copies sent back-to-back when the pin state changes
pub const BURST_COPIES: u8 = 5;

/// Indicator updates per thermal governor run (~2 s)
pub const GOVERNOR_DIVIDER: u8 = 4;

/// Power amplifier temperature above which the duty cycle is derated (°C)
pub const MAX_PA_TEMPERATURE: i16 = 100;

/// Transmit power at or below which no derating is needed (dBm)
pub const LOW_POWER_THRESHOLD_DBM: u8 = 20;

/// Duty cycle that stays available under maximum derating (%)
pub const MIN_DUTY_CYCLE: u8 = 20;

/// Largest configurable duty cycle (%)
pub const MAX_DUTY_CYCLE: u8 = 100;

/// Value armed into the stack canary
pub const STACK_CANARY_VALUE: u8 = 42;

/// Value armed into the data canary
pub const DATA_CANARY_VALUE: u8 = 0x41;

/// Largest frame the transceiver accepts
pub const MAX_PACKET_LENGTH: usize = 252;

/// Bytes reserved for the link trailer in a full frame
pub const TRAILER_LEN: usize = 2;

/// Preamble length the round timing is computed against (nibbles, 40 bits)
pub const REFERENCE_PREAMBLE_LENGTH: u8 = 10;

/// Shortest accepted preamble length (nibbles)
pub const MIN_PREAMBLE_LENGTH: u8 = 6;

/// Longest accepted preamble length (nibbles)
pub const MAX_PREAMBLE_LENGTH: u8 = 64;

/// Minimum listen time before talking when LBT is enabled (µs)
pub const LBT_MIN_TIME_USEC: u32 = 5_000;

/// Longest transmit window allowed when frequency hopping (0.4 s in ticks)
pub const REGULATORY_MAX_WINDOW: u32 = ((1_000_000 / TICK_PERIOD_US) * 4) / 10;

/// Window widths must fit the 13-bit trailer field
pub const MAX_WINDOW_FIELD: u32 = 0x1fff;

/// Pin states carried in one packet
pub const PIN_SEND_MAX: u8 = 4;

/// User pin that selects command console mode when read high
pub const CONSOLE_MODE_PIN: u8 = 4;

/// User pin held low as a reference ground for the console mode pin
pub const CONSOLE_GROUND_PIN: u8 = 5;

/// Default preamble length (nibbles)
pub const DEFAULT_PREAMBLE_LENGTH: u8 = REFERENCE_PREAMBLE_LENGTH;

/// Default air data rate (kbit/s)
pub const DEFAULT_AIR_RATE_KBPS: u8 = 64;

/// Default long-term duty cycle target (%)
pub const DEFAULT_DUTY_CYCLE: u8 = 100;

/// Default transmit power (dBm)
pub const DEFAULT_TX_POWER_DBM: u8 = 20;

/// Default cap on the transmit window (ms)
pub const DEFAULT_MAX_WINDOW_MS: u16 = 131;

/// Default number of hopping channels
pub const DEFAULT_NUM_CHANNELS: u8 = 20;

/// Link UART baud rate to the transceiver module
pub const RADIO_UART_BAUD: u32 = 115_200;

/// Role selected at build time
pub const ROLE: Role = if cfg!(feature = "transmit-only") {
    Role::Transmit
} else {
    Role::Receive
};

/// Configuration error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Duty cycle outside `MIN_DUTY_CYCLE..=MAX_DUTY_CYCLE`
    DutyCycleOutOfRange(u8),
    /// Preamble length outside `MIN_PREAMBLE_LENGTH..=MAX_PREAMBLE_LENGTH`
    PreambleOutOfRange(u8),
    /// Air rate of zero
    InvalidAirRate,
    /// Max window of zero milliseconds
    MaxWindowZero,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DutyCycleOutOfRange(v) => write!(
                f,
                "duty cycle {v}% outside {MIN_DUTY_CYCLE}..={MAX_DUTY_CYCLE}%"
            ),
            Self::PreambleOutOfRange(v) => write!(
                f,
                "preamble length {v} outside {MIN_PREAMBLE_LENGTH}..={MAX_PREAMBLE_LENGTH}"
            ),
            Self::InvalidAirRate => write!(f, "air rate must be non-zero"),
            Self::MaxWindowZero => write!(f, "max window must be non-zero"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::DutyCycleOutOfRange(v) => defmt::write!(f, "duty cycle {}% out of range", v),
            Self::PreambleOutOfRange(v) => defmt::write!(f, "preamble {} out of range", v),
            Self::InvalidAirRate => defmt::write!(f, "air rate must be non-zero"),
            Self::MaxWindowZero => defmt::write!(f, "max window must be non-zero"),
        }
    }
}

/// Runtime link settings, fixed before the scheduler starts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    /// Which end of the link this is
    pub role: Role,
    /// Air data rate (kbit/s)
    pub air_rate_kbps: u8,
    /// Preamble length (nibbles)
    pub preamble_length: u8,
    /// Long-term duty cycle target (%)
    pub duty_cycle: u8,
    /// Listen-before-talk RSSI threshold, 0 disables LBT
    pub lbt_rssi: u8,
    /// Transmit power (dBm)
    pub tx_power_dbm: u8,
    /// Cap on the transmit window (ms)
    pub max_window_ms: u16,
    /// Number of hopping channels
    pub num_channels: u8,
}

impl LinkConfig {
    /// Build-time defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            role: ROLE,
            air_rate_kbps: DEFAULT_AIR_RATE_KBPS,
            preamble_length: DEFAULT_PREAMBLE_LENGTH,
            duty_cycle: DEFAULT_DUTY_CYCLE,
            lbt_rssi: 0,
            tx_power_dbm: DEFAULT_TX_POWER_DBM,
            max_window_ms: DEFAULT_MAX_WINDOW_MS,
            num_channels: DEFAULT_NUM_CHANNELS,
        }
    }

    /// Set role (returns new config)
    #[must_use]
    pub const fn with_role(self, role: Role) -> Self {
        Self { role, ..self }
    }

    /// Set air rate (returns new config)
    #[must_use]
    pub const fn with_air_rate(self, air_rate_kbps: u8) -> Self {
        Self {
            air_rate_kbps,
            ..self
        }
    }

    /// Set preamble length (returns new config)
    #[must_use]
    pub const fn with_preamble_length(self, preamble_length: u8) -> Self {
        Self {
            preamble_length,
            ..self
        }
    }

    /// Set duty cycle target (returns new config)
    #[must_use]
    pub const fn with_duty_cycle(self, duty_cycle: u8) -> Self {
        Self { duty_cycle, ..self }
    }

    /// Set LBT threshold (returns new config)
    #[must_use]
    pub const fn with_lbt_rssi(self, lbt_rssi: u8) -> Self {
        Self { lbt_rssi, ..self }
    }

    /// Set transmit power (returns new config)
    #[must_use]
    pub const fn with_tx_power(self, tx_power_dbm: u8) -> Self {
        Self {
            tx_power_dbm,
            ..self
        }
    }

    /// Set transmit window cap (returns new config)
    #[must_use]
    pub const fn with_max_window_ms(self, max_window_ms: u16) -> Self {
        Self {
            max_window_ms,
            ..self
        }
    }

    /// Set hopping channel count (returns new config)
    #[must_use]
    pub const fn with_num_channels(self, num_channels: u8) -> Self {
        Self {
            num_channels,
            ..self
        }
    }

    /// Air rate as a validated type
    #[must_use]
    pub const fn air_rate(&self) -> Option<AirRate> {
        AirRate::from_kbps(self.air_rate_kbps)
    }

    /// Check if listen-before-talk is enabled
    #[must_use]
    pub const fn lbt_enabled(&self) -> bool {
        self.lbt_rssi != 0
    }

    /// Check all settings are usable
    ///
    /// # Errors
    ///
    /// Returns the first setting found out of range.
    pub const fn validate(self) -> Result<Self, ConfigError> {
        if self.duty_cycle < MIN_DUTY_CYCLE || self.duty_cycle > MAX_DUTY_CYCLE {
            return Err(ConfigError::DutyCycleOutOfRange(self.duty_cycle));
        }
        if self.preamble_length < MIN_PREAMBLE_LENGTH
            || self.preamble_length > MAX_PREAMBLE_LENGTH
        {
            return Err(ConfigError::PreambleOutOfRange(self.preamble_length));
        }
        if self.air_rate_kbps == 0 {
            return Err(ConfigError::InvalidAirRate);
        }
        if self.max_window_ms == 0 {
            return Err(ConfigError::MaxWindowZero);
        }
        Ok(self)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LinkConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Link({}, {}kbps, preamble={}, duty={}%, {}dBm)",
            self.role,
            self.air_rate_kbps,
            self.preamble_length,
            self.duty_cycle,
            self.tx_power_dbm
        );
    }
}
