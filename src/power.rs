//! Power Management
//!
//! Duty-cycle accounting and thermal derating of the transmit budget.
//!
//! The governor is a deliberately asymmetric controller: an overheating
//! power amplifier pulls the allowed duty cycle down quickly, while a cool
//! one gives it back one percent per run. No amount of derating takes the
//! budget below `MIN_DUTY_CYCLE`, so the link always stays up.

use fixed::types::U32F32;

use crate::config::{LOW_POWER_THRESHOLD_DBM, MAX_DUTY_CYCLE, MAX_PA_TEMPERATURE, MIN_DUTY_CYCLE};

/// Temperature reading
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Temperature {
    /// Whole degrees Celsius
    celsius: i16,
}

impl Temperature {
    /// Create from Celsius
    #[must_use]
    pub const fn from_celsius(celsius: i16) -> Self {
        Self { celsius }
    }

    /// Get temperature in Celsius
    #[must_use]
    pub const fn celsius(&self) -> i16 {
        self.celsius
    }

    /// Degrees above `limit_celsius` (negative when below)
    #[must_use]
    pub const fn excess_over(&self, limit_celsius: i16) -> i16 {
        self.celsius.saturating_sub(limit_celsius)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Temperature {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}°C", self.celsius);
    }
}

/// Duty-cycle budget and usage
#[derive(Clone, Copy, Debug)]
pub struct DutyCycleState {
    /// Long-term duty cycle target (%)
    duty_cycle: u8,
    /// Reduction applied for temperature (%)
    duty_cycle_offset: u8,
    /// Moving average of measured duty cycle (%)
    average_duty_cycle: U32F32,
    /// Ticks spent transmitting in the current window
    transmitted_ticks: u32,
}

impl DutyCycleState {
    /// Create with a duty cycle target, limited to `MIN_DUTY_CYCLE..=MAX_DUTY_CYCLE`
    #[must_use]
    pub const fn new(duty_cycle: u8) -> Self {
        let duty_cycle = if duty_cycle < MIN_DUTY_CYCLE {
            MIN_DUTY_CYCLE
        } else if duty_cycle > MAX_DUTY_CYCLE {
            MAX_DUTY_CYCLE
        } else {
            duty_cycle
        };
        Self {
            duty_cycle,
            duty_cycle_offset: 0,
            average_duty_cycle: U32F32::ZERO,
            transmitted_ticks: 0,
        }
    }

    /// Get the duty cycle target
    #[must_use]
    pub const fn duty_cycle(&self) -> u8 {
        self.duty_cycle
    }

    /// Get the thermal offset
    #[must_use]
    pub const fn offset(&self) -> u8 {
        self.duty_cycle_offset
    }

    /// Duty cycle currently allowed
    #[must_use]
    pub const fn budget(&self) -> u8 {
        self.duty_cycle - self.duty_cycle_offset
    }

    /// Get the averaged measured duty cycle
    #[must_use]
    pub const fn average(&self) -> U32F32 {
        self.average_duty_cycle
    }

    /// Get the averaged measured duty cycle in whole percent
    #[must_use]
    pub fn average_percent(&self) -> u8 {
        self.average_duty_cycle.saturating_to_num::<u8>()
    }

    /// Get ticks transmitted in the current window
    #[must_use]
    pub const fn transmitted_ticks(&self) -> u32 {
        self.transmitted_ticks
    }

    /// Check if the measured duty cycle has reached the budget
    #[must_use]
    pub fn over_budget(&self) -> bool {
        self.average_duty_cycle >= U32F32::from_num(self.budget())
    }

    /// Account for one transmission
    pub fn record_transmit(&mut self, flight_ticks: u16) {
        self.transmitted_ticks = self.transmitted_ticks.saturating_add(u32::from(flight_ticks));
    }

    /// Fold the current window into the average and start a new window
    pub fn close_window(&mut self, window_ticks: u16) {
        if window_ticks == 0 {
            return;
        }
        let sample = (U32F32::from_num(self.transmitted_ticks) / U32F32::from_num(window_ticks))
            .saturating_mul_int(100);
        self.average_duty_cycle = (self.average_duty_cycle * U32F32::from_num(0.95))
            .saturating_add(sample * U32F32::from_num(0.05));
        self.transmitted_ticks = 0;
    }

    /// Set the thermal offset, keeping at least `MIN_DUTY_CYCLE` available
    fn set_offset(&mut self, offset: u8) {
        self.duty_cycle_offset = offset.min(self.duty_cycle - MIN_DUTY_CYCLE);
    }
}

impl Default for DutyCycleState {
    fn default() -> Self {
        Self::new(MAX_DUTY_CYCLE)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DutyCycleState {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Duty({}% - {}%, avg={}%)",
            self.duty_cycle,
            self.duty_cycle_offset,
            self.average_percent()
        );
    }
}

/// Closed-loop thermal derating of the duty-cycle budget
#[derive(Clone, Copy, Debug)]
pub struct ThermalGovernor {
    /// PA temperature above which derating starts
    max_temperature: i16,
    /// Transmit power at or below which derating is skipped
    low_power_threshold: u8,
}

impl ThermalGovernor {
    /// Create a governor with the board limits
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_temperature: MAX_PA_TEMPERATURE,
            low_power_threshold: LOW_POWER_THRESHOLD_DBM,
        }
    }

    /// Create a governor with explicit limits
    #[must_use]
    pub const fn with_limits(max_temperature: i16, low_power_threshold: u8) -> Self {
        Self {
            max_temperature,
            low_power_threshold,
        }
    }

    /// Run one control step, returning the new offset
    pub fn update(&self, duty: &mut DutyCycleState, pa_temp: Temperature, tx_power_dbm: u8) -> u8 {
        if tx_power_dbm <= self.low_power_threshold {
            duty.set_offset(0);
            return 0;
        }

        let before = duty.offset();
        let diff = pa_temp.excess_over(self.max_temperature);
        let offset = if diff <= 0 {
            // under temperature
            before.saturating_sub(1)
        } else if diff > 10 {
            before.saturating_add(10)
        } else if diff > 5 {
            before.saturating_add(5)
        } else {
            before.saturating_add(1)
        };
        duty.set_offset(offset);

        if duty.offset() > before {
            link_warn!(
                "PA at {}C, duty cycle derated to {}%",
                pa_temp.celsius(),
                duty.budget()
            );
        }
        duty.offset()
    }
}

impl Default for ThermalGovernor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_never_eats_minimum_budget() {
        let governor = ThermalGovernor::new();
        let mut duty = DutyCycleState::new(25);
        governor.update(&mut duty, Temperature::from_celsius(150), 30);
        assert_eq!(duty.offset(), 5);
        assert_eq!(duty.budget(), MIN_DUTY_CYCLE);
    }

    #[test]
    fn duty_cycle_target_is_limited() {
        assert_eq!(DutyCycleState::new(5).duty_cycle(), MIN_DUTY_CYCLE);
        assert_eq!(DutyCycleState::new(250).duty_cycle(), MAX_DUTY_CYCLE);
    }
}
