//! Peripheral Drivers
//!
//! High-level drivers for the modem and its sensors.

pub mod uart_radio;
