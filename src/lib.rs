//! Pin-State TDM Link Firmware Library
//!
//! This library provides the core functionality for a half-duplex packet
//! radio link that mirrors up to four digital pins from a transmitting
//! endpoint to a receiving endpoint. Airtime use is governed by a
//! regulatory duty-cycle budget that is derated when the power amplifier
//! runs hot.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  Link Scheduler  │  Activity Indicator  │  Integrity Monitor │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     CONTROL LAYER                            │
//! │  Window Calculator  │  Thermal Governor  │  Pin Monitor      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / DRIVER LAYER                         │
//! │  Tick Clock  │  GPIO  │  UART Transceiver  │  PA Thermistor  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                          │
//! │           embassy-rs (async/await executor)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Single owner**: all loop state lives in one `LinkScheduler`
//! - **Wraparound-safe time**: 16-bit ticks only ever compared by elapsed count
//! - **Fail-safe**: a corrupted canary stops the link instead of driving hardware
//! - **No unsafe in application code**: all unsafe isolated in HAL/FFI layers
//! - **Functional core, imperative shell**: pure logic separated from I/O

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

#[macro_use]
mod macros;

/// Hardware Abstraction Layer
///
/// Tick clock and GPIO adapters over STM32G474 peripherals.
#[cfg(feature = "embedded")]
pub mod hal;

/// Peripheral Drivers
///
/// The UART-attached transceiver and its PA thermistor.
#[cfg(feature = "embedded")]
pub mod drivers;

/// Radio Link Control
///
/// Timing derivation, the TDM scheduling loop and its safety checks.
pub mod radio;

/// Power Management
///
/// Duty-cycle accounting and thermal derating.
pub mod power;

/// User Pins
///
/// Pin-state sampling on the transmitter and mirroring on the receiver.
pub mod pins;

/// Wire Protocol
///
/// The pin-state packet codec.
pub mod protocol;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    pub use crate::radio::link::{CommandConsole, PinHook, RadioLink, StatusLeds, TimeBase};
    pub use crate::radio::scheduler::LinkScheduler;

    // Common traits
    pub use embedded_hal::digital::OutputPin;

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
