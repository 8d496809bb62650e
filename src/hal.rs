//! Hardware Abstraction Layer
//!
//! Safe adapters from STM32G474 peripherals to the link traits.

pub mod gpio;
pub mod timer;
