//! Radio Link Control
//!
//! Time-division scheduling of a half-duplex pin-state link.
//! Implements the functional core of the link firmware.

pub mod indicator;
pub mod integrity;
pub mod link;
pub mod scheduler;
pub mod signals;
pub mod timing;
