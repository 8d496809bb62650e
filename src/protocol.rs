//! Wire Protocol
//!
//! The pin-state packet exchanged between the two ends of the link.
//!
//! # Frame layout
//!
//! ```text
//! ┌───────────┬───────────┬────────┐
//! │ pin_count │ pin_state │ footer │
//! │   1 byte  │   1 byte  │  0xA5  │
//! └───────────┴───────────┴────────┘
//! ```
//!
//! There is no checksum at this layer; the transceiver's own CRC covers
//! the frame. The footer only guards against frames from other firmware.

use core::fmt;

use crate::config::PIN_SEND_MAX;

/// Constant last byte of every pin-state frame
pub const FOOTER_CHECK: u8 = 0xA5;

/// Packet decoding error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketError {
    /// Frame length differs from `PinStatePacket::SIZE`
    Length {
        /// Required frame length
        expected: usize,
        /// Received frame length
        found: usize,
    },
    /// Footer byte is not `FOOTER_CHECK`
    Footer {
        /// Received footer byte
        found: u8,
    },
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { expected, found } => {
                write!(f, "frame length {found}, expected {expected}")
            }
            Self::Footer { found } => write!(f, "bad footer {found:#04x}"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PacketError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Length { expected, found } => {
                defmt::write!(f, "frame length {}, expected {}", found, expected);
            }
            Self::Footer { found } => defmt::write!(f, "bad footer {=u8:#x}", *found),
        }
    }
}

/// Pin states of up to four pins
#[derive(Clone, Copy, Debug)]
pub struct PinStatePacket {
    /// Number of pins described
    pin_count: u8,
    /// Bit `n` is the level of pin `n`
    pin_state: u8,
    /// Sentinel footer
    footer: u8,
}

impl PinStatePacket {
    /// Encoded size in bytes
    pub const SIZE: usize = 3;

    /// Create a packet with a valid footer
    ///
    /// The pin count is limited to `PIN_SEND_MAX` and bits above it are cleared.
    #[must_use]
    pub const fn new(pin_count: u8, pin_state: u8) -> Self {
        let pin_count = if pin_count > PIN_SEND_MAX {
            PIN_SEND_MAX
        } else {
            pin_count
        };
        Self {
            pin_count,
            pin_state: pin_state & Self::mask_for(pin_count),
            footer: FOOTER_CHECK,
        }
    }

    /// Packet describing no pins, used before initialisation
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(0, 0)
    }

    /// Bits that are meaningful for `pin_count` pins
    #[allow(clippy::cast_possible_truncation)]
    const fn mask_for(pin_count: u8) -> u8 {
        if pin_count >= 8 {
            u8::MAX
        } else {
            ((1u16 << pin_count) - 1) as u8
        }
    }

    /// Get the number of pins described
    #[must_use]
    pub const fn pin_count(&self) -> u8 {
        self.pin_count
    }

    /// Get the pin-state bitmask
    #[must_use]
    pub const fn pin_state(&self) -> u8 {
        self.pin_state
    }

    /// Get the footer byte
    #[must_use]
    pub const fn footer(&self) -> u8 {
        self.footer
    }

    /// Check the footer sentinel
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.footer == FOOTER_CHECK
    }

    /// Level of one pin
    #[must_use]
    pub const fn pin(&self, index: u8) -> bool {
        index < self.pin_count && index < 8 && self.pin_state & (1 << index) != 0
    }

    /// Replace the bitmask (returns new packet)
    #[must_use]
    pub const fn with_pin_state(self, pin_state: u8) -> Self {
        Self {
            pin_state: pin_state & Self::mask_for(self.pin_count),
            ..self
        }
    }

    /// Check whether two packets describe the same pin levels
    ///
    /// Only the bitmask matters; the count and footer are framing.
    #[must_use]
    pub const fn same_state(&self, other: &Self) -> bool {
        self.pin_state == other.pin_state
    }

    /// Serialize into the wire layout
    #[must_use]
    pub const fn encode(&self) -> [u8; Self::SIZE] {
        [self.pin_count, self.pin_state, self.footer]
    }

    /// Write the wire layout into the front of `buf`, returning the length
    ///
    /// # Errors
    ///
    /// Returns `PacketError::Length` if `buf` is shorter than `SIZE`.
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<usize, PacketError> {
        let found = buf.len();
        let dst = buf.get_mut(..Self::SIZE).ok_or(PacketError::Length {
            expected: Self::SIZE,
            found,
        })?;
        dst.copy_from_slice(&self.encode());
        Ok(Self::SIZE)
    }

    /// Parse a received frame
    ///
    /// The frame must be exactly `SIZE` bytes. The fields are taken verbatim;
    /// a pin count above `PIN_SEND_MAX` is accepted and limited where pins
    /// are driven.
    ///
    /// # Errors
    ///
    /// Returns `PacketError::Length` for any other frame length and
    /// `PacketError::Footer` when the sentinel is wrong.
    pub fn decode(frame: &[u8]) -> Result<Self, PacketError> {
        let &[pin_count, pin_state, footer] = frame else {
            return Err(PacketError::Length {
                expected: Self::SIZE,
                found: frame.len(),
            });
        };
        if footer != FOOTER_CHECK {
            return Err(PacketError::Footer { found: footer });
        }
        Ok(Self {
            pin_count,
            pin_state,
            footer,
        })
    }
}

impl Default for PinStatePacket {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for PinStatePacket {
    fn eq(&self, other: &Self) -> bool {
        self.same_state(other)
    }
}

impl Eq for PinStatePacket {}

#[cfg(feature = "embedded")]
impl defmt::Format for PinStatePacket {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Pins({}: {=u8:#b})", self.pin_count, self.pin_state);
    }
}
