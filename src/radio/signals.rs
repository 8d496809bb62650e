//! Flags shared between the link loop and its producers
//!
//! The pin hook, the receive path and the preamble interrupt each raise
//! state that the loop later consumes. Every field has one producer and
//! one consumer, and every read-and-clear is a single atomic operation,
//! so a flag raised while the loop is running is never lost and the
//! packet is never seen half-written.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use critical_section::Mutex;

use crate::protocol::PinStatePacket;

/// Producer/consumer state of one link endpoint
pub struct LinkSignals {
    /// Pin state changed; send a burst now
    send_update_now: AtomicBool,
    /// A packet arrived since the last indicator update
    received_packet: AtomicBool,
    /// Ticks to hold off for a preamble to resolve into a packet
    transmit_wait: AtomicU16,
    /// Latest pin state (outgoing on TX, incoming on RX)
    packet: Mutex<Cell<PinStatePacket>>,
}

impl LinkSignals {
    /// Create with all flags clear
    #[must_use]
    pub const fn new() -> Self {
        Self {
            send_update_now: AtomicBool::new(false),
            received_packet: AtomicBool::new(false),
            transmit_wait: AtomicU16::new(0),
            packet: Mutex::new(Cell::new(PinStatePacket::empty())),
        }
    }

    /// Request an urgent burst
    pub fn request_update(&self) {
        self.send_update_now.store(true, Ordering::Release);
    }

    /// Check for a pending urgent burst without clearing it
    #[must_use]
    pub fn update_pending(&self) -> bool {
        self.send_update_now.load(Ordering::Acquire)
    }

    /// Read and clear the urgent burst request
    pub fn take_update(&self) -> bool {
        self.send_update_now.swap(false, Ordering::AcqRel)
    }

    /// Record that a packet arrived
    pub fn mark_received(&self) {
        self.received_packet.store(true, Ordering::Release);
    }

    /// Read and clear the received flag
    pub fn take_received(&self) -> bool {
        self.received_packet.swap(false, Ordering::AcqRel)
    }

    /// A preamble was heard; hold off transmitting for `ticks`
    pub fn note_preamble(&self, ticks: u16) {
        self.transmit_wait.store(ticks, Ordering::Release);
    }

    /// Ticks still to wait for a preamble
    #[must_use]
    pub fn transmit_wait(&self) -> u16 {
        self.transmit_wait.load(Ordering::Acquire)
    }

    /// Stop waiting for a preamble
    pub fn clear_transmit_wait(&self) {
        self.transmit_wait.store(0, Ordering::Release);
    }

    /// Copy of the current packet
    #[must_use]
    pub fn packet(&self) -> PinStatePacket {
        critical_section::with(|cs| self.packet.borrow(cs).get())
    }

    /// Replace the current packet
    pub fn set_packet(&self, packet: PinStatePacket) {
        critical_section::with(|cs| self.packet.borrow(cs).set(packet));
    }

    /// Replace the packet, returning the one it replaced
    pub fn swap_packet(&self, packet: PinStatePacket) -> PinStatePacket {
        critical_section::with(|cs| self.packet.borrow(cs).replace(packet))
    }
}

impl Default for LinkSignals {
    fn default() -> Self {
        Self::new()
    }
}
