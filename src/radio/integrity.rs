//! Integrity Monitor
//!
//! Two sentinel bytes guard the link loop. On target, the linker places the
//! stack sentinel as the last static below the stack limit, where a stack
//! overflow lands first, and the data sentinel alone at the bottom of RAM
//! (see `canary.x`). Both are armed once before the loop starts and checked
//! at the top of every iteration. A changed sentinel means memory can no
//! longer be trusted, and the loop stops for good.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::config::{DATA_CANARY_VALUE, STACK_CANARY_VALUE};

/// One sentinel memory cell
///
/// Reads go through an atomic so they are never cached or elided.
pub struct Sentinel {
    value: AtomicU8,
}

impl Sentinel {
    /// Create an unarmed sentinel
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: AtomicU8::new(0),
        }
    }

    /// Current content
    #[must_use]
    pub fn read(&self) -> u8 {
        self.value.load(Ordering::SeqCst)
    }

    /// Overwrite the content
    pub fn write(&self, value: u8) {
        self.value.store(value, Ordering::SeqCst);
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::new()
    }
}

/// Fatal memory corruption
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegrityFault {
    /// The sentinel next to the stack changed
    StackCanary {
        /// Value found in the cell
        found: u8,
    },
    /// The sentinel among the statics changed
    DataCanary {
        /// Value found in the cell
        found: u8,
    },
}

impl fmt::Display for IntegrityFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackCanary { found } => write!(f, "stack blown (canary {found:#04x})"),
            Self::DataCanary { found } => write!(f, "data canary changed ({found:#04x})"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for IntegrityFault {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::StackCanary { found } => defmt::write!(f, "stack blown (canary {=u8:#x})", *found),
            Self::DataCanary { found } => defmt::write!(f, "data canary changed ({=u8:#x})", *found),
        }
    }
}

/// Watches the two sentinels
pub struct IntegrityMonitor<'s> {
    stack: &'s Sentinel,
    data: &'s Sentinel,
}

impl<'s> IntegrityMonitor<'s> {
    /// Arm both sentinels and start watching them
    #[must_use]
    pub fn new(stack: &'s Sentinel, data: &'s Sentinel) -> Self {
        stack.write(STACK_CANARY_VALUE);
        data.write(DATA_CANARY_VALUE);
        Self { stack, data }
    }

    /// Verify both sentinels
    ///
    /// # Errors
    ///
    /// Returns the first sentinel found changed.
    pub fn check(&self) -> Result<(), IntegrityFault> {
        let found = self.stack.read();
        if found != STACK_CANARY_VALUE {
            return Err(IntegrityFault::StackCanary { found });
        }
        let found = self.data.read();
        if found != DATA_CANARY_VALUE {
            return Err(IntegrityFault::DataCanary { found });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armed_sentinels_pass() {
        let stack = Sentinel::new();
        let data = Sentinel::new();
        let monitor = IntegrityMonitor::new(&stack, &data);
        assert_eq!(monitor.check(), Ok(()));
    }

    #[test]
    fn stack_checked_before_data() {
        let stack = Sentinel::new();
        let data = Sentinel::new();
        let monitor = IntegrityMonitor::new(&stack, &data);
        stack.write(0);
        data.write(0);
        assert_eq!(monitor.check(), Err(IntegrityFault::StackCanary { found: 0 }));
    }
}
