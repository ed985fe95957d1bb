use crate::{FRAME_OFFSET_MASK, FRAME_SIZE, PhysicalAddress};
use core::fmt;

/// Base address of a 4 KiB physical frame.
///
/// ### Invariants
/// - The low 12 bits of the base are always zero.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let frame = PhysicalFrame::containing(PhysicalAddress::new(0x8000_2345));
/// assert_eq!(frame.base(), PhysicalAddress::new(0x8000_2000));
/// assert_eq!(frame.next().unwrap().base(), PhysicalAddress::new(0x8000_3000));
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalFrame(PhysicalAddress);

impl PhysicalFrame {
    /// Frame that contains `addr` (aligns down).
    #[inline]
    #[must_use]
    pub const fn containing(addr: PhysicalAddress) -> Self {
        Self(PhysicalAddress::new(addr.as_u64() & !FRAME_OFFSET_MASK))
    }

    /// Frame starting exactly at `addr`, or `None` if `addr` is unaligned.
    #[inline]
    #[must_use]
    pub const fn from_aligned(addr: PhysicalAddress) -> Option<Self> {
        if addr.is_frame_aligned() {
            Some(Self(addr))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        self.0
    }

    /// The frame directly above this one, or `None` at the top of the address space.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.as_u64().checked_add(FRAME_SIZE) {
            Some(pa) => Some(Self(PhysicalAddress::new(pa))),
            None => None,
        }
    }

    /// Number of frames between `start` and this frame, if `self >= start`.
    #[inline]
    #[must_use]
    pub const fn frames_since(self, start: Self) -> Option<u64> {
        self.0.frames_since(start.0)
    }
}

impl fmt::Display for PhysicalFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}/4K", self.0.as_u64())
    }
}

impl fmt::Debug for PhysicalFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalFrame(0x{:016X})", self.0.as_u64())
    }
}
