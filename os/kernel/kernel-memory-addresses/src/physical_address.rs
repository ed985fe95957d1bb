use crate::{FRAME_OFFSET_MASK, FRAME_SHIFT, PhysicalFrame};
use core::fmt;
use core::ops::Add;

/// Physical memory address.
///
/// A thin wrapper around `u64` that denotes a **physical** address (host RAM
/// or MMIO). It carries no alignment guarantee; use [`PhysicalAddress::frame`]
/// to obtain the [`PhysicalFrame`] that contains it.
///
/// ### Examples
/// ```rust
/// # use kernel_memory_addresses::*;
/// let pa = PhysicalAddress::new(0x0000_0010_2000_0042);
/// assert_eq!(pa.frame().base().as_u64(), 0x0000_0010_2000_0000);
/// assert_eq!(pa.frame_offset(), 0x42);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalAddress(u64);

impl PhysicalAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    /// Address of a pointer in an identity-mapped address space.
    #[inline]
    #[must_use]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr.expose_provenance() as u64)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Whether the low 12 bits are clear.
    #[inline]
    #[must_use]
    pub const fn is_frame_aligned(self) -> bool {
        self.0 & FRAME_OFFSET_MASK == 0
    }

    /// Align down to the start of the containing frame.
    #[inline]
    #[must_use]
    pub const fn align_down(self) -> Self {
        Self(self.0 & !FRAME_OFFSET_MASK)
    }

    /// Align up to the next frame boundary, or `None` if that would overflow.
    #[inline]
    #[must_use]
    pub const fn align_up(self) -> Option<Self> {
        match self.0.checked_add(FRAME_OFFSET_MASK) {
            Some(v) => Some(Self(v & !FRAME_OFFSET_MASK)),
            None => None,
        }
    }

    /// The frame that contains this address.
    #[inline]
    #[must_use]
    pub const fn frame(self) -> PhysicalFrame {
        PhysicalFrame::containing(self)
    }

    /// Byte offset of this address within its frame (`0..FRAME_SIZE`).
    #[inline]
    #[must_use]
    pub const fn frame_offset(self) -> u64 {
        self.0 & FRAME_OFFSET_MASK
    }

    /// Number of whole frames between `start` and `self`, if `self >= start`.
    #[inline]
    #[must_use]
    pub const fn frames_since(self, start: Self) -> Option<u64> {
        match self.0.checked_sub(start.0) {
            Some(bytes) => Some(bytes >> FRAME_SHIFT),
            None => None,
        }
    }
}

impl fmt::Debug for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:016X})", self.0)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl Add<u64> for PhysicalAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}
