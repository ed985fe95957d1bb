//! The span of physical memory handed to the frame allocator.

use crate::error::{FrameError, LayoutError};
use kernel_info::memory::PHYS_MEMORY_TOP;
use kernel_memory_addresses::{FRAME_SIZE, PhysicalAddress, PhysicalFrame};

/// Frame-aligned physical range `[start, end)` managed by the allocator.
///
/// `start` is the first frame at or above the end of the kernel image, `end`
/// the (aligned-down) top of physical memory. Frame indices count from `start`.
///
/// ### Invariants
/// - `start < end`, both 4 KiB aligned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ManagedRange {
    start: PhysicalFrame,
    end: PhysicalAddress,
}

impl ManagedRange {
    /// Range from the end of the kernel image up to `phys_top`.
    ///
    /// # Errors
    /// [`LayoutError::EmptyRange`] if no whole frame fits between the two.
    pub const fn new(
        kernel_end: PhysicalAddress,
        phys_top: PhysicalAddress,
    ) -> Result<Self, LayoutError> {
        let end = phys_top.align_down();
        let Some(start) = kernel_end.align_up() else {
            return Err(LayoutError::EmptyRange {
                start: kernel_end,
                end,
            });
        };
        if start.as_u64() >= end.as_u64() {
            return Err(LayoutError::EmptyRange { start, end });
        }
        Ok(Self {
            start: PhysicalFrame::containing(start),
            end,
        })
    }

    /// Range from the end of the kernel image up to [`PHYS_MEMORY_TOP`].
    ///
    /// # Errors
    /// [`LayoutError::EmptyRange`] if the kernel image reaches the top of RAM.
    pub const fn from_layout(kernel_end: PhysicalAddress) -> Result<Self, LayoutError> {
        Self::new(kernel_end, PhysicalAddress::new(PHYS_MEMORY_TOP))
    }

    #[inline]
    #[must_use]
    pub const fn start(&self) -> PhysicalFrame {
        self.start
    }

    #[inline]
    #[must_use]
    pub const fn end(&self) -> PhysicalAddress {
        self.end
    }

    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn frame_count(&self) -> usize {
        ((self.end.as_u64() - self.start.base().as_u64()) / FRAME_SIZE) as usize
    }

    #[inline]
    #[must_use]
    pub const fn contains(&self, addr: PhysicalAddress) -> bool {
        addr.as_u64() >= self.start.base().as_u64() && addr.as_u64() < self.end.as_u64()
    }

    /// Index of the frame containing `addr`.
    ///
    /// # Errors
    /// [`FrameError::OutOfRange`] if `addr` lies outside `[start, end)`.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn frame_index(&self, addr: PhysicalAddress) -> Result<usize, FrameError> {
        if !self.contains(addr) {
            return Err(self.out_of_range(addr));
        }
        match addr.frames_since(self.start.base()) {
            Some(index) => Ok(index as usize),
            None => Err(self.out_of_range(addr)),
        }
    }

    /// Checks that `addr` is the base of a managed frame.
    ///
    /// # Errors
    /// [`FrameError::Misaligned`] or [`FrameError::OutOfRange`].
    pub const fn validate(&self, addr: PhysicalAddress) -> Result<PhysicalFrame, FrameError> {
        let Some(frame) = PhysicalFrame::from_aligned(addr) else {
            return Err(FrameError::Misaligned(addr));
        };
        if !self.contains(addr) {
            return Err(self.out_of_range(addr));
        }
        Ok(frame)
    }

    /// Every managed frame, lowest address first.
    pub fn frames(&self) -> impl Iterator<Item = PhysicalFrame> + use<> {
        let start = self.start.base();
        let count = self.frame_count() as u64;
        (0..count).map(move |i| PhysicalFrame::containing(start + i * FRAME_SIZE))
    }

    const fn out_of_range(&self, addr: PhysicalAddress) -> FrameError {
        FrameError::OutOfRange {
            addr,
            start: self.start.base(),
            end: self.end,
        }
    }
}
