//! Intrusive stack of free frames, linked through the frames themselves.

use crate::phys_mapper::PhysMapper;
use kernel_memory_addresses::PhysicalFrame;

/// Header stored at the beginning of every **free** frame.
///
/// ```text
/// +-----------------------+----------------------------------+
/// | FreeFrame (link)      |  free-marker bytes               |
/// +-----------------------+----------------------------------+
/// ^ frame base                                frame base + 4 KiB
/// ```
///
/// The link is a physical address, so the list does not depend on how
/// physical memory happens to be mapped.
#[repr(C)]
struct FreeFrame {
    next: Option<PhysicalFrame>,
}

/// Intrusive LIFO stack of free frames.
///
/// # Invariants
/// - Every frame on the stack lies in the managed range and has a reference
///   count of zero.
/// - `len` equals the number of frames reachable from `head`.
/// - Only accessed under the allocator's spin lock.
pub(crate) struct FreeList {
    head: Option<PhysicalFrame>,
    len: usize,
}

impl FreeList {
    pub(crate) const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Link `frame` in as the new head.
    ///
    /// # Safety
    /// - `frame` must be mapped writable by `mapper` and owned by nobody.
    /// - `frame` must not already be on the list.
    pub(crate) unsafe fn push<M: PhysMapper>(&mut self, mapper: &M, frame: PhysicalFrame) {
        let node = mapper.phys_to_ptr::<FreeFrame>(frame.base());
        unsafe {
            node.write(FreeFrame { next: self.head });
        }
        self.head = Some(frame);
        self.len += 1;
    }

    /// Unlink and return the head frame, if any.
    ///
    /// # Safety
    /// - Every frame on the list must still be mapped by `mapper` and
    ///   untouched since it was pushed.
    pub(crate) unsafe fn pop<M: PhysMapper>(&mut self, mapper: &M) -> Option<PhysicalFrame> {
        let frame = self.head?;
        let node = mapper.phys_to_ptr::<FreeFrame>(frame.base());
        self.head = unsafe { node.read().next };
        self.len -= 1;
        Some(frame)
    }
}
