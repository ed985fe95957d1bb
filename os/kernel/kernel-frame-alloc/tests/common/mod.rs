#![allow(dead_code)]

use kernel_frame_alloc::{FrameAllocator, IdentityPhysMapper, ManagedRange, PhysMapper};
use kernel_memory_addresses::{FRAME_SIZE, PhysicalAddress, PhysicalFrame};
use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::ptr::NonNull;
use std::sync::atomic::AtomicU32;

/// 4 KiB-aligned host memory standing in for physical RAM.
///
/// Frame 0 plays the kernel image: the managed range starts at frame 1.
pub struct TestRam {
    ptr: NonNull<u8>,
    layout: Layout,
    frames: usize,
}

impl TestRam {
    pub fn with_frames(frames: usize) -> Self {
        let layout = Layout::from_size_align(frames * 4096, 4096).unwrap();
        let ptr = NonNull::new(unsafe { alloc_zeroed(layout) }).expect("test RAM allocation");
        Self {
            ptr,
            layout,
            frames,
        }
    }

    pub fn base(&self) -> PhysicalAddress {
        PhysicalAddress::from_ptr(self.ptr.as_ptr())
    }

    /// Pretend the kernel image ends a few bytes into frame 0.
    pub fn kernel_end(&self) -> PhysicalAddress {
        self.base() + 0x10
    }

    pub fn top(&self) -> PhysicalAddress {
        self.base() + self.frames as u64 * FRAME_SIZE
    }

    pub fn frame(&self, index: usize) -> PhysicalFrame {
        (self.base() + index as u64 * FRAME_SIZE).frame()
    }

    pub fn range(&self) -> ManagedRange {
        ManagedRange::new(self.kernel_end(), self.top()).unwrap()
    }

    /// Contents of `frame`; only call while no other thread writes to it.
    pub fn bytes(&self, frame: PhysicalFrame) -> &[u8] {
        let p: *mut u8 = IdentityPhysMapper.phys_to_ptr(frame.base());
        unsafe { std::slice::from_raw_parts(p, 4096) }
    }

    pub fn write(&self, frame: PhysicalFrame, byte: u8) {
        let p: *mut u8 = IdentityPhysMapper.phys_to_ptr(frame.base());
        unsafe { p.write_bytes(byte, 4096) };
    }
}

impl Drop for TestRam {
    fn drop(&mut self) {
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

// Frames are handed to one thread at a time by the allocator under test.
unsafe impl Sync for TestRam {}

pub fn slots(n: usize) -> Vec<AtomicU32> {
    (0..n).map(|_| AtomicU32::new(0)).collect()
}

/// An initialized allocator over all of `ram` except frame 0.
pub fn allocator<'a>(
    ram: &TestRam,
    counts: &'a [AtomicU32],
) -> FrameAllocator<'a, IdentityPhysMapper> {
    let alloc = FrameAllocator::new(ram.range(), counts, IdentityPhysMapper).unwrap();
    unsafe { alloc.init() };
    alloc
}
