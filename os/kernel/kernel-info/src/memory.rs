//! # Memory Layout

use kernel_memory_addresses::FRAME_SIZE;

/// A simple Higher Half Direct Map (HHDM) base.
/// Anything mapped at [`HHDM_BASE`] + `pa` lets the kernel
/// access physical memory via a fixed offset.
pub const HHDM_BASE: u64 = 0xffff_8880_0000_0000;

/// Where the kernel image is placed in *physical* memory (LMA).
///
/// This is also the bottom of the RAM window handed to the frame allocator;
/// the allocator starts at the first frame past the end of the image.
pub const PHYS_LOAD: u64 = 0x0010_0000; // 1 MiB

/// Bottom of the physical RAM window.
pub const PHYS_MEMORY_BASE: u64 = PHYS_LOAD;

/// Size of the physical RAM window.
pub const PHYS_MEMORY_SIZE: u64 = 128 * 1024 * 1024;

/// First physical address past usable RAM.
pub const PHYS_MEMORY_TOP: u64 = PHYS_MEMORY_BASE + PHYS_MEMORY_SIZE;

/// Upper bound on the number of frames the allocator can manage.
///
/// Sizes the reference count table; the managed range never exceeds the RAM window.
#[allow(clippy::cast_possible_truncation)]
pub const MAX_PHYS_FRAMES: usize = (PHYS_MEMORY_SIZE / FRAME_SIZE) as usize;

/// Byte pattern written over a frame when it is handed out.
pub const ALLOC_JUNK_BYTE: u8 = 0x05;

/// Byte pattern written over a frame when it returns to the free list.
pub const FREE_JUNK_BYTE: u8 = 0x01;

const _: () = {
    assert!(PHYS_MEMORY_BASE.is_multiple_of(FRAME_SIZE));
    assert!(PHYS_MEMORY_TOP.is_multiple_of(FRAME_SIZE));
    assert!(PHYS_MEMORY_TOP > PHYS_MEMORY_BASE);
    assert!(PHYS_MEMORY_TOP < HHDM_BASE);
    assert!(ALLOC_JUNK_BYTE != FREE_JUNK_BYTE);
};
