//! # Physical Frame Allocation
//!
//! This crate hands out and reclaims 4 KiB physical frames for user memory,
//! kernel stacks, page-table pages and pipe buffers. Every frame carries a
//! reference count, so address spaces can share a frame copy-on-write: the
//! frame only goes back to the pool when its last owner releases it.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 FrameAllocator                      │
//! │    • allocate / free / share / ref_count            │
//! │    • debug marker fills on hand-out and release     │
//! └───────────┬─────────────────────────┬───────────────┘
//!             │                         │
//! ┌───────────▼──────────────┐ ┌────────▼──────────────────┐
//! │    Reference Counts      │ │        Free List          │
//! │  • one AtomicU32/frame   │ │  • intrusive LIFO stack   │
//! │  • CAS retry loops       │ │  • guarded by SpinLock    │
//! │  • no lock               │ │  • O(1) push / pop        │
//! └──────────────────────────┘ └────────┬──────────────────┘
//!                                       │
//!                          ┌────────────▼──────────────┐
//!                          │       PhysMapper          │
//!                          │  • identity or HHDM       │
//!                          └───────────────────────────┘
//! ```
//!
//! ## Frame Lifecycle
//!
//! - [`FrameAllocator::init`] gives every frame of the [`ManagedRange`] a
//!   count of one and releases it through the normal free path.
//! - [`FrameAllocator::allocate`] pops a frame and raises its count 0 → 1.
//! - [`FrameAllocator::share`] adds an owner to a frame that already has one.
//! - [`FrameAllocator::free`] drops an owner; at zero the frame is validated,
//!   filled with the free marker and pushed back.
//!
//! ## Concurrency
//!
//! Count updates are compare-and-swap retry loops on a single word and never
//! lose an update. The free list is only touched while its spin lock is held,
//! and only for the pointer swap; marker fills happen outside the lock.
//! Callers must never share a frame whose last owner may be releasing it.
//!
//! ## Errors
//!
//! Running out of frames is reported as `None`. Contract violations (freeing
//! an unaligned or unmanaged address, releasing a frame with no owner) are
//! fatal in [`FrameAllocator::free`]; the `try_*` variants report them as
//! [`FrameError`] instead.
//!
//! ## Usage
//!
//! ```rust
//! use core::sync::atomic::AtomicU32;
//! use kernel_frame_alloc::{FrameAllocator, IdentityPhysMapper, ManagedRange};
//! use kernel_memory_addresses::PhysicalAddress;
//!
//! #[repr(align(4096))]
//! struct Frame([u8; 4096]);
//! let mut ram: Vec<Frame> = (0..4).map(|_| Frame([0; 4096])).collect();
//! let base = PhysicalAddress::from_ptr(ram.as_mut_ptr());
//!
//! let range = ManagedRange::new(base, base + 4 * 4096).unwrap();
//! let counts: Vec<AtomicU32> = (0..range.frame_count()).map(|_| AtomicU32::new(0)).collect();
//! let frames = FrameAllocator::new(range, &counts, IdentityPhysMapper).unwrap();
//! unsafe { frames.init() };
//!
//! let frame = frames.allocate().unwrap();
//! assert_eq!(frames.ref_count(frame.base()), 1);
//! assert_eq!(frames.share(frame.base()), 2);
//! unsafe {
//!     frames.free(frame.base());
//!     frames.free(frame.base());
//! }
//! assert_eq!(frames.free_frames(), 4);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod error;
pub mod frame_alloc;
mod free_list;
pub mod phys_mapper;
pub mod range;
pub mod refcount;

pub use error::{FrameError, LayoutError, RefCountError};
pub use frame_alloc::FrameAllocator;
pub use phys_mapper::{HhdmPhysMapper, IdentityPhysMapper, PhysMapper};
pub use range::ManagedRange;
pub use refcount::RefCountTable;

use kernel_memory_addresses::PhysicalFrame;

/// Source of 4 KiB physical frames for the rest of the kernel.
pub trait FrameAlloc {
    /// Allocate one frame owned solely by the caller, or `None` if none is free.
    fn alloc_4k(&self) -> Option<PhysicalFrame>;

    /// Release the caller's reference to `frame`.
    ///
    /// # Safety
    /// The caller must own a reference to `frame` and must not touch it afterwards.
    unsafe fn free_4k(&self, frame: PhysicalFrame);
}
