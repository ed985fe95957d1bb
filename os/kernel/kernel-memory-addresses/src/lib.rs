//! # Physical Memory Address Types
//!
//! Strongly typed wrappers for raw physical addresses and the 4 KiB frames
//! handed out by the physical frame allocator.
//!
//! ## Overview
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PhysicalAddress`] | A raw 64-bit physical address (RAM or MMIO), not necessarily aligned. |
//! | [`PhysicalFrame`] | The base address of a 4 KiB physical frame (low 12 bits always zero). |
//!
//! Both are `#[repr(transparent)]` wrappers around `u64` and cost nothing at
//! runtime; they only prevent raw integers, unaligned addresses and frame
//! bases from being mixed up.
//!
//! ## Typical Usage
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let pa = PhysicalAddress::new(0x8000_1234);
//! let frame = pa.frame();
//! assert_eq!(frame.base().as_u64(), 0x8000_1000);
//! assert_eq!(pa.frame_offset(), 0x234);
//!
//! // Only aligned addresses convert into frames without rounding.
//! assert!(PhysicalFrame::from_aligned(pa).is_none());
//! assert_eq!(PhysicalFrame::from_aligned(frame.base()), Some(frame));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod physical_address;
mod physical_frame;

pub use physical_address::PhysicalAddress;
pub use physical_frame::PhysicalFrame;

/// Size of one physical frame in bytes.
pub const FRAME_SIZE: u64 = 4096;

/// `log2(FRAME_SIZE)`, the number of low bits used for the in-frame offset.
pub const FRAME_SHIFT: u32 = 12;

/// Mask selecting the in-frame offset bits.
pub const FRAME_OFFSET_MASK: u64 = FRAME_SIZE - 1;

const _: () = assert!(1 << FRAME_SHIFT == FRAME_SIZE);
