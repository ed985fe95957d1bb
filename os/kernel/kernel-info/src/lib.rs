//! # Kernel Memory Configuration
//!
//! Compile-time constants describing where physical memory lives and how the
//! kernel reaches it. They are the single source of truth for the physical
//! frame allocator and for anything that has to agree with it (linker script,
//! boot code, page-table setup).
//!
//! ## Physical Memory Layout
//!
//! ```text
//! PHYS_MEMORY_BASE ┌─────────────────────────────────┐ 0x0010_0000 (1 MiB)
//! (= PHYS_LOAD)    │       Kernel Image              │
//!                  │   (Text, Data, BSS)             │
//! end of image     ├─────────────────────────────────┤ rounded up to 4 KiB
//!                  │    Available RAM                │
//!                  │  (Managed by frame allocator)   │
//! PHYS_MEMORY_TOP  └─────────────────────────────────┘ base + 128 MiB
//! ```
//!
//! The end of the kernel image is only known at link time; the allocator
//! receives it at boot and derives its managed range from it and
//! [`PHYS_MEMORY_TOP`](memory::PHYS_MEMORY_TOP).
//!
//! ## Physical Access
//!
//! All physical memory is also reachable at
//! [`HHDM_BASE`](memory::HHDM_BASE)` + pa` once paging is set up.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod memory;
