//! # Reaching physical frames from the kernel
//!
//! The allocator writes into the frames it manages: the free-list link lives
//! inside each free frame, and frames are filled with marker bytes on
//! allocation and release. Code can only dereference virtual addresses, so a
//! [`PhysMapper`] turns a physical address into a pointer in the current
//! address space.
//!
//! - [`IdentityPhysMapper`]: physical == virtual. Identity-mapped kernels, and
//!   tests that manage host memory.
//! - [`HhdmPhysMapper`]: every physical address is mapped at `HHDM_BASE + pa`.

use kernel_info::memory::HHDM_BASE;
use kernel_memory_addresses::PhysicalAddress;

/// Converts physical addresses into pointers in the current address space.
///
/// Producing the pointer is always safe; dereferencing it is only sound if the
/// mapping covers the address and the memory is not otherwise in use.
pub trait PhysMapper {
    fn phys_to_ptr<T>(&self, pa: PhysicalAddress) -> *mut T;
}

/// [`PhysMapper`] for address spaces where physical memory is identity mapped.
#[derive(Debug, Default, Copy, Clone)]
pub struct IdentityPhysMapper;

impl PhysMapper for IdentityPhysMapper {
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn phys_to_ptr<T>(&self, pa: PhysicalAddress) -> *mut T {
        core::ptr::with_exposed_provenance_mut(pa.as_u64() as usize)
    }
}

/// [`PhysMapper`] for kernels with a higher-half direct map (HHDM).
///
/// The HHDM must already be installed and cover the managed range.
#[derive(Debug, Default, Copy, Clone)]
pub struct HhdmPhysMapper;

impl PhysMapper for HhdmPhysMapper {
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn phys_to_ptr<T>(&self, pa: PhysicalAddress) -> *mut T {
        core::ptr::with_exposed_provenance_mut((HHDM_BASE + pa.as_u64()) as usize)
    }
}
