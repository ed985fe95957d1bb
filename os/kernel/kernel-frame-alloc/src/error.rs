use kernel_memory_addresses::PhysicalAddress;

/// Failure of a single reference count update.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefCountError {
    #[error("reference count would drop below zero")]
    Underflow,
    #[error("reference count would exceed u32::MAX")]
    Overflow,
    #[error("reference count is zero")]
    NotOwned,
}

/// A frame operation that violated the allocator's contract.
///
/// Out-of-memory is not an error; [`allocate`](crate::FrameAllocator::allocate)
/// reports it as `None`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("frame address {0} is not 4 KiB aligned")]
    Misaligned(PhysicalAddress),
    #[error("frame address {addr} is outside the managed range {start}..{end}")]
    OutOfRange {
        addr: PhysicalAddress,
        start: PhysicalAddress,
        end: PhysicalAddress,
    },
    #[error("reference count of frame {0} would drop below zero")]
    Underflow(PhysicalAddress),
    #[error("reference count of frame {0} would overflow")]
    Overflow(PhysicalAddress),
    #[error("frame {0} has no owner to share it with")]
    NotOwned(PhysicalAddress),
    #[error("frame {frame} on the free list still has {owners} owner(s)")]
    StillOwned { frame: PhysicalAddress, owners: u32 },
}

impl FrameError {
    pub(crate) const fn from_ref_count(err: RefCountError, addr: PhysicalAddress) -> Self {
        match err {
            RefCountError::Underflow => Self::Underflow(addr),
            RefCountError::Overflow => Self::Overflow(addr),
            RefCountError::NotOwned => Self::NotOwned(addr),
        }
    }
}

/// The managed range or its backing storage is unusable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("managed range {start}..{end} contains no whole frame")]
    EmptyRange {
        start: PhysicalAddress,
        end: PhysicalAddress,
    },
    #[error("reference count table has {slots} slots but the range has {frames} frames")]
    TableTooSmall { frames: usize, slots: usize },
}
