//! Reference-counted physical frame allocator.
//!
//! A frame is handed out with a count of one and only returns to the free
//! list once its last owner lets go of it. Counts are updated lock-free; the
//! free list is guarded by a spin lock held only for the pointer swap.

use crate::FrameAlloc;
use crate::error::{FrameError, LayoutError};
use crate::free_list::FreeList;
use crate::phys_mapper::PhysMapper;
use crate::range::ManagedRange;
use crate::refcount::RefCountTable;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use kernel_info::memory::{ALLOC_JUNK_BYTE, FREE_JUNK_BYTE};
use kernel_memory_addresses::{FRAME_SIZE, PhysicalAddress, PhysicalFrame};
use kernel_sync::SpinLock;
use log::{error, info, trace, warn};

#[allow(clippy::cast_possible_truncation)]
const FRAME_BYTES: usize = FRAME_SIZE as usize;

/// Physical frame allocator with per-frame reference counts.
///
/// Construct once during boot with [`new`](Self::new), run
/// [`init`](Self::init) exactly once, then share the instance by reference
/// with every subsystem that allocates or releases frames.
///
/// ```text
/// UNMANAGED ──init──▶ FREE ──allocate──▶ ALLOCATED(1) ──share──▶ ALLOCATED(n)
///                      ▲                      │                      │
///                      └──────free (n == 0)───┴──────free (n > 0)────┘
/// ```
pub struct FrameAllocator<'a, M: PhysMapper> {
    range: ManagedRange,
    refs: RefCountTable<'a>,
    free: SpinLock<FreeList>,
    mapper: M,
    initialized: AtomicBool,
}

impl<'a, M: PhysMapper> FrameAllocator<'a, M> {
    /// Creates an allocator over `range` with no free frames yet.
    ///
    /// `counts` needs one slot per frame in `range`; its contents are
    /// discarded by [`init`](Self::init).
    ///
    /// # Errors
    /// [`LayoutError::TableTooSmall`] if `counts` is shorter than the range.
    pub fn new(
        range: ManagedRange,
        counts: &'a [AtomicU32],
        mapper: M,
    ) -> Result<Self, LayoutError> {
        let frames = range.frame_count();
        if counts.len() < frames {
            return Err(LayoutError::TableTooSmall {
                frames,
                slots: counts.len(),
            });
        }
        Ok(Self {
            range,
            refs: RefCountTable::new(counts),
            free: SpinLock::new("kmem", FreeList::new()),
            mapper,
            initialized: AtomicBool::new(false),
        })
    }

    /// Puts every frame of the managed range on the free list.
    ///
    /// Each frame is given a count of one and released through the regular
    /// [`free`](Self::free) path, so it gets the same validation and
    /// free-marker fill as any runtime release.
    ///
    /// # Safety
    /// - The whole managed range must be RAM that nothing else uses, mapped
    ///   writable by the mapper.
    /// - No other core may use the allocator until this returns.
    ///
    /// # Panics
    /// If called more than once.
    pub unsafe fn init(&self) {
        assert!(
            !self.initialized.swap(true, Ordering::AcqRel),
            "frame allocator initialized twice"
        );

        self.refs.reset();
        for (index, frame) in self.range.frames().enumerate() {
            if let Err(err) = self.refs.increment(index) {
                fatal("init", FrameError::from_ref_count(err, frame.base()));
            }
            unsafe { self.free(frame.base()) };
        }

        info!(
            "frame allocator: {} frames ({} KiB) free in {}..{}",
            self.free_frames(),
            self.range.frame_count() * (FRAME_BYTES / 1024),
            self.range.start().base(),
            self.range.end()
        );
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Hands out one frame with a reference count of one.
    ///
    /// The frame is filled with [`ALLOC_JUNK_BYTE`]. Returns `None` when no
    /// frame is free; the caller decides how to handle that.
    ///
    /// # Panics
    /// If the free list yields a frame that still has owners.
    #[must_use]
    pub fn allocate(&self) -> Option<PhysicalFrame> {
        let frame = self.free.with_lock(|list| unsafe { list.pop(&self.mapper) });
        let Some(frame) = frame else {
            warn!("frame allocator: out of physical frames");
            return None;
        };

        unsafe { self.fill(frame, ALLOC_JUNK_BYTE) };

        match self.claim(frame) {
            Ok(1) => {}
            Ok(count) => fatal(
                "allocate",
                FrameError::StillOwned {
                    frame: frame.base(),
                    owners: count - 1,
                },
            ),
            Err(err) => fatal("allocate", err),
        }

        trace!("allocated frame {frame}");
        Some(frame)
    }

    /// Like [`allocate`](Self::allocate), but the frame is zero-filled.
    #[must_use]
    pub fn allocate_zeroed(&self) -> Option<PhysicalFrame> {
        let frame = self.allocate()?;
        unsafe { self.fill(frame, 0) };
        Some(frame)
    }

    /// Releases one reference to the frame at `pa`; on the last one the frame
    /// returns to the free list.
    ///
    /// # Safety
    /// The caller must hold a reference to the frame, obtained from
    /// [`allocate`](Self::allocate) or [`share`](Self::share), and must not
    /// touch the frame afterwards.
    ///
    /// # Panics
    /// On any [`FrameError`] reported by [`try_free`](Self::try_free): the
    /// frame table or the caller is corrupt and the kernel cannot continue.
    pub unsafe fn free(&self, pa: PhysicalAddress) {
        if let Err(err) = unsafe { self.try_free(pa) } {
            fatal("free", err);
        }
    }

    /// Fallible form of [`free`](Self::free). Returns the remaining count;
    /// zero means the frame is back on the free list.
    ///
    /// # Safety
    /// Same as [`free`](Self::free).
    ///
    /// # Errors
    /// - [`FrameError::OutOfRange`] if `pa` is not in the managed range.
    /// - [`FrameError::Underflow`] if the frame has no owner.
    /// - [`FrameError::Misaligned`] if the count would drop to zero but `pa`
    ///   is not the frame's base address. The reference is kept.
    pub unsafe fn try_free(&self, pa: PhysicalAddress) -> Result<u32, FrameError> {
        let index = self.range.frame_index(pa)?;
        let remaining = self
            .refs
            .decrement(index)
            .map_err(|err| FrameError::from_ref_count(err, pa))?;
        if remaining > 0 {
            return Ok(remaining);
        }

        let frame = match self.range.validate(pa) {
            Ok(frame) => frame,
            Err(err) => {
                // off the free list at zero, so nobody else can reach it
                self.refs
                    .increment(index)
                    .map_err(|e| FrameError::from_ref_count(e, pa))?;
                return Err(err);
            }
        };
        unsafe { self.fill(frame, FREE_JUNK_BYTE) };
        self.free
            .with_lock(|list| unsafe { list.push(&self.mapper, frame) });

        trace!("reclaimed frame {frame}");
        Ok(0)
    }

    /// Adds an owner to a frame the caller already owns (copy-on-write
    /// mapping) and returns the new count.
    ///
    /// # Panics
    /// On any [`FrameError`] reported by [`try_share`](Self::try_share).
    pub fn share(&self, pa: PhysicalAddress) -> u32 {
        match self.try_share(pa) {
            Ok(count) => count,
            Err(err) => fatal("share", err),
        }
    }

    /// Fallible form of [`share`](Self::share).
    ///
    /// # Errors
    /// - [`FrameError::OutOfRange`] if `pa` is not in the managed range.
    /// - [`FrameError::NotOwned`] if the frame has no owner to share with.
    /// - [`FrameError::Overflow`] if the count is saturated.
    pub fn try_share(&self, pa: PhysicalAddress) -> Result<u32, FrameError> {
        let index = self.range.frame_index(pa)?;
        self.refs
            .increment_shared(index)
            .map_err(|err| FrameError::from_ref_count(err, pa))
    }

    /// Current reference count of the frame containing `pa`.
    ///
    /// # Panics
    /// If `pa` is outside the managed range.
    #[must_use]
    pub fn ref_count(&self, pa: PhysicalAddress) -> u32 {
        match self.range.frame_index(pa) {
            Ok(index) => self.refs.get(index),
            Err(err) => fatal("ref_count", err),
        }
    }

    /// Whether more than one owner holds the frame containing `pa`, i.e. a
    /// write must copy it first.
    ///
    /// # Panics
    /// If `pa` is outside the managed range.
    #[must_use]
    pub fn is_shared(&self, pa: PhysicalAddress) -> bool {
        self.ref_count(pa) > 1
    }

    /// Number of frames currently on the free list.
    #[must_use]
    pub fn free_frames(&self) -> usize {
        self.free.with_lock(|list| list.len())
    }

    #[inline]
    #[must_use]
    pub const fn total_frames(&self) -> usize {
        self.range.frame_count()
    }

    #[inline]
    #[must_use]
    pub const fn range(&self) -> &ManagedRange {
        &self.range
    }

    #[inline]
    #[must_use]
    pub const fn mapper(&self) -> &M {
        &self.mapper
    }

    fn claim(&self, frame: PhysicalFrame) -> Result<u32, FrameError> {
        let index = self.range.frame_index(frame.base())?;
        self.refs
            .increment(index)
            .map_err(|err| FrameError::from_ref_count(err, frame.base()))
    }

    /// # Safety
    /// The caller must be the frame's only user.
    unsafe fn fill(&self, frame: PhysicalFrame, byte: u8) {
        let ptr = self.mapper.phys_to_ptr::<u8>(frame.base());
        unsafe { core::ptr::write_bytes(ptr, byte, FRAME_BYTES) };
    }
}

impl<M: PhysMapper> FrameAlloc for FrameAllocator<'_, M> {
    #[inline]
    fn alloc_4k(&self) -> Option<PhysicalFrame> {
        self.allocate()
    }

    #[inline]
    unsafe fn free_4k(&self, frame: PhysicalFrame) {
        unsafe { self.free(frame.base()) }
    }
}

impl<M: PhysMapper> core::fmt::Debug for FrameAllocator<'_, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameAllocator")
            .field("range", &self.range)
            .field("initialized", &self.is_initialized())
            .field("free", &self.free)
            .finish_non_exhaustive()
    }
}

#[cold]
#[track_caller]
fn fatal(op: &str, err: FrameError) -> ! {
    error!("{op}: {err}");
    panic!("{op}: {err}");
}
