//! Per-frame reference counts.
//!
//! One [`AtomicU32`] per managed frame. Every update is a compare-and-swap
//! retry loop on a single slot; there is no lock. The storage is borrowed so
//! the kernel can place the table in a `static` and tests can use a `Vec`.

use crate::error::RefCountError;
use core::sync::atomic::{AtomicU32, Ordering};

/// Dense table of per-frame reference counts, indexed by frame index.
///
/// ### Invariants
/// - Slots only change through [`increment`](Self::increment),
///   [`increment_shared`](Self::increment_shared) and
///   [`decrement`](Self::decrement), apart from [`reset`](Self::reset) before
///   the allocator goes live.
/// - A slot never wraps: under- and overflow are reported, not committed.
#[derive(Debug)]
pub struct RefCountTable<'a> {
    counts: &'a [AtomicU32],
}

impl<'a> RefCountTable<'a> {
    #[must_use]
    pub const fn new(counts: &'a [AtomicU32]) -> Self {
        Self { counts }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Current count of slot `index`. Stale as soon as it returns.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> u32 {
        self.counts[index].load(Ordering::Acquire)
    }

    /// Adds one owner and returns the new count. Accepts a count of zero,
    /// which is how a freshly allocated frame gets its first owner.
    ///
    /// # Errors
    /// [`RefCountError::Overflow`] at `u32::MAX`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[inline]
    pub fn increment(&self, index: usize) -> Result<u32, RefCountError> {
        self.update(index, |count| count.checked_add(1).ok_or(RefCountError::Overflow))
    }

    /// Adds one owner to a frame that already has at least one.
    ///
    /// # Errors
    /// [`RefCountError::NotOwned`] if the count is zero, or
    /// [`RefCountError::Overflow`] at `u32::MAX`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[inline]
    pub fn increment_shared(&self, index: usize) -> Result<u32, RefCountError> {
        self.update(index, |count| match count {
            0 => Err(RefCountError::NotOwned),
            n => n.checked_add(1).ok_or(RefCountError::Overflow),
        })
    }

    /// Drops one owner and returns the remaining count.
    ///
    /// # Errors
    /// [`RefCountError::Underflow`] if the count is already zero.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[inline]
    pub fn decrement(&self, index: usize) -> Result<u32, RefCountError> {
        self.update(index, |count| count.checked_sub(1).ok_or(RefCountError::Underflow))
    }

    /// Zeroes every slot.
    ///
    /// Only valid while nothing else can observe the table (allocator setup).
    pub(crate) fn reset(&self) {
        for slot in self.counts {
            slot.store(0, Ordering::Relaxed);
        }
    }

    /// Read, compute, compare-and-swap; start over if another core got in between.
    fn update(
        &self,
        index: usize,
        next: impl Fn(u32) -> Result<u32, RefCountError>,
    ) -> Result<u32, RefCountError> {
        let slot = &self.counts[index];
        let mut current = slot.load(Ordering::Relaxed);
        loop {
            let new = next(current)?;
            match slot.compare_exchange_weak(current, new, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => return Ok(new),
                Err(observed) => current = observed,
            }
        }
    }
}
