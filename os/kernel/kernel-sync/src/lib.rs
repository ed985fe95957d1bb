//! # Kernel synchronization primitives
//!
//! Only a busy-wait [`SpinLock`] lives here. Anything that can be expressed as
//! a single atomic read-modify-write should use `core::sync::atomic` directly
//! instead of taking a lock.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod spin_lock;

pub use spin_lock::{SpinLock, SpinLockGuard};
