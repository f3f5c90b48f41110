//! Atomic storage for floating-point metric state.
//!
//! The standard library has no atomic `f64`, so the value is stored as raw
//! bits in an `AtomicU64`; addition runs a compare-and-swap loop.  We always
//! require a 64-bit atomic regardless of what the target architecture
//! exposes natively.

use std::sync::atomic::Ordering;

#[cfg(target_pointer_width = "32")]
pub(crate) use portable_atomic::AtomicU64;
#[cfg(not(target_pointer_width = "32"))]
pub(crate) use std::sync::atomic::AtomicU64;

/// An `f64` cell with atomic load, store, and add.
#[derive(Debug, Default)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    /// Creates the cell holding `value`.
    pub fn new(value: f64) -> Self {
        AtomicF64(AtomicU64::new(value.to_bits()))
    }

    /// Reads the current value.
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Replaces the current value.
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Release);
    }

    /// Adds `delta` to the current value, returning the new value.
    ///
    /// Addition saturates the way IEEE 754 does: once the value reaches
    /// `+Inf` it stays there.
    pub fn add(&self, delta: f64) -> f64 {
        let mut updated = 0.0;
        let _ = self.0.fetch_update(Ordering::AcqRel, Ordering::Relaxed, |current| {
            updated = f64::from_bits(current) + delta;
            Some(updated.to_bits())
        });
        updated
    }
}
