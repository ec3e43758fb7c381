//! Provides the add-in-place primitive used to merge block results into the
//! global histogram.
//!
//! Rust doesn't provide an atomic float type, so we store the bits of an
//! `f32` in an [`AtomicU32`] and implement addition with a
//! compare-and-swap loop.

use core::sync::atomic::{AtomicU32, Ordering};

#[repr(transparent)]
#[derive(Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub const fn new(value: f32) -> Self {
        AtomicF32(AtomicU32::new(value.to_bits()))
    }

    #[inline(always)]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline(always)]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed)
    }

    /// add `value`, assuming that no other block writes to this entry during
    /// the current launch.
    ///
    /// This is a plain read-modify-write, it is **NOT** safe to use when
    /// multiple blocks share the destination (updates may be lost).
    #[inline(always)]
    pub fn add_exclusive(&self, value: f32) {
        self.store(self.load() + value)
    }

    /// atomically add `value`; returns the previous value
    #[inline(always)]
    pub fn fetch_add(&self, value: f32) -> f32 {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let desired = (f32::from_bits(current) + value).to_bits();
            match self.0.compare_exchange_weak(
                current,
                desired,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(previous) => return f32::from_bits(previous),
                Err(actual) => current = actual,
            }
        }
    }
}

impl core::fmt::Debug for AtomicF32 {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.load(), f)
    }
}
