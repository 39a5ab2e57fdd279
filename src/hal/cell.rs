//! Interrupt-safe cells shared between ISRs and the polling loop.
//!
//! Stores use `Release` and loads use `Acquire`, so a tick written before a
//! flag is raised is visible to whoever observes the flag.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Boolean flag written from interrupt context.
#[derive(Debug, Default)]
pub struct AtomicFlag(AtomicBool);

impl AtomicFlag {
    pub const fn new(value: bool) -> Self {
        AtomicFlag(AtomicBool::new(value))
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, value: bool) {
        self.0.store(value, Ordering::Release);
    }

    /// Set the flag and return its previous value.
    pub fn replace(&self, value: bool) -> bool {
        self.0.swap(value, Ordering::AcqRel)
    }
}

/// 32-bit tick or counter written from interrupt context.
#[derive(Debug, Default)]
pub struct TickCell(AtomicU32);

impl TickCell {
    pub const fn new(value: u32) -> Self {
        TickCell(AtomicU32::new(value))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, value: u32) {
        self.0.store(value, Ordering::Release);
    }

    /// Add `delta`, wrapping on overflow, and return the new value.
    pub fn add(&self, delta: u32) -> u32 {
        self.0.fetch_add(delta, Ordering::AcqRel).wrapping_add(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_set_and_replace() {
        let flag = AtomicFlag::new(false);
        flag.set(true);
        assert!(flag.get());
        assert!(flag.replace(false));
        assert!(!flag.get());
    }

    #[test]
    fn tick_add_wraps() {
        let tick = TickCell::new(u32::MAX);
        assert_eq!(tick.add(2), 1);
        assert_eq!(tick.get(), 1);
    }
}
