//! Module: sample
//!
//! Purpose: Fixed-capacity window of raw ADC readings for one channel.
//!
//! Architecture:
//! - Exactly [`SAMPLES`] slots, allocated inline, reused for the process
//!   lifetime. No history beyond the current window.
//! - The scheduler's cycle counter decides which slot is written; the
//!   window itself is dumb storage.
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

use crate::config::SAMPLES;

/// One raw ADC reading (converter resolution, left-aligned to 16 bits).
pub type RawSample = u16;

/// Fixed window of raw readings for a single channel.
///
/// Overwritten in place each cycle; slots from the previous cycle remain
/// until the same index is written again, which is harmless because the
/// classifier only runs on a completely refilled window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleWindow {
    slots: [RawSample; SAMPLES],
}

impl SampleWindow {
    /// Create a zeroed window.
    pub const fn new() -> Self {
        Self {
            slots: [0; SAMPLES],
        }
    }

    /// Window capacity (always [`SAMPLES`]).
    #[inline]
    pub const fn capacity(&self) -> usize {
        SAMPLES
    }

    /// Store a reading at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= SAMPLES`. The scheduler's cycle counter is the
    /// only index source and never exceeds the window.
    #[inline]
    pub fn store(&mut self, index: usize, raw: RawSample) {
        self.slots[index] = raw;
    }

    /// Read the slot at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> RawSample {
        self.slots[index]
    }

    /// View the whole window for classification.
    #[inline]
    pub fn as_slice(&self) -> &[RawSample] {
        &self.slots
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_starts_zeroed() {
        let window = SampleWindow::new();
        assert_eq!(window.capacity(), SAMPLES);
        assert!(window.as_slice().iter().all(|&raw| raw == 0));
    }

    #[test]
    fn test_window_store_and_get() {
        let mut window = SampleWindow::new();
        window.store(0, 26650);
        window.store(SAMPLES - 1, 38450);

        assert_eq!(window.get(0), 26650);
        assert_eq!(window.get(SAMPLES - 1), 38450);
        assert_eq!(window.get(1), 0);
    }

    #[test]
    fn test_window_overwritten_in_place() {
        let mut window = SampleWindow::new();
        window.store(3, 1000);
        window.store(3, 2000);
        assert_eq!(window.get(3), 2000);
    }

    #[test]
    #[should_panic]
    fn test_window_index_out_of_range_panics() {
        let mut window = SampleWindow::new();
        window.store(SAMPLES, 1);
    }
}
