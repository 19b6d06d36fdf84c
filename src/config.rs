//! Module: config
//!
//! Purpose: Compile-time constants for the sampling pipeline plus the
//! process-wide runtime flags.
//!
//! Architecture:
//! - Calibration ranges, window size and timing are fixed at compile time.
//!   There is no CLI and no config file; retuning means rebuilding.
//! - Runtime flags (debug mode) are accessed lock-free through atomics so
//!   the sampling loop never blocks on configuration.
//!
//! Safety: Safe. All access via atomics, no locks.

use core::sync::atomic::{AtomicBool, Ordering};

/// Number of raw readings accumulated per channel before classification.
pub const SAMPLES: usize = 10;

/// Partition point between the DOWN and UP reading ranges.
///
/// A raw reading at or above this value belongs to the button-up range,
/// below it to the button-down range.
pub const THRESHOLD: u16 = 25000;

/// Intensity scale: TAU * 1000 = 6283.
///
/// Not a time value. Intensities in 0..=TAUSEND map directly to
/// milliradians of a full turn for downstream consumers.
pub const TAUSEND: u16 = 6283;

/// Raw reading bounds observed with the button up.
pub const BUTTON_UP_MIN: u16 = 26650;
pub const BUTTON_UP_MAX: u16 = 38450;

/// Raw reading bounds observed with the button down.
///
/// Pressing the button loads the divider and shifts the whole range low.
pub const BUTTON_DOWN_MIN: u16 = 192;
pub const BUTTON_DOWN_MAX: u16 = 20550;

/// Number of analog channels sampled per cycle.
pub const CHANNEL_COUNT: usize = 3;

/// Upper bound on channels a build may configure.
///
/// Sizes the fixed frame scratch buffer in the scheduler.
pub const MAX_CHANNELS: usize = 8;

/// ADC pins sampled, in frame order (RP2040 heritage: ADC0..ADC2).
pub const CHANNEL_PINS: [u8; CHANNEL_COUNT] = [26, 27, 28];

/// Settle time before each ADC read, in microseconds.
///
/// Applied twice per stored sample: once before the throwaway read and
/// once before the real one. Must stay at 100 to match sensor behavior.
pub const SETTLE_DELAY_US: u32 = 100;

/// Delay between scheduler iterations, in milliseconds.
pub const LOOP_DELAY_MS: u32 = 2;

/// Debug mode at boot. Runtime value lives in [`FLAGS`].
pub const DEBUG_DEFAULT: bool = false;

/// Process-wide runtime flags, lock-free.
pub struct RuntimeFlags {
    debug: AtomicBool,
}

impl RuntimeFlags {
    /// Create flags with debug mode off.
    pub const fn new() -> Self {
        Self {
            debug: AtomicBool::new(false),
        }
    }

    /// Check whether debug mode is active.
    ///
    /// Debug mode replaces binary frame emission with human-readable
    /// per-cycle summaries on the diagnostic stream.
    #[inline]
    pub fn debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Switch debug mode on or off.
    #[inline]
    pub fn set_debug(&self, on: bool) {
        self.debug.store(on, Ordering::Relaxed);
    }
}

impl Default for RuntimeFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Global runtime flags instance.
pub static FLAGS: RuntimeFlags = RuntimeFlags::new();
