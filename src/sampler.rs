//! Per-channel sampling: settle, throwaway read, settle, stored read.
//!
//! The double-delay/double-read protocol is correctness-critical and must
//! not be "optimized": the first reading after idle can be stale while
//! the converter's sample capacitor charges (the RP2040 datasheet
//! recommends discarding it), and the 100 µs settle times match the
//! sensor's source impedance. Changing either shifts the calibration.

use crate::config::SETTLE_DELAY_US;
use crate::fault::FaultCode;
use crate::hal::{AdcInput, DelayTimer};
use crate::sample::SampleWindow;

/// One physical analog channel: its ADC input, pin id and sample window.
///
/// The window is exclusively owned; nothing outside the scheduler ever
/// writes it.
pub struct Channel<A: AdcInput> {
    adc: A,
    pin: u8,
    window: SampleWindow,
}

impl<A: AdcInput> Channel<A> {
    /// Wrap an initialized ADC input. `pin` is only used in diagnostics
    /// and fault data.
    pub fn new(adc: A, pin: u8) -> Self {
        Self {
            adc,
            pin,
            window: SampleWindow::new(),
        }
    }

    /// Pin id of this channel.
    #[inline]
    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// The channel's current window.
    #[inline]
    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Take one reading into `window[index]`.
    ///
    /// Protocol: wait [`SETTLE_DELAY_US`], discard one read (converter
    /// warm-up), wait [`SETTLE_DELAY_US`] again, store the second read.
    ///
    /// A read failure propagates as [`FaultCode::AdcRead`]; the slot is
    /// left untouched in that case.
    pub fn sample<D: DelayTimer>(&mut self, delay: &mut D, index: usize) -> Result<(), FaultCode> {
        delay.delay_us(SETTLE_DELAY_US);
        let _ = self.adc.read_raw()?;

        delay.delay_us(SETTLE_DELAY_US);
        let raw = self.adc.read_raw()?;
        self.window.store(index, raw);
        Ok(())
    }
}
