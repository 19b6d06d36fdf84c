//! Hardware Abstraction Layer.
//!
//! Thin I/O seams for the three external collaborators: the ADC driver,
//! the timing primitive and the output byte sink. Business logic stays in
//! the core modules; HAL is just I/O.
//!
//! On `target_os = "espidf"` the [`espidf`] module implements these over
//! the ESP-IDF drivers. Host builds (simulation, tests) supply their own
//! implementations.

use crate::fault::FaultCode;
use crate::sample::RawSample;

#[cfg(target_os = "espidf")]
pub mod espidf;

/// One analog input line.
///
/// The driver must already be initialized; a failed read is a hard fault
/// of the driver layer and is never retried here.
pub trait AdcInput {
    /// Take one raw reading.
    fn read_raw(&mut self) -> Result<RawSample, FaultCode>;
}

/// Blocking delay provider.
///
/// Both delays are true blocking waits; there is no other work to yield
/// to in this system.
pub trait DelayTimer {
    /// Block for `n` microseconds.
    fn delay_us(&mut self, n: u32);

    /// Block for `n` milliseconds.
    fn delay_ms(&mut self, n: u32) {
        self.delay_us(n.saturating_mul(1000));
    }
}

/// Byte-oriented output stream for emitted frames.
///
/// Written exactly once per emit cycle, never concurrently.
pub trait FrameSink {
    /// Write all of `bytes`, or fail. Partial writes are a sink fault.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), FaultCode>;
}
