//! # rust-adc-frame-sampler
//!
//! Fixed-rate analog button/pot sampler with binary frame output.
//!
//! ## Architecture
//!
//! One control flow, no concurrency. The scheduler drives every channel
//! round-robin, accumulates a fixed window of raw ADC readings per channel,
//! then classifies, encodes and emits one frame:
//!
//! ```text
//! Scheduler ──▶ Channel (settle/read) ──▶ SampleWindow
//!                                             │ window full
//!                                             ▼
//!                      classify ──▶ encode ──▶ FrameSink
//! ```
//!
//! The library is `no_std` and hardware-free: ADC access, delays and the
//! output byte stream are traits in [`hal`], implemented by the firmware
//! binary (ESP-IDF) or by mocks on the host.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod sample;
pub mod classify;
pub mod frame;
pub mod sampler;
pub mod scheduler;
pub mod fault;
pub mod logging;
pub mod hal;

pub use classify::{classify, ButtonState, Calibration, CalibrationRange, ChannelReading};
pub use config::{FLAGS, SAMPLES, TAUSEND, THRESHOLD};
pub use fault::{FaultCode, FaultState};
pub use frame::{FRAME_LEN, MARKER};
pub use sample::SampleWindow;
pub use sampler::Channel;
pub use scheduler::{Scheduler, TickOutcome};

/// Diagnostic stream for the whole process.
///
/// Single producer (the sampling loop), single consumer (the drain in the
/// outer layer: UART on target, stderr on host).
pub static DIAG_STREAM: logging::DiagStream = logging::DiagStream::new();
