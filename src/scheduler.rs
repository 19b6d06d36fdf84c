//! Round-robin sampling scheduler.
//!
//! Drives every channel once per tick, accumulating one window slot per
//! channel, and emits a single frame the moment the windows are full:
//!
//! - ticks 0..SAMPLES-1: sample all channels at the cycle counter's index
//! - tick SAMPLES-1 additionally classifies, encodes and writes the frame,
//!   then resets the cycle counter
//!
//! The loop never exits on its own; any ADC or sink fault latches
//! [`FaultState`] and ends [`run`](Scheduler::run) with the fault code.
//! Channel order is fixed, so frame positions are stable and consumers
//! decode positionally.
//!
//! All state lives in this struct (no ambient globals): channels with
//! their windows, the cycle counter and the total tick count.

use crate::classify::{classify, Calibration, ChannelReading, CALIBRATION};
use crate::config::{RuntimeFlags, FLAGS, LOOP_DELAY_MS, MAX_CHANNELS, SAMPLES};
use crate::fault::{FaultCode, FaultState};
use crate::frame::{encode_frame, frame_len};
use crate::hal::{AdcInput, DelayTimer, FrameSink};
use crate::logging::DiagStream;
use crate::sampler::Channel;
use crate::{diag_debug, diag_error, diag_info};

/// What a single scheduler tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Windows are still filling; one slot was sampled per channel.
    Sampled,
    /// Windows filled this tick; one frame was classified and emitted
    /// (or, in debug mode, summarized on the diagnostic stream).
    Emitted,
}

/// The sampling loop state machine.
pub struct Scheduler<'a, A: AdcInput, const N: usize> {
    channels: [Channel<A>; N],
    cal: Calibration,
    /// Fill position within the current window, 0..SAMPLES.
    cycle: usize,
    /// Total ticks since construction (diagnostics timestamping).
    ticks: u32,
    fault: &'a FaultState,
    diag: &'a DiagStream,
    flags: &'a RuntimeFlags,
}

impl<'a, A: AdcInput, const N: usize> Scheduler<'a, A, N> {
    /// Create a scheduler over `channels`, in frame order.
    ///
    /// Debug mode follows the process-wide [`FLAGS`].
    ///
    /// # Panics
    ///
    /// Panics if `N` exceeds [`MAX_CHANNELS`] (frame scratch buffer bound)
    /// or is zero.
    pub fn new(channels: [Channel<A>; N], fault: &'a FaultState, diag: &'a DiagStream) -> Self {
        assert!(N > 0 && N <= MAX_CHANNELS, "unsupported channel count");

        Self {
            channels,
            cal: CALIBRATION,
            cycle: 0,
            ticks: 0,
            fault,
            diag,
            flags: &FLAGS,
        }
    }

    /// Use a private flags block instead of the process-wide one.
    pub fn with_flags(mut self, flags: &'a RuntimeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Current fill position within the window.
    #[inline]
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// Total ticks executed.
    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Execute one scheduler tick.
    ///
    /// Samples every channel at the current index; when that completes the
    /// window, classifies all channels and emits one frame, resetting the
    /// cycle counter. Faults are latched and returned; the caller decides
    /// to abort (there is no recovery path in scope).
    pub fn tick<D: DelayTimer, S: FrameSink>(
        &mut self,
        delay: &mut D,
        sink: &mut S,
    ) -> Result<TickOutcome, FaultCode> {
        self.ticks = self.ticks.wrapping_add(1);

        for channel in self.channels.iter_mut() {
            if let Err(code) = channel.sample(delay, self.cycle) {
                self.fault.set(code, channel.pin() as u32);
                diag_error!(
                    self.diag,
                    self.ticks,
                    "adc read failed on pin {}",
                    channel.pin()
                );
                return Err(code);
            }
        }

        self.cycle += 1;
        if self.cycle < SAMPLES {
            return Ok(TickOutcome::Sampled);
        }

        self.cycle = 0;
        self.emit(sink)?;
        Ok(TickOutcome::Emitted)
    }

    /// Run forever: tick, wait [`LOOP_DELAY_MS`], repeat.
    ///
    /// Returns only on a fault, with its code; the caller reports the
    /// latched [`FaultState`] and aborts the process.
    pub fn run<D: DelayTimer, S: FrameSink>(&mut self, delay: &mut D, sink: &mut S) -> FaultCode {
        loop {
            if let Err(code) = self.tick(delay, sink) {
                return code;
            }
            delay.delay_ms(LOOP_DELAY_MS);
        }
    }

    /// Classify all windows and emit one frame.
    ///
    /// Debug mode replaces the binary write with human-readable summaries
    /// on the diagnostic stream (one line per channel plus a frame dump).
    fn emit<S: FrameSink>(&mut self, sink: &mut S) -> Result<(), FaultCode> {
        let mut readings = [ChannelReading::IDLE; N];
        for (reading, channel) in readings.iter_mut().zip(self.channels.iter()) {
            *reading = classify(channel.window().as_slice(), &self.cal);
        }

        let mut buf = [0u8; frame_len(MAX_CHANNELS)];
        let len = encode_frame(&readings, &mut buf);

        if self.flags.debug() {
            for (reading, channel) in readings.iter().zip(self.channels.iter()) {
                diag_info!(
                    self.diag,
                    self.ticks,
                    "Pin {} button: {} pot: {}",
                    channel.pin(),
                    reading.state as u8,
                    reading.intensity
                );
            }
            diag_debug!(self.diag, self.ticks, "frame {:02X?}", &buf[..len]);
            return Ok(());
        }

        sink.write_all(&buf[..len]).map_err(|code| {
            self.fault.set(code, len as u32);
            diag_error!(self.diag, self.ticks, "sink write failed ({} bytes)", len);
            code
        })
    }
}
