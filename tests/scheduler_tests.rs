//! End-to-end scheduler tests: window fill invariant, emit cadence,
//! sampling protocol counts, exact frame bytes through the full pipeline.

use std::cell::Cell;
use std::rc::Rc;

use rust_adc_frame_sampler::config::{
    BUTTON_DOWN_MAX, BUTTON_UP_MIN, CHANNEL_PINS, SAMPLES, SETTLE_DELAY_US,
};
use rust_adc_frame_sampler::hal::{AdcInput, DelayTimer, FrameSink};
use rust_adc_frame_sampler::logging::DiagStream;
use rust_adc_frame_sampler::sample::RawSample;
use rust_adc_frame_sampler::{Channel, FaultCode, FaultState, Scheduler, TickOutcome};

/// ADC returning a constant reading, counting reads.
struct CountingAdc {
    raw: RawSample,
    reads: Rc<Cell<u32>>,
}

impl AdcInput for CountingAdc {
    fn read_raw(&mut self) -> Result<RawSample, FaultCode> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.raw)
    }
}

/// Delay recorder (microseconds only; ms delays recorded scaled).
struct CountingDelay {
    us_calls: u32,
}

impl DelayTimer for CountingDelay {
    fn delay_us(&mut self, n: u32) {
        assert_eq!(n, SETTLE_DELAY_US);
        self.us_calls += 1;
    }

    fn delay_ms(&mut self, _n: u32) {}
}

struct VecSink {
    frames: Vec<Vec<u8>>,
}

impl FrameSink for VecSink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), FaultCode> {
        self.frames.push(bytes.to_vec());
        Ok(())
    }
}

fn build_channels(raws: [RawSample; 3]) -> ([Channel<CountingAdc>; 3], Rc<Cell<u32>>) {
    let reads = Rc::new(Cell::new(0));
    let mut pin_index = 0;
    let channels = raws.map(|raw| {
        let channel = Channel::new(
            CountingAdc {
                raw,
                reads: Rc::clone(&reads),
            },
            CHANNEL_PINS[pin_index],
        );
        pin_index += 1;
        channel
    });
    (channels, reads)
}

#[test]
fn one_frame_after_exactly_samples_ticks() {
    let fault = FaultState::new();
    let diag = DiagStream::new();
    let (channels, _reads) = build_channels([BUTTON_UP_MIN; 3]);
    let mut scheduler = Scheduler::new(channels, &fault, &diag);
    let mut delay = CountingDelay { us_calls: 0 };
    let mut sink = VecSink { frames: vec![] };

    for tick in 0..SAMPLES - 1 {
        let outcome = scheduler.tick(&mut delay, &mut sink).unwrap();
        assert_eq!(outcome, TickOutcome::Sampled);
        assert_eq!(scheduler.cycle(), tick + 1);
        assert!(sink.frames.is_empty(), "no frame before the window fills");
    }

    let outcome = scheduler.tick(&mut delay, &mut sink).unwrap();
    assert_eq!(outcome, TickOutcome::Emitted);
    assert_eq!(scheduler.cycle(), 0, "counter resets after emit");
    assert_eq!(sink.frames.len(), 1, "exactly one frame per window");
}

#[test]
fn emit_cadence_is_stable_across_cycles() {
    let fault = FaultState::new();
    let diag = DiagStream::new();
    let (channels, _reads) = build_channels([BUTTON_UP_MIN; 3]);
    let mut scheduler = Scheduler::new(channels, &fault, &diag);
    let mut delay = CountingDelay { us_calls: 0 };
    let mut sink = VecSink { frames: vec![] };

    for _ in 0..SAMPLES * 5 {
        scheduler.tick(&mut delay, &mut sink).unwrap();
    }

    assert_eq!(sink.frames.len(), 5);
    assert_eq!(scheduler.cycle(), 0);
}

#[test]
fn each_stored_sample_costs_two_reads_and_two_settles() {
    let fault = FaultState::new();
    let diag = DiagStream::new();
    let (channels, reads) = build_channels([BUTTON_UP_MIN; 3]);
    let mut scheduler = Scheduler::new(channels, &fault, &diag);
    let mut delay = CountingDelay { us_calls: 0 };
    let mut sink = VecSink { frames: vec![] };

    for _ in 0..SAMPLES {
        scheduler.tick(&mut delay, &mut sink).unwrap();
    }

    // 3 channels * SAMPLES stored readings, each a throwaway + real read
    assert_eq!(reads.get(), (3 * SAMPLES * 2) as u32);
    assert_eq!(delay.us_calls, (3 * SAMPLES * 2) as u32);
}

#[test]
fn full_pipeline_produces_exact_frame_bytes() {
    let fault = FaultState::new();
    let diag = DiagStream::new();
    // ch0 at UP minimum, ch1 pressed at DOWN maximum, ch2 mid UP range
    let (channels, _reads) = build_channels([BUTTON_UP_MIN, BUTTON_DOWN_MAX, 30000]);
    let mut scheduler = Scheduler::new(channels, &fault, &diag);
    let mut delay = CountingDelay { us_calls: 0 };
    let mut sink = VecSink { frames: vec![] };

    for _ in 0..SAMPLES {
        scheduler.tick(&mut delay, &mut sink).unwrap();
    }

    // 30000 -> (30000-26650)/(38450-26650) * 6283 = 1783 = 0x06F7
    let expected = [
        192, // marker
        0x00, 0x00, 0x00, // ch0: up, intensity 0
        0x01, 0x18, 0x8B, // ch1: down, intensity 6283
        0x00, 0x06, 0xF7, // ch2: up, intensity 1783
    ];
    assert_eq!(sink.frames[0], expected);
}

#[test]
fn channel_order_in_frame_matches_sampling_order() {
    let fault = FaultState::new();
    let diag = DiagStream::new();
    let (channels, _reads) = build_channels([BUTTON_UP_MIN, BUTTON_DOWN_MAX, BUTTON_UP_MIN]);
    let mut scheduler = Scheduler::new(channels, &fault, &diag);
    let mut delay = CountingDelay { us_calls: 0 };
    let mut sink = VecSink { frames: vec![] };

    for _ in 0..SAMPLES * 3 {
        scheduler.tick(&mut delay, &mut sink).unwrap();
    }

    // Only the middle channel is DOWN, in every frame
    for frame in &sink.frames {
        assert_eq!(frame[1], 0x00);
        assert_eq!(frame[4], 0x01);
        assert_eq!(frame[7], 0x00);
    }
}

#[test]
fn faulted_run_reports_the_failing_pin() {
    struct FlakyAdc {
        remaining: u32,
    }

    impl AdcInput for FlakyAdc {
        fn read_raw(&mut self) -> Result<RawSample, FaultCode> {
            if self.remaining == 0 {
                return Err(FaultCode::AdcRead);
            }
            self.remaining -= 1;
            Ok(BUTTON_UP_MIN)
        }
    }

    let fault = FaultState::new();
    let diag = DiagStream::new();
    let mut pin_index = 0;
    // Second channel dies mid-window (after 8 reads = 4 stored samples)
    let channels = [40, 8, 40].map(|remaining| {
        let channel = Channel::new(FlakyAdc { remaining }, CHANNEL_PINS[pin_index]);
        pin_index += 1;
        channel
    });
    let mut scheduler = Scheduler::new(channels, &fault, &diag);
    let mut sink = VecSink { frames: vec![] };

    struct NoDelay;
    impl DelayTimer for NoDelay {
        fn delay_us(&mut self, _n: u32) {}
    }

    let code = scheduler.run(&mut NoDelay, &mut sink);
    assert_eq!(code, FaultCode::AdcRead);
    assert!(fault.is_active());
    assert_eq!(fault.data(), CHANNEL_PINS[1] as u32);
    assert!(sink.frames.is_empty(), "fault hit before the first frame");
    assert!(diag.has_entries(), "fault is reported on the diag stream");
}
