//! Sampler entry point.
//!
//! On `target_os = "espidf"`: hardware bring-up (oneshot ADC channels,
//! UART frame output) and the forever sampling loop.
//!
//! On any other target: a simulation harness driving the identical
//! pipeline from a synthetic waveform, frames on stdout, diagnostics on
//! stderr. Useful for eyeballing the wire format and for soak runs
//! without hardware.

use std::io::Write as _;

use rust_adc_frame_sampler::config::{DEBUG_DEFAULT, FLAGS, LOOP_DELAY_MS};
use rust_adc_frame_sampler::hal::{AdcInput, DelayTimer, FrameSink};
use rust_adc_frame_sampler::logging::format_entry;
use rust_adc_frame_sampler::{FaultState, Scheduler, DIAG_STREAM};

/// Write any pending diagnostics to stderr.
fn drain_diag() {
    let mut line = [0u8; 160];
    while let Some(entry) = DIAG_STREAM.drain() {
        let len = format_entry(&entry, &mut line);
        let _ = std::io::stderr().write_all(&line[..len]);
    }
    let dropped = DIAG_STREAM.dropped();
    if dropped > 0 {
        eprintln!("[diag] dropped {} entries", dropped);
        DIAG_STREAM.reset_dropped();
    }
}

/// Tick the scheduler forever, draining diagnostics between iterations.
///
/// Never returns except through process exit on a fault.
fn serve<A: AdcInput, D: DelayTimer, S: FrameSink, const N: usize>(
    mut scheduler: Scheduler<'_, A, N>,
    mut delay: D,
    mut sink: S,
    fault: &FaultState,
) -> ! {
    loop {
        let result = scheduler.tick(&mut delay, &mut sink);
        drain_diag();
        if let Err(code) = result {
            let snapshot = fault.snapshot();
            eprintln!(
                "fatal fault: {:?} (data={}, count={})",
                code, snapshot.data, snapshot.count
            );
            std::process::exit(1);
        }
        delay.delay_ms(LOOP_DELAY_MS);
    }
}

fn main() {
    FLAGS.set_debug(DEBUG_DEFAULT);

    #[cfg(target_os = "espidf")]
    firmware::run();

    #[cfg(not(target_os = "espidf"))]
    host::run();
}

#[cfg(target_os = "espidf")]
mod firmware {
    use super::*;

    use esp_idf_svc::hal::adc::attenuation::DB_11;
    use esp_idf_svc::hal::adc::oneshot::config::AdcChannelConfig;
    use esp_idf_svc::hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
    use esp_idf_svc::hal::gpio;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{self, UartTxDriver};
    use esp_idf_svc::hal::units::Hertz;

    use rust_adc_frame_sampler::config::CHANNEL_PINS;
    use rust_adc_frame_sampler::hal::espidf::{EspAdcInput, EspDelay, UartFrameSink};
    use rust_adc_frame_sampler::Channel;

    static FAULT: FaultState = FaultState::new();

    pub fn run() -> ! {
        esp_idf_svc::sys::link_patches();

        // Bring-up failures are unrecoverable; nothing to sample without
        // the drivers.
        let peripherals = Peripherals::take().expect("peripherals already taken");
        let adc1 = AdcDriver::new(peripherals.adc1).expect("adc1 init failed");

        let adc_config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };

        // Three divider inputs on ADC1. CHANNEL_PINS carries the legacy
        // pin ids used in diagnostics and frame order.
        let channels = [
            Channel::new(
                EspAdcInput::new(
                    AdcChannelDriver::new(&adc1, peripherals.pins.gpio1, &adc_config)
                        .expect("adc channel init failed"),
                ),
                CHANNEL_PINS[0],
            ),
            Channel::new(
                EspAdcInput::new(
                    AdcChannelDriver::new(&adc1, peripherals.pins.gpio2, &adc_config)
                        .expect("adc channel init failed"),
                ),
                CHANNEL_PINS[1],
            ),
            Channel::new(
                EspAdcInput::new(
                    AdcChannelDriver::new(&adc1, peripherals.pins.gpio3, &adc_config)
                        .expect("adc channel init failed"),
                ),
                CHANNEL_PINS[2],
            ),
        ];

        // Frames go out TX-only on UART1; diagnostics stay on the console.
        let uart_config = uart::config::Config::default().baudrate(Hertz(115_200));
        let uart = UartTxDriver::new(
            peripherals.uart1,
            peripherals.pins.gpio17,
            Option::<gpio::AnyIOPin>::None, // CTS
            Option::<gpio::AnyIOPin>::None, // RTS
            &uart_config,
        )
        .expect("uart init failed");

        let scheduler = Scheduler::new(channels, &FAULT, &DIAG_STREAM);
        serve(scheduler, EspDelay, UartFrameSink::new(uart), &FAULT)
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use super::*;

    use rust_adc_frame_sampler::config::{
        BUTTON_DOWN_MAX, BUTTON_DOWN_MIN, BUTTON_UP_MAX, BUTTON_UP_MIN, CHANNEL_PINS,
    };
    use rust_adc_frame_sampler::sample::RawSample;
    use rust_adc_frame_sampler::{Channel, FaultCode};

    static FAULT: FaultState = FaultState::new();

    /// Synthetic divider waveform: a slow triangle sweep through the
    /// button-up range, dipping into the button-down range on a fixed
    /// period so both states show up in the output.
    struct SimAdc {
        step: u32,
        phase: u32,
    }

    impl SimAdc {
        fn new(phase: u32) -> Self {
            Self { step: 0, phase }
        }
    }

    impl AdcInput for SimAdc {
        fn read_raw(&mut self) -> Result<RawSample, FaultCode> {
            self.step = self.step.wrapping_add(1);
            let t = (self.step / 2).wrapping_add(self.phase) % 2000;

            // Every fourth period: pressed, sweeping the down range
            if t >= 1500 {
                let span = (BUTTON_DOWN_MAX - BUTTON_DOWN_MIN) as u32;
                return Ok((BUTTON_DOWN_MIN as u32 + (t - 1500) * span / 500) as RawSample);
            }

            let span = (BUTTON_UP_MAX - BUTTON_UP_MIN) as u32;
            let up = if t < 750 { t } else { 1500 - t };
            Ok((BUTTON_UP_MIN as u32 + up * span / 750) as RawSample)
        }
    }

    struct SleepDelay;

    impl DelayTimer for SleepDelay {
        fn delay_us(&mut self, n: u32) {
            std::thread::sleep(std::time::Duration::from_micros(n as u64));
        }
    }

    struct StdoutSink;

    impl FrameSink for StdoutSink {
        fn write_all(&mut self, bytes: &[u8]) -> Result<(), FaultCode> {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|_| stdout.flush())
                .map_err(|_| FaultCode::SinkWrite)
        }
    }

    pub fn run() -> ! {
        let mut phase = 0;
        let channels = CHANNEL_PINS.map(|pin| {
            phase += 600;
            Channel::new(SimAdc::new(phase), pin)
        });

        let scheduler = Scheduler::new(channels, &FAULT, &DIAG_STREAM);
        serve(scheduler, SleepDelay, StdoutSink, &FAULT)
    }
}
