//! ESP-IDF implementations of the HAL seams.
//!
//! Thin wrappers only: oneshot ADC reads, Ets/FreeRTOS delays, UART TX
//! for frame output. All fallible driver calls map onto [`FaultCode`].

use esp_idf_svc::hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_svc::hal::adc::ADCPin;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::uart::UartTxDriver;

use crate::fault::FaultCode;
use crate::hal::{AdcInput, DelayTimer, FrameSink};
use crate::sample::RawSample;

/// One configured oneshot ADC channel.
pub struct EspAdcInput<'d, T: ADCPin> {
    channel: AdcChannelDriver<'d, T, &'d AdcDriver<'d, T::Adc>>,
}

impl<'d, T: ADCPin> EspAdcInput<'d, T> {
    pub fn new(channel: AdcChannelDriver<'d, T, &'d AdcDriver<'d, T::Adc>>) -> Self {
        Self { channel }
    }
}

impl<'d, T: ADCPin> AdcInput for EspAdcInput<'d, T> {
    fn read_raw(&mut self) -> Result<RawSample, FaultCode> {
        self.channel.read_raw().map_err(|_| FaultCode::AdcRead)
    }
}

/// Delay provider over the ESP-IDF primitives.
///
/// Microsecond waits busy-spin via `ets_delay_us` (a FreeRTOS tick is far
/// too coarse for the 100 µs settle time); millisecond waits yield to the
/// RTOS scheduler.
pub struct EspDelay;

impl DelayTimer for EspDelay {
    fn delay_us(&mut self, n: u32) {
        Ets::delay_us(n);
    }

    fn delay_ms(&mut self, n: u32) {
        FreeRtos::delay_ms(n);
    }
}

/// Frame sink over a UART TX driver.
pub struct UartFrameSink<'d> {
    uart: UartTxDriver<'d>,
}

impl<'d> UartFrameSink<'d> {
    pub fn new(uart: UartTxDriver<'d>) -> Self {
        Self { uart }
    }
}

impl<'d> FrameSink for UartFrameSink<'d> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), FaultCode> {
        let mut written = 0;
        while written < bytes.len() {
            match self.uart.write(&bytes[written..]) {
                Ok(0) | Err(_) => return Err(FaultCode::SinkWrite),
                Ok(n) => written += n,
            }
        }
        Ok(())
    }
}
