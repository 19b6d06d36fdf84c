//! Window classification: majority vote, average, normalized intensity.
//!
//! Pure logic, no hardware dependencies. Consumes a full sample window,
//! produces one [`ChannelReading`]. Fully testable on host.
//!
//! # Algorithm
//!
//! 1. Partition the window at [`THRESHOLD`] into up/down readings,
//!    accumulating count and running sum per partition in a single pass
//!    (no intermediate lists, no allocation).
//! 2. Majority vote picks the state; a tie favors UP.
//! 3. The winning partition's mean is normalized into [0, 1] against that
//!    state's calibration range, clamped, and scaled to 0..=[`TAUSEND`].

use crate::config::{
    BUTTON_DOWN_MAX, BUTTON_DOWN_MIN, BUTTON_UP_MAX, BUTTON_UP_MIN, TAUSEND, THRESHOLD,
};
use crate::sample::RawSample;

/// Logical button state of a channel.
///
/// The discriminant is the wire encoding (frame state byte).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ButtonState {
    /// Readings in the upper voltage range: button released.
    Up = 0,
    /// Readings in the lower voltage range: button pressed.
    Down = 1,
}

impl ButtonState {
    /// Convert from the wire state byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ButtonState::Up),
            1 => Some(ButtonState::Down),
            _ => None,
        }
    }
}

/// Calibrated raw-reading bounds for one button state.
///
/// Fixed at compile time, never mutated at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationRange {
    pub min: u16,
    pub max: u16,
}

impl CalibrationRange {
    /// Create a range. `min` must be strictly below `max`.
    pub const fn new(min: u16, max: u16) -> Self {
        assert!(min < max, "calibration range must be non-degenerate");
        Self { min, max }
    }

    /// Map an averaged reading into the unit interval, clamped.
    ///
    /// Averages outside the calibrated bounds saturate to 0.0 or 1.0;
    /// noise and off-spec hardware must not escape the interval.
    #[inline]
    pub fn normalize(&self, avg: f32) -> f32 {
        let span = (self.max - self.min) as f32;
        ((avg - self.min as f32) / span).clamp(0.0, 1.0)
    }
}

/// Calibration for both states of one channel.
///
/// The ranges are distinct and asymmetric: pressing the button loads the
/// divider and shifts the whole readable range low.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calibration {
    pub up: CalibrationRange,
    pub down: CalibrationRange,
}

impl Calibration {
    /// Range belonging to `state`.
    #[inline]
    pub fn range(&self, state: ButtonState) -> &CalibrationRange {
        match state {
            ButtonState::Up => &self.up,
            ButtonState::Down => &self.down,
        }
    }
}

/// Default calibration from the measured button ranges.
pub const CALIBRATION: Calibration = Calibration {
    up: CalibrationRange::new(BUTTON_UP_MIN, BUTTON_UP_MAX),
    down: CalibrationRange::new(BUTTON_DOWN_MIN, BUTTON_DOWN_MAX),
};

/// Classification result for one channel, one window.
///
/// Created fresh each emit cycle, encoded, then discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelReading {
    pub state: ButtonState,
    /// Normalized magnitude in 0..=[`TAUSEND`].
    pub intensity: u16,
}

impl ChannelReading {
    /// Neutral reading: button up, zero intensity.
    ///
    /// Also the fallback for the degenerate empty-partition case.
    pub const IDLE: Self = Self {
        state: ButtonState::Up,
        intensity: 0,
    };
}

/// Classify a full sample window into a [`ChannelReading`].
///
/// Pure and deterministic. A tie in the majority vote selects UP.
///
/// The empty-partition average (division by zero) is unreachable for a
/// non-empty window under the tie rule, but an empty `window` would hit
/// it; that case returns [`ChannelReading::IDLE`] instead of dividing.
pub fn classify(window: &[RawSample], cal: &Calibration) -> ChannelReading {
    let mut up_count: u32 = 0;
    let mut up_sum: u32 = 0;
    let mut down_count: u32 = 0;
    let mut down_sum: u32 = 0;

    for &raw in window {
        if raw >= THRESHOLD {
            up_count += 1;
            up_sum += raw as u32;
        } else {
            down_count += 1;
            down_sum += raw as u32;
        }
    }

    let (state, count, sum) = if up_count >= down_count {
        (ButtonState::Up, up_count, up_sum)
    } else {
        (ButtonState::Down, down_count, down_sum)
    };

    if count == 0 {
        return ChannelReading::IDLE;
    }

    let avg = sum as f32 / count as f32;
    let unit = cal.range(state).normalize(avg);
    // Truncation is the intended floor: unit is non-negative and <= 1.0.
    let intensity = (unit * TAUSEND as f32) as u16;

    ChannelReading { state, intensity }
}
