//! Wire format for emitted readings.
//!
//! One frame per sampling cycle:
//!
//! ```text
//! [marker:1] [state:1][intensity_hi:1][intensity_lo:1] × CHANNEL_COUNT
//! ```
//!
//! Intensity is big-endian u16. There is no length prefix, checksum or
//! escaping; consumers parse positionally from the channel count. A
//! consumer that loses sync has no resynchronization mechanism beyond
//! scanning for the marker, and the marker is not guaranteed absent from
//! payload bytes.

use crate::classify::{ButtonState, ChannelReading};
use crate::config::CHANNEL_COUNT;

/// Marker byte prefixing every frame, identifying it as reading data.
pub const MARKER: u8 = 192;

/// Encoded size of one channel: state byte + big-endian intensity.
pub const CHANNEL_BYTES: usize = 3;

/// Frame size for `channels` channels.
pub const fn frame_len(channels: usize) -> usize {
    1 + CHANNEL_BYTES * channels
}

/// Frame size for the configured channel count.
pub const FRAME_LEN: usize = frame_len(CHANNEL_COUNT);

/// Encode one channel reading into its 3 wire bytes.
#[inline]
pub fn encode_channel(reading: &ChannelReading) -> [u8; CHANNEL_BYTES] {
    let [hi, lo] = reading.intensity.to_be_bytes();
    [reading.state as u8, hi, lo]
}

/// Decode 3 wire bytes back into a reading.
///
/// Consumer-side helper. Returns `None` if the state byte is neither
/// UP (0) nor DOWN (1).
pub fn decode_channel(bytes: &[u8; CHANNEL_BYTES]) -> Option<ChannelReading> {
    let state = ButtonState::from_u8(bytes[0])?;
    let intensity = u16::from_be_bytes([bytes[1], bytes[2]]);
    Some(ChannelReading { state, intensity })
}

/// Encode a full frame into `out`, returning the bytes written.
///
/// Channel order in the frame is the order of `readings`; it must match
/// the sampling order so consumers can decode positionally.
///
/// # Panics
///
/// Panics if `out` is shorter than `frame_len(readings.len())`. The
/// scheduler always passes a buffer sized for [`MAX_CHANNELS`](crate::config::MAX_CHANNELS).
pub fn encode_frame(readings: &[ChannelReading], out: &mut [u8]) -> usize {
    let len = frame_len(readings.len());
    assert!(out.len() >= len, "frame buffer too small");

    out[0] = MARKER;
    for (i, reading) in readings.iter().enumerate() {
        let offset = 1 + i * CHANNEL_BYTES;
        out[offset..offset + CHANNEL_BYTES].copy_from_slice(&encode_channel(reading));
    }
    len
}
