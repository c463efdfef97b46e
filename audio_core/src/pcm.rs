use crate::error::AudioError;
use crate::AudioBuffer;

/// Interpret raw bytes as interleaved signed 16-bit little-endian PCM and
/// split them into per-channel float samples normalized by 1/32768.
///
/// Trailing bytes that do not form a complete interleaved frame are dropped
/// without error; the positive peak 32767 maps to slightly less than +1.0,
/// matching the encoder's inverse scaling.
pub fn decode_pcm(
    bytes: &[u8],
    sample_rate: u32,
    channel_count: u16,
) -> Result<AudioBuffer, AudioError> {
    if sample_rate == 0 {
        return Err(AudioError::InvalidParameter(
            "sample rate must be positive".into(),
        ));
    }
    if channel_count == 0 {
        return Err(AudioError::InvalidParameter(
            "channel count must be positive".into(),
        ));
    }

    let channel_count = channel_count as usize;
    let sample_count = bytes.len() / 2;
    let frame_count = sample_count / channel_count;

    let dropped = bytes.len() - frame_count * channel_count * 2;
    if dropped > 0 {
        tracing::debug!(
            dropped_bytes = dropped,
            "PCM payload ends mid-frame; trailing bytes discarded"
        );
    }

    let mut channels = vec![Vec::with_capacity(frame_count); channel_count];
    for frame in 0..frame_count {
        for (c, channel) in channels.iter_mut().enumerate() {
            let at = (frame * channel_count + c) * 2;
            let sample = i16::from_le_bytes([bytes[at], bytes[at + 1]]);
            channel.push(sample as f32 / 32768.0);
        }
    }

    AudioBuffer::from_channels(sample_rate, channels)
}
