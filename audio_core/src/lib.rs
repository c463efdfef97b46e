//! PCM-to-WAV codec pipeline: base64-encoded 16-bit PCM from a synthesis
//! backend in, canonical RIFF/WAVE bytes out.

mod error;
mod pcm;
mod transcode;
mod wav;

pub use error::AudioError;
pub use pcm::decode_pcm;
pub use transcode::{decode, encode};
pub use wav::encode_wav;

/// Sample rate of the raw PCM payloads returned by the Gemini TTS models.
pub const GEMINI_TTS_SAMPLE_RATE: u32 = 24_000;
/// The Gemini TTS models return mono audio.
pub const GEMINI_TTS_CHANNELS: u16 = 1;

/// In-memory audio: per-channel float samples in [-1.0, 1.0] at a fixed
/// sample rate. All channels hold the same number of frames.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from per-channel sample vectors.
    ///
    /// Fails with [`AudioError::InvalidParameter`] when the sample rate is
    /// zero, no channels are given, or the channels differ in length.
    pub fn from_channels(
        sample_rate: u32,
        channels: Vec<Vec<f32>>,
    ) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidParameter(
                "sample rate must be positive".into(),
            ));
        }
        if channels.is_empty() {
            return Err(AudioError::InvalidParameter(
                "at least one channel required".into(),
            ));
        }
        let frame_count = channels[0].len();
        if channels.iter().any(|c| c.len() != frame_count) {
            return Err(AudioError::InvalidParameter(
                "all channels must have the same length".into(),
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Samples per channel.
    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }
}

/// Full pipeline: base64 PCM payload -> raw bytes -> normalized audio
/// buffer -> WAV byte stream.
pub fn synthesize_to_wav(
    base64_pcm: &str,
    sample_rate: u32,
    channel_count: u16,
) -> Result<Vec<u8>, AudioError> {
    let bytes = decode(base64_pcm)?;
    let buffer = decode_pcm(&bytes, sample_rate, channel_count)?;
    Ok(encode_wav(&buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_produces_playable_wav() {
        // 4 mono samples as little-endian i16
        let pcm: Vec<u8> = [0i16, 16384, -16384, 32767]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let wav = synthesize_to_wav(&encode(&pcm), GEMINI_TTS_SAMPLE_RATE, GEMINI_TTS_CHANNELS)
            .unwrap();

        assert_eq!(wav.len(), 44 + 4 * 2);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(
            u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]),
            GEMINI_TTS_SAMPLE_RATE
        );
    }

    #[test]
    fn wav_data_round_trips_within_one_step() {
        let source: Vec<i16> = vec![-32768, -12345, -1, 0, 1, 9876, 32767];
        let pcm: Vec<u8> = source.iter().flat_map(|s| s.to_le_bytes()).collect();

        let buffer = decode_pcm(&pcm, 24_000, 1).unwrap();
        let wav = encode_wav(&buffer);
        let reencoded = decode_pcm(&wav[44..], 24_000, 1).unwrap();

        assert_eq!(reencoded.frame_count(), source.len());
        for (a, b) in buffer.channel(0).iter().zip(reencoded.channel(0)) {
            // asymmetric 32768/32767 scaling loses at most one step
            assert!((a - b).abs() <= 1.0 / 32767.0, "{a} vs {b}");
        }
    }

    #[test]
    fn pipeline_rejects_malformed_base64() {
        let result = synthesize_to_wav("not base64!!", 24_000, 1);
        assert!(matches!(result, Err(AudioError::InvalidEncoding(_))));
    }

    #[test]
    fn from_channels_rejects_ragged_input() {
        let result = AudioBuffer::from_channels(24_000, vec![vec![0.0; 3], vec![0.0; 2]]);
        assert!(matches!(result, Err(AudioError::InvalidParameter(_))));
    }
}
