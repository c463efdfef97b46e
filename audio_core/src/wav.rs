use crate::AudioBuffer;

/// Serialize an audio buffer as a canonical 16-bit PCM WAV (RIFF) byte
/// stream: a 44-byte header followed by interleaved little-endian samples.
pub fn encode_wav(buffer: &AudioBuffer) -> Vec<u8> {
    let num_channels = buffer.channel_count();
    let sample_rate = buffer.sample_rate();
    let frame_count = buffer.frame_count();
    let bits_per_sample: u16 = 16;
    let byte_rate: u32 = sample_rate * num_channels as u32 * (bits_per_sample as u32 / 8);
    let block_align: u16 = num_channels * (bits_per_sample / 8);
    let data_size: u32 = (frame_count * num_channels as usize * 2) as u32;
    let riff_size: u32 = 36 + data_size;

    let mut out = Vec::<u8>::with_capacity(44 + data_size as usize);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());

    // Interleaved samples, frame-major
    for frame in 0..frame_count {
        for channel in buffer.channels() {
            out.extend_from_slice(&quantize(channel[frame]).to_le_bytes());
        }
    }

    out
}

/// Clamp to [-1, 1] and scale to i16. The scale is asymmetric (32768 on the
/// negative side, 32767 on the positive) to mirror the decoder's /32768
/// normalization; -1.0 lands exactly on i16::MIN and +1.0 on i16::MAX.
fn quantize(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0).round() as i16
    } else {
        (clamped * 32767.0).round() as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn silence(sample_rate: u32, channels: usize, frames: usize) -> AudioBuffer {
        AudioBuffer::from_channels(sample_rate, vec![vec![0.0; frames]; channels]).unwrap()
    }

    #[test]
    fn output_length_is_header_plus_data() {
        let wav = encode_wav(&silence(24_000, 1, 10));
        assert_eq!(wav.len(), 44 + 10 * 1 * 2);

        let wav = encode_wav(&silence(48_000, 2, 7));
        assert_eq!(wav.len(), 44 + 7 * 2 * 2);
    }

    #[test]
    fn header_fields_of_mono_24khz_buffer() {
        let wav = encode_wav(&silence(24_000, 1, 10));

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), wav.len() as u32 - 8);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1); // PCM
        assert_eq!(u16_at(&wav, 22), 1); // channels
        assert_eq!(u32_at(&wav, 24), 24_000);
        assert_eq!(u32_at(&wav, 28), 24_000 * 2); // byte rate
        assert_eq!(u16_at(&wav, 32), 2); // block align
        assert_eq!(u16_at(&wav, 34), 16); // bits per sample
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 20); // 10 frames * 1 channel * 2 bytes
    }

    #[test]
    fn quantization_boundaries() {
        assert_eq!(quantize(1.0), 32767);
        assert_eq!(quantize(-1.0), -32768);
        assert_eq!(quantize(0.0), 0);
        // out-of-range input clamps rather than wrapping
        assert_eq!(quantize(2.5), 32767);
        assert_eq!(quantize(-3.0), -32768);
    }

    #[test]
    fn writes_frames_interleaved() {
        let buffer = AudioBuffer::from_channels(
            8_000,
            vec![vec![0.25, 0.5], vec![-0.25, -0.5]],
        )
        .unwrap();
        let wav = encode_wav(&buffer);

        let sample = |n: usize| i16::from_le_bytes([wav[44 + n * 2], wav[44 + n * 2 + 1]]);
        assert_eq!(sample(0), (0.25f32 * 32767.0).round() as i16);
        assert_eq!(sample(1), (-0.25f32 * 32768.0).round() as i16);
        assert_eq!(sample(2), (0.5f32 * 32767.0).round() as i16);
        assert_eq!(sample(3), (-0.5f32 * 32768.0).round() as i16);
    }
}
