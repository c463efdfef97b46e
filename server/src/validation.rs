use crate::error::ApiError;
use voice_core::SynthesisConfig;

/// Maximum text length for synthesis requests
const MAX_TEXT_LENGTH: usize = 5000;
/// Maximum accepted base64 payload size (roughly a 12 MB audio sample)
const MAX_AUDIO_BASE64_BYTES: usize = 16_000_000;
/// Mime types the analysis endpoint accepts
const ALLOWED_MIME_TYPES: &[&str] = &[
    "audio/webm",
    "audio/wav",
    "audio/x-wav",
    "audio/mpeg",
    "audio/mp4",
    "audio/ogg",
];

/// Validate a voice-sample analysis request
pub fn validate_analyze_request(audio_base64: &str, mime_type: &str) -> Result<(), ApiError> {
    if audio_base64.is_empty() {
        return Err(ApiError::InvalidInput(
            "Audio payload cannot be empty".to_string(),
        ));
    }
    if audio_base64.len() > MAX_AUDIO_BASE64_BYTES {
        return Err(ApiError::InvalidInput(format!(
            "Audio payload too large (max {} base64 bytes)",
            MAX_AUDIO_BASE64_BYTES
        )));
    }
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(ApiError::InvalidInput(format!(
            "Unsupported mime type: {}. Supported: {}",
            mime_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }
    Ok(())
}

/// Validate a speech synthesis request
pub fn validate_synthesize_request(text: &str, config: &SynthesisConfig) -> Result<(), ApiError> {
    if text.is_empty() {
        return Err(ApiError::InvalidInput("Text cannot be empty".to_string()));
    }
    if text.len() > MAX_TEXT_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Text too long (max {} characters)",
            MAX_TEXT_LENGTH
        )));
    }
    if !(0.25..=4.0).contains(&config.speed) {
        return Err(ApiError::InvalidInput(format!(
            "Speed out of range: {} (expected 0.25..4.0)",
            config.speed
        )));
    }
    if !(0.25..=4.0).contains(&config.pitch) {
        return Err(ApiError::InvalidInput(format!(
            "Pitch out of range: {} (expected 0.25..4.0)",
            config.pitch
        )));
    }
    Ok(())
}

/// Validate a raw PCM render request
pub fn validate_render_request(pcm_base64: &str) -> Result<(), ApiError> {
    if pcm_base64.is_empty() {
        return Err(ApiError::InvalidInput(
            "PCM payload cannot be empty".to_string(),
        ));
    }
    if pcm_base64.len() > MAX_AUDIO_BASE64_BYTES {
        return Err(ApiError::InvalidInput(format!(
            "PCM payload too large (max {} base64 bytes)",
            MAX_AUDIO_BASE64_BYTES
        )));
    }
    Ok(())
}
