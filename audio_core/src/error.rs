use thiserror::Error;

/// Errors produced by the audio codec pipeline.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("invalid base64 audio payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
