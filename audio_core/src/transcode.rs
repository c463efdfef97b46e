use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::AudioError;

/// Encode a byte buffer as standard base64 (RFC 4648, `=` padding).
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 text back into bytes.
///
/// Fails with [`AudioError::InvalidEncoding`] on non-alphabet characters or
/// a malformed padding length.
pub fn decode(text: &str) -> Result<Vec<u8>, AudioError> {
    Ok(STANDARD.decode(text)?)
}
