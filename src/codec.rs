//! Base64 transport encoding for payloads crossing the JSON API.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use thiserror::Error;

/// Bytes encoded per step. A multiple of three, so every chunk but the last
/// encodes without padding and the concatenation equals a one-shot encode.
pub const ENCODE_CHUNK: usize = 3 * 10_922;

/// Standard alphabet. Decoding is as forgiving as browsers' `atob`: padding
/// is optional and non-zero trailing bits are ignored. Encoding always pads.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid base64")]
    InvalidEncoding,
}

pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(base64::encoded_len(bytes.len(), true).unwrap_or(0));
    for chunk in bytes.chunks(ENCODE_CHUNK) {
        ENGINE.encode_string(chunk, &mut out);
    }
    out
}

/// Decode client-supplied base64. Input must be made only of the base64
/// alphabet, `=` and whitespace; whitespace is dropped first.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    if !text.chars().all(is_base64_char) {
        return Err(CodecError::InvalidEncoding);
    }
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    ENGINE
        .decode(compact.as_bytes())
        .map_err(|_| CodecError::InvalidEncoding)
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=' || c.is_whitespace()
}
