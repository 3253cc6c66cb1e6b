use base64::{Engine as _, engine::general_purpose::STANDARD as B64};

/// Decode base64 element text. Line breaks and other ASCII whitespace are allowed
/// anywhere, as produced by line-wrapping encoders.
pub(crate) fn decode_base64_xml(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    if s.bytes().any(|b| b.is_ascii_whitespace()) {
        let cleaned: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        B64.decode(cleaned)
    } else {
        B64.decode(s)
    }
}

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    B64.encode(bytes)
}
