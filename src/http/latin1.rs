//! ISO-8859-1 text conversion.
//!
//! Every byte maps to exactly one `char` (U+0000..=U+00FF), so decoding
//! never fails on arbitrary input and `encode(&decode(b)) == b` for any `b`.
//! Multi-byte text is not interpreted.

pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Characters outside the Latin-1 range become `?`.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
