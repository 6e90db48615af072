//! Compression support
//!
//! Structure files are often served gzip-compressed without a matching
//! `Content-Encoding`; bodies are inflated transparently before decoding.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::{IoError, IoResult};

/// Check for the gzip magic bytes
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

/// Decode a response or file body to text
///
/// Gzip bodies are inflated first. Invalid UTF-8 is replaced rather than
/// rejected; the sanitizer and parsers only care about ASCII columns.
pub fn decode_text(bytes: &[u8]) -> IoResult<String> {
    if is_gzip(bytes) {
        let mut inflated = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut inflated)
            .map_err(|e| IoError::Decompression(e.to_string()))?;
        return Ok(String::from_utf8_lossy(&inflated).into_owned());
    }
    Ok(String::from_utf8_lossy(bytes).into_owned())
}
