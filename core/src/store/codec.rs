//! Passage text codec: raw DEFLATE, no header, no preset dictionary.
//!
//! Compression only ever runs offline in the pack writer; the device only
//! inflates.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use miniz_oxide::inflate::decompress_to_vec_with_limit;

/// Extra room given to the inflater beyond the expected length so that an
/// over-long stream is reported as a length mismatch instead of a limit hit.
pub const DECODE_HEADROOM: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The compressed stream is malformed or ends early.
    Stream,
    /// The stream inflated to a different length than recorded.
    Length { expected: usize, actual: usize },
    /// The inflated bytes are not valid UTF-8.
    Utf8,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Stream => write!(f, "malformed compressed stream"),
            CodecError::Length { expected, actual } => {
                write!(f, "inflated to {actual} bytes, expected {expected}")
            }
            CodecError::Utf8 => write!(f, "inflated text is not utf-8"),
        }
    }
}

/// Inflates `compressed` into exactly `decoded_len` bytes of text.
///
/// A trailing NUL terminator is dropped after the length check.
pub fn inflate(compressed: &[u8], decoded_len: usize) -> Result<String, CodecError> {
    let mut bytes = decompress_to_vec_with_limit(compressed, decoded_len + DECODE_HEADROOM)
        .map_err(|_| CodecError::Stream)?;
    if bytes.len() != decoded_len {
        return Err(CodecError::Length {
            expected: decoded_len,
            actual: bytes.len(),
        });
    }
    if bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8(bytes).map_err(|_| CodecError::Utf8)
}

/// Offline only: compresses passage text for the pack writer.
pub fn deflate(text: &str, level: u8) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec(text.as_bytes(), level)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSE: &str = "For God so loved the world, that he gave his only begotten Son, \
        that whosoever believeth in him should not perish, but have everlasting life.";

    #[test]
    fn inflate_returns_exact_length() {
        let packed = deflate(VERSE, 9);
        let text = inflate(&packed, VERSE.len()).unwrap();
        assert_eq!(text, VERSE);
        assert_eq!(text.len(), VERSE.len());
    }

    #[test]
    fn nul_terminator_is_stripped() {
        let mut with_nul = String::from("Jesus wept.");
        with_nul.push('\0');
        let packed = deflate(&with_nul, 6);
        assert_eq!(inflate(&packed, with_nul.len()).unwrap(), "Jesus wept.");
    }

    #[test]
    fn only_one_terminator_is_stripped() {
        let text = "Jesus wept.\0\0";
        let packed = deflate(text, 6);
        assert_eq!(inflate(&packed, text.len()).unwrap(), "Jesus wept.\0");
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let packed = deflate(VERSE, 9);
        assert_eq!(
            inflate(&packed, VERSE.len() - 1),
            Err(CodecError::Length {
                expected: VERSE.len() - 1,
                actual: VERSE.len(),
            })
        );
        assert!(inflate(&packed, VERSE.len() + 20).is_err());
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let packed = deflate(VERSE, 9);
        let cut = &packed[..packed.len() / 2];
        assert_eq!(inflate(cut, VERSE.len()), Err(CodecError::Stream));
    }
}
