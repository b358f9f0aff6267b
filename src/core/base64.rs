//! Standard Base64 (RFC 4648 alphabet, `=` padding, no line wrapping)
//!
//! Decoding is strict about the alphabet and never substitutes replacement
//! characters: bytes that are not UTF-8 are reported as
//! [`Error::InvalidUtf8`], separately from [`Error::InvalidAlphabet`].
//!
//! # Example
//!
//! ```
//! use mcucalc::core::base64::{decode, encode};
//!
//! let encoded = encode("你好, world");
//! assert_eq!(encoded, "5L2g5aW9LCB3b3JsZA==");
//! assert_eq!(decode(&encoded).unwrap(), "你好, world");
//! ```

use crate::core::error::{Error, Result};
use crate::validators::check_input_len;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PAD: u8 = b'=';

/// Encodes the UTF-8 bytes of `text`.
pub fn encode(text: &str) -> String {
    encode_bytes(text.as_bytes())
}

/// Encodes raw bytes, 3 bytes to 4 characters.
pub fn encode_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied().unwrap_or(0);
        let b2 = chunk.get(2).copied().unwrap_or(0);
        let group = (u32::from(b0) << 16) | (u32::from(b1) << 8) | u32::from(b2);

        out.push(sextet(group, 18));
        out.push(sextet(group, 12));
        out.push(if chunk.len() > 1 {
            sextet(group, 6)
        } else {
            PAD as char
        });
        out.push(if chunk.len() > 2 {
            sextet(group, 0)
        } else {
            PAD as char
        });
    }

    out
}

fn sextet(group: u32, shift: u32) -> char {
    ALPHABET[((group >> shift) & 0x3F) as usize] as char
}

fn alphabet_value(b: u8) -> Option<u8> {
    match b {
        b'A'..=b'Z' => Some(b - b'A'),
        b'a'..=b'z' => Some(b - b'a' + 26),
        b'0'..=b'9' => Some(b - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Checks that every character is in `[A-Za-z0-9+/=]`.
///
/// # Errors
///
/// Returns [`Error::InvalidAlphabet`] with the first offending character and
/// its character (not byte) position.
pub fn validate_alphabet(input: &str) -> Result<()> {
    match input
        .chars()
        .enumerate()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')))
    {
        Some((position, character)) => Err(Error::InvalidAlphabet {
            character,
            position,
        }),
        None => Ok(()),
    }
}

/// Decodes Base64 to raw bytes.
///
/// Follows forgiving browser decoding: when the length is a multiple of 4,
/// up to two trailing `=` are dropped; unpadded input is accepted; leftover
/// bits in the final character are ignored.
///
/// # Errors
///
/// - [`Error::InvalidAlphabet`] for characters outside the alphabet
/// - [`Error::MalformedBase64`] for misplaced padding or an impossible length
pub fn decode_bytes(input: &str) -> Result<Vec<u8>> {
    check_input_len(input)?;
    validate_alphabet(input)?;

    let mut body = input.as_bytes();
    if body.len().is_multiple_of(4) {
        for _ in 0..2 {
            if let Some((&PAD, rest)) = body.split_last() {
                body = rest;
            }
        }
    }

    if body.len() % 4 == 1 || body.contains(&PAD) {
        return Err(Error::MalformedBase64);
    }

    let mut out = Vec::with_capacity(body.len() * 3 / 4);
    let mut buffer = 0u32;
    let mut bits = 0u32;

    for &b in body {
        let value = alphabet_value(b).ok_or(Error::MalformedBase64)?;
        buffer = (buffer << 6) | u32::from(value);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }

    Ok(out)
}

/// Decodes Base64 to text.
///
/// # Errors
///
/// Everything [`decode_bytes`] reports, plus [`Error::InvalidUtf8`] when the
/// decoded bytes are not UTF-8.
pub fn decode(input: &str) -> Result<String> {
    let bytes = decode_bytes(input)?;
    let text = String::from_utf8(bytes)?;
    tracing::debug!("Decoded {} Base64 characters to {} bytes", input.len(), text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4648_vectors() {
        let vectors = [
            ("", ""),
            ("f", "Zg=="),
            ("fo", "Zm8="),
            ("foo", "Zm9v"),
            ("foob", "Zm9vYg=="),
            ("fooba", "Zm9vYmE="),
            ("foobar", "Zm9vYmFy"),
        ];
        for (plain, encoded) in vectors {
            assert_eq!(encode(plain), encoded);
            assert_eq!(decode(encoded).unwrap(), plain);
        }
    }

    #[test]
    fn test_utf8_text() {
        assert_eq!(encode("héllo"), "aMOpbGxv");
        assert_eq!(decode("aMOpbGxv").unwrap(), "héllo");
    }

    #[test]
    fn test_high_bit_bytes() {
        assert_eq!(encode_bytes(&[0xFF, 0xFE, 0xFD]), "//79");
        assert_eq!(decode_bytes("//79").unwrap(), vec![0xFF, 0xFE, 0xFD]);
        assert_eq!(encode_bytes(&[0xFB, 0xFF]), "+/8=");
    }

    #[test]
    fn test_invalid_alphabet_reports_position() {
        assert_eq!(
            decode("Zm9v!"),
            Err(Error::InvalidAlphabet {
                character: '!',
                position: 4
            })
        );
        assert_eq!(
            decode("Zm 9v"),
            Err(Error::InvalidAlphabet {
                character: ' ',
                position: 2
            })
        );
        assert_eq!(
            decode("é"),
            Err(Error::InvalidAlphabet {
                character: 'é',
                position: 0
            })
        );
    }

    #[test]
    fn test_alphabet_checked_before_structure() {
        // Bad length and a bad character: the character wins
        assert!(matches!(
            decode("Z-"),
            Err(Error::InvalidAlphabet { character: '-', .. })
        ));
    }

    #[test]
    fn test_unpadded_input() {
        assert_eq!(decode("Zg").unwrap(), "f");
        assert_eq!(decode("Zm8").unwrap(), "fo");
    }

    #[test]
    fn test_malformed_padding() {
        assert_eq!(decode("Zg=a"), Err(Error::MalformedBase64));
        assert_eq!(decode("Z==="), Err(Error::MalformedBase64));
        assert_eq!(decode("Zg="), Err(Error::MalformedBase64));
        assert_eq!(decode("="), Err(Error::MalformedBase64));
    }

    #[test]
    fn test_impossible_length() {
        assert_eq!(decode("Zm9vY"), Err(Error::MalformedBase64));
    }

    #[test]
    fn test_invalid_utf8_is_distinct() {
        // 0xFF 0xFE is not UTF-8
        let result = decode("//4=");
        assert_eq!(result, Err(Error::InvalidUtf8 { valid_up_to: 0 }));
    }

    #[test]
    fn test_empty_decodes_to_empty() {
        assert_eq!(decode("").unwrap(), "");
    }

    #[test]
    fn test_trailing_bits_ignored() {
        assert_eq!(decode("Zh==").unwrap(), "f");
    }
}
