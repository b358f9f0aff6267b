//! Table-driven CRC-32 (IEEE 802.3, reflected)
//!
//! Polynomial `0xEDB88320` (bit-reversed `0x04C11DB7`), initial value
//! `0xFFFFFFFF`, final complement. This is the checksum used by zlib, PNG
//! and most MCU bootloaders.
//!
//! # Example
//!
//! ```
//! use mcucalc::core::crc32::{checksum, crc32, Crc32, InputMode};
//!
//! assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
//!
//! let mut hasher = Crc32::new();
//! hasher.update(b"1234");
//! hasher.update(b"56789");
//! assert_eq!(hasher.finalize(), 0xCBF4_3926);
//!
//! let result = checksum("31 32 33 34 35 36 37 38 39", InputMode::Hex).unwrap();
//! assert_eq!(result.hex, "CBF43926");
//! ```

use crate::core::error::{Error, Result};
use crate::validators::{check_input_len, decode_hex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Reflected form of the IEEE 802.3 polynomial
pub const POLYNOMIAL: u32 = 0xEDB8_8320;

const INITIAL: u32 = 0xFFFF_FFFF;

static TABLE: OnceLock<[u32; 256]> = OnceLock::new();

/// Returns the 256-entry lookup table, building it on first use.
///
/// `OnceLock` guarantees a single construction even when the first callers
/// race; every later call is a plain read.
pub fn table() -> &'static [u32; 256] {
    TABLE.get_or_init(|| {
        tracing::trace!("Building CRC-32 lookup table");
        let mut table = [0u32; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut crc = i as u32;
            for _ in 0..8 {
                crc = if crc & 1 == 1 {
                    POLYNOMIAL ^ (crc >> 1)
                } else {
                    crc >> 1
                };
            }
            *entry = crc;
        }
        table
    })
}

/// Computes the CRC-32 of `data` in one shot.
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(data);
    hasher.finalize()
}

/// Incremental CRC-32 for data that arrives in chunks.
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self { state: INITIAL }
    }

    pub fn update(&mut self, data: &[u8]) {
        let table = table();
        self.state = data.iter().fold(self.state, |crc, &byte| {
            (crc >> 8) ^ table[((crc ^ u32::from(byte)) & 0xFF) as usize]
        });
    }

    /// Returns the checksum of everything fed so far.
    ///
    /// The hasher is left untouched and can keep accepting data.
    pub fn finalize(&self) -> u32 {
        !self.state
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// How checksum input text is turned into bytes
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum InputMode {
    /// UTF-8 bytes of the text as typed
    #[default]
    #[strum(serialize = "text")]
    Text,
    /// Hex byte pairs, whitespace ignored
    #[strum(serialize = "hex")]
    Hex,
}

/// CRC-32 result with its display form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crc32Checksum {
    pub value: u32,
    /// Eight uppercase hex digits, zero padded
    pub hex: String,
    /// Number of bytes that were hashed
    pub byte_len: usize,
    pub mode: InputMode,
}

impl Crc32Checksum {
    fn new(value: u32, byte_len: usize, mode: InputMode) -> Self {
        Self {
            value,
            hex: format_crc(value),
            byte_len,
            mode,
        }
    }
}

/// Renders a checksum as 8 uppercase hex digits.
pub fn format_crc(value: u32) -> String {
    format!("{value:08X}")
}

/// Computes the CRC-32 of text or hex input.
///
/// Text mode hashes the UTF-8 bytes exactly as given, surrounding whitespace
/// included. Hex mode strips all whitespace and decodes byte pairs.
///
/// # Errors
///
/// - [`Error::EmptyInput`] if the input is blank
/// - [`Error::InvalidHexFormat`] for malformed hex in [`InputMode::Hex`]
/// - [`Error::InputTooLong`] past the input size cap
pub fn checksum(input: &str, mode: InputMode) -> Result<Crc32Checksum> {
    check_input_len(input)?;
    if input.trim().is_empty() {
        return Err(Error::EmptyInput);
    }

    let result = match mode {
        InputMode::Text => {
            let bytes = input.as_bytes();
            Crc32Checksum::new(crc32(bytes), bytes.len(), mode)
        }
        InputMode::Hex => {
            let bytes = decode_hex(input)?;
            Crc32Checksum::new(crc32(&bytes), bytes.len(), mode)
        }
    };

    tracing::debug!(
        "CRC-32 over {} bytes ({}): {}",
        result.byte_len,
        mode,
        result.hex
    );
    Ok(result)
}
