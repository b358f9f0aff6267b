//! Memory and storage size conversion
//!
//! Converts a size in one unit (or an inclusive register address range)
//! into bits, bytes and binary kilo/mega/gigabytes (1 KB = 1024 B).
//!
//! # Example
//!
//! ```
//! use mcucalc::core::storage::{convert, StorageUnit};
//!
//! let flash = convert("0x0000-0x4000", StorageUnit::Register).unwrap();
//! assert_eq!(flash.bytes, 16385);
//!
//! let page = convert("1.5", StorageUnit::Kilobyte).unwrap();
//! assert_eq!(page.bytes, 1536);
//! ```

use crate::core::error::{Error, Result};
use crate::validators::{Decimal, parse_digits, require_non_empty};
use serde::{Deserialize, Serialize};

/// Smallest scaled value that is still reported
const MIN_REPORTED: f64 = 0.001;

/// Input unit
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
pub enum StorageUnit {
    /// Register/memory map input: a byte count or an address range
    #[default]
    #[strum(to_string = "register", serialize = "reg")]
    Register,
    #[strum(to_string = "b", serialize = "bit")]
    Bit,
    #[strum(to_string = "B", serialize = "byte")]
    Byte,
    #[strum(serialize = "KB")]
    Kilobyte,
    #[strum(serialize = "MB")]
    Megabyte,
    #[strum(serialize = "GB")]
    Gigabyte,
}

impl StorageUnit {
    /// Bytes per unit as `numerator / denominator`.
    const fn byte_ratio(self) -> (u128, u128) {
        match self {
            StorageUnit::Bit => (1, 8),
            StorageUnit::Register | StorageUnit::Byte => (1, 1),
            StorageUnit::Kilobyte => (1 << 10, 1),
            StorageUnit::Megabyte => (1 << 20, 1),
            StorageUnit::Gigabyte => (1 << 30, 1),
        }
    }
}

/// Inclusive memory range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressRange {
    pub start: u64,
    pub end: u64,
}

impl AddressRange {
    /// Creates a range, rejecting `end < start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`].
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of bytes, both endpoints included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MagnitudeOutOfRange`] for the full 64-bit address space.
    pub fn size(&self) -> Result<u64> {
        (self.end - self.start)
            .checked_add(1)
            .ok_or(Error::MagnitudeOutOfRange)
    }
}

/// A size expressed in every supported unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageSize {
    pub bytes: u64,
    pub bits: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kilobytes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub megabytes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gigabytes: Option<f64>,
    /// Set when the input was an address range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<AddressRange>,
}

impl StorageSize {
    pub fn from_bytes(bytes: u64) -> Self {
        Self::with_exact_bytes(bytes, bytes as f64)
    }

    /// Builds a size whose KB/MB/GB values come from `exact_bytes`, which may
    /// be fractional, while `bytes` and `bits` stay whole.
    pub fn with_exact_bytes(bytes: u64, exact_bytes: f64) -> Self {
        let reported = |value: f64| (value >= MIN_REPORTED).then_some(value);
        let kb = exact_bytes / 1024.0;
        let mb = kb / 1024.0;
        let gb = mb / 1024.0;

        Self {
            bytes,
            bits: u128::from(bytes) * 8,
            kilobytes: reported(kb),
            megabytes: reported(mb),
            gigabytes: reported(gb),
            range: None,
        }
    }
}

/// Formats a KB/MB/GB value: no decimals from 100, one from 10, else three.
///
/// # Examples
///
/// ```
/// use mcucalc::core::storage::format_scaled;
///
/// assert_eq!(format_scaled(256.0), "256");
/// assert_eq!(format_scaled(16.0009765625), "16.0");
/// assert_eq!(format_scaled(0.5), "0.500");
/// ```
pub fn format_scaled(value: f64) -> String {
    if value >= 100.0 {
        format!("{value:.0}")
    } else if value >= 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.3}")
    }
}

/// Parses `0xSTART-0xEND`, whitespace allowed around the dash.
///
/// Returns `None` if `input` does not have the shape of a range at all.
fn parse_range(input: &str) -> Option<Result<AddressRange>> {
    let (start, end) = input.split_once('-')?;
    let start = start.trim_end().strip_prefix("0x")?;
    let end = end.trim_start().strip_prefix("0x")?;

    let is_hex = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit());
    if !is_hex(start) || !is_hex(end) {
        return None;
    }

    Some(
        parse_digits(start, 16)
            .and_then(|start| Ok((start, parse_digits(end, 16)?)))
            .and_then(|(start, end)| AddressRange::new(start, end)),
    )
}

/// Parses a plain amount: `0x` hex, or decimal with an optional fraction.
fn parse_amount(input: &str) -> Result<Decimal> {
    if let Some(hex) = input.strip_prefix("0x") {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidNumericFormat(input.to_string()));
        }
        return parse_digits(hex, 16).map(Decimal::from_integer);
    }
    Decimal::parse(input)
}

/// Converts `input` given in `unit` into all units.
///
/// The byte and bit counts are rounded up to whole bytes. KB/MB/GB keep the
/// exact fractional value, except for bit input where they follow the
/// rounded byte count.
///
/// # Errors
///
/// - [`Error::EmptyInput`] for blank input
/// - [`Error::InvalidRange`] for a register range ending before it starts
/// - [`Error::InvalidNumericFormat`] for anything that is not a number or range
/// - [`Error::MagnitudeOutOfRange`] when the byte count exceeds `u64`
pub fn convert(input: &str, unit: StorageUnit) -> Result<StorageSize> {
    let input = require_non_empty(input)?;

    if unit == StorageUnit::Register
        && let Some(range) = parse_range(input)
    {
        let range = range?;
        let mut size = StorageSize::from_bytes(range.size()?);
        size.range = Some(range);
        tracing::debug!(
            "Range {:#X}-{:#X} spans {} bytes",
            range.start,
            range.end,
            size.bytes
        );
        return Ok(size);
    }

    let amount = parse_amount(input)?;
    let (numerator, denominator) = unit.byte_ratio();
    let bytes = amount.scale_ceil(numerator, denominator)?;

    tracing::debug!("{input} {unit} = {bytes} bytes");
    if unit == StorageUnit::Bit {
        return Ok(StorageSize::from_bytes(bytes));
    }
    Ok(StorageSize::with_exact_bytes(
        bytes,
        amount.scale_f64(numerator, denominator),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_range() {
        let size = convert("0x0000-0x4000", StorageUnit::Register).unwrap();
        assert_eq!(size.bytes, 16385);
        assert_eq!(size.bits, 131_080);
        assert_eq!(
            size.range,
            Some(AddressRange {
                start: 0,
                end: 0x4000
            })
        );
    }

    #[test]
    fn test_range_with_spaces() {
        let size = convert("  0x08000000 - 0x0803FFFF ", StorageUnit::Register).unwrap();
        assert_eq!(size.bytes, 256 * 1024);
        assert_eq!(size.kilobytes, Some(256.0));
    }

    #[test]
    fn test_single_address_range() {
        let size = convert("0x10-0x10", StorageUnit::Register).unwrap();
        assert_eq!(size.bytes, 1);
    }

    #[test]
    fn test_reversed_range() {
        assert_eq!(
            convert("0x4000-0x0000", StorageUnit::Register),
            Err(Error::InvalidRange {
                start: 0x4000,
                end: 0
            })
        );
    }

    #[test]
    fn test_full_address_space_overflows() {
        assert_eq!(
            convert("0x0-0xFFFFFFFFFFFFFFFF", StorageUnit::Register),
            Err(Error::MagnitudeOutOfRange)
        );
    }

    #[test]
    fn test_range_only_in_register_mode() {
        assert_eq!(
            convert("0x0-0x10", StorageUnit::Byte),
            Err(Error::InvalidNumericFormat("0x0-0x10".to_string()))
        );
    }

    #[test]
    fn test_malformed_range() {
        assert!(matches!(
            convert("0x10-", StorageUnit::Register),
            Err(Error::InvalidNumericFormat(_))
        ));
        assert!(matches!(
            convert("10-20", StorageUnit::Register),
            Err(Error::InvalidNumericFormat(_))
        ));
    }

    #[test]
    fn test_register_plain_values() {
        assert_eq!(convert("4000", StorageUnit::Register).unwrap().bytes, 4000);
        assert_eq!(
            convert("0x3FFFF", StorageUnit::Register).unwrap().bytes,
            0x40000 - 1
        );
    }

    #[test]
    fn test_bits_round_up_to_bytes() {
        assert_eq!(convert("8", StorageUnit::Bit).unwrap().bytes, 1);
        assert_eq!(convert("9", StorageUnit::Bit).unwrap().bytes, 2);
        assert_eq!(convert("0", StorageUnit::Bit).unwrap().bytes, 0);
    }

    #[test]
    fn test_binary_multiples() {
        assert_eq!(convert("1", StorageUnit::Kilobyte).unwrap().bytes, 1024);
        assert_eq!(convert("2", StorageUnit::Megabyte).unwrap().bytes, 2 << 20);
        assert_eq!(convert("1.5", StorageUnit::Gigabyte).unwrap().bytes, 3 << 29);
        assert_eq!(convert("0x10", StorageUnit::Kilobyte).unwrap().bytes, 16384);
    }

    #[test]
    fn test_fractional_bytes_round_up() {
        assert_eq!(convert("2.1", StorageUnit::Byte).unwrap().bytes, 3);
        assert_eq!(convert("0.001", StorageUnit::Kilobyte).unwrap().bytes, 2);
    }

    #[test]
    fn test_scaled_units_keep_fractional_value() {
        let size = convert("0.1", StorageUnit::Kilobyte).unwrap();
        assert_eq!(size.bytes, 103);
        assert_eq!(format_scaled(size.kilobytes.unwrap()), "0.100");

        let size = convert("2.5", StorageUnit::Byte).unwrap();
        assert_eq!(size.bytes, 3);
        assert_eq!(size.kilobytes, Some(2.5 / 1024.0));

        let size = convert("1.5", StorageUnit::Megabyte).unwrap();
        assert_eq!(size.megabytes, Some(1.5));
        assert_eq!(size.kilobytes, Some(1536.0));
    }

    #[test]
    fn test_bit_input_scales_from_whole_bytes() {
        let size = convert("9", StorageUnit::Bit).unwrap();
        assert_eq!(size.bytes, 2);
        assert_eq!(size.kilobytes, Some(2.0 / 1024.0));
    }

    #[test]
    fn test_tiny_fraction_rounds_up_to_one_byte() {
        let size = convert("0.00000000000000000000000000001", StorageUnit::Gigabyte).unwrap();
        assert_eq!(size.bytes, 1);
        assert_eq!(size.kilobytes, None);

        let tinier = format!("0.{}1", "0".repeat(45));
        assert_eq!(convert(&tinier, StorageUnit::Gigabyte).unwrap().bytes, 1);
    }

    #[test]
    fn test_small_values_omit_large_units() {
        let size = convert("512", StorageUnit::Byte).unwrap();
        assert_eq!(size.kilobytes, Some(0.5));
        assert_eq!(size.megabytes, None);
        assert_eq!(size.gigabytes, None);

        let tiny = convert("1", StorageUnit::Byte).unwrap();
        assert_eq!(tiny.kilobytes, None);
    }

    #[test]
    fn test_invalid_numbers() {
        for input in ["abc", "1e3", "-4", "0x", "0xZZ", ".5", "1.2.3"] {
            assert!(
                matches!(
                    convert(input, StorageUnit::Byte),
                    Err(Error::InvalidNumericFormat(_))
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(convert(" ", StorageUnit::Register), Err(Error::EmptyInput));
    }

    #[test]
    fn test_byte_overflow() {
        assert_eq!(
            convert("17179869184", StorageUnit::Gigabyte),
            Err(Error::MagnitudeOutOfRange)
        );
    }

    #[test]
    fn test_format_scaled_thresholds() {
        assert_eq!(format_scaled(100.0), "100");
        assert_eq!(format_scaled(10.0), "10.0");
        assert_eq!(format_scaled(9.9999), "10.000");
        assert_eq!(format_scaled(0.001), "0.001");
    }

    #[test]
    fn test_unit_names_are_case_sensitive() {
        assert_eq!("b".parse::<StorageUnit>().unwrap(), StorageUnit::Bit);
        assert_eq!("B".parse::<StorageUnit>().unwrap(), StorageUnit::Byte);
        assert_eq!("KB".parse::<StorageUnit>().unwrap(), StorageUnit::Kilobyte);
        assert_eq!(
            "register".parse::<StorageUnit>().unwrap(),
            StorageUnit::Register
        );
        assert_eq!(StorageUnit::Bit.to_string(), "b");
        assert_eq!(StorageUnit::Gigabyte.to_string(), "GB");
    }
}
