//! Input validation and parsing shared by all calculators
//!
//! Every calculator rejects bad input here, before any computation runs.
//! Integer parsing is exact and 64-bit: values that do not fit are reported
//! as [`Error::MagnitudeOutOfRange`] instead of losing precision.

use crate::core::error::{Error, Result};
use logos::Logos;

/// Maximum accepted length of any text input, in bytes
///
/// Calculator inputs are tool-scale strings; this keeps a stray multi-megabyte
/// paste from stalling the caller.
pub const MAX_INPUT_LEN: usize = 1024 * 1024;

/// Rejects inputs longer than [`MAX_INPUT_LEN`].
///
/// # Errors
///
/// Returns [`Error::InputTooLong`] when the limit is exceeded.
pub fn check_input_len(input: &str) -> Result<()> {
    if input.len() > MAX_INPUT_LEN {
        return Err(Error::InputTooLong {
            len: input.len(),
            max: MAX_INPUT_LEN,
        });
    }
    Ok(())
}

/// Checks the length limit and trims surrounding whitespace.
///
/// # Errors
///
/// Returns [`Error::InputTooLong`] or [`Error::EmptyInput`].
///
/// # Examples
///
/// ```
/// use mcucalc::validators::require_non_empty;
///
/// assert_eq!(require_non_empty("  0x1A \n").unwrap(), "0x1A");
/// assert!(require_non_empty(" \t ").is_err());
/// ```
pub fn require_non_empty(input: &str) -> Result<&str> {
    check_input_len(input)?;
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(trimmed)
}

/// Decodes a hex byte string such as `"48 65 6c 6C 6F"`.
///
/// All whitespace is removed first; what remains must be an even number of
/// hex digits (either case).
///
/// # Errors
///
/// Returns [`Error::InvalidHexFormat`] for odd length or non-hex characters.
pub fn decode_hex(input: &str) -> Result<Vec<u8>> {
    check_input_len(input)?;
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    if !digits.len().is_multiple_of(2) {
        return Err(Error::InvalidHexFormat);
    }

    // Multi-byte UTF-8 whitespace is not stripped and fails here as non-hex
    digits
        .chunks_exact(2)
        .map(|pair| match (hex_value(pair[0]), hex_value(pair[1])) {
            (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
            _ => Err(Error::InvalidHexFormat),
        })
        .collect()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Parses an unprefixed digit string in `radix` into a 64-bit magnitude.
///
/// # Errors
///
/// - [`Error::EmptyInput`] if `digits` is empty
/// - [`Error::InvalidDigitForRadix`] on the first illegal digit
/// - [`Error::MagnitudeOutOfRange`] if the value exceeds `u64::MAX`
pub fn parse_digits(digits: &str, radix: u32) -> Result<u64> {
    if digits.is_empty() {
        return Err(Error::EmptyInput);
    }

    // Validate every digit before reporting overflow
    let values = digits
        .chars()
        .map(|c| {
            c.to_digit(radix)
                .ok_or(Error::InvalidDigitForRadix { radix, digit: c })
        })
        .collect::<Result<Vec<u32>>>()?;

    values.into_iter().try_fold(0u64, |acc, d| {
        acc.checked_mul(u64::from(radix))
            .and_then(|v| v.checked_add(u64::from(d)))
            .ok_or(Error::MagnitudeOutOfRange)
    })
}

/// Radix-prefixed integer literal as typed into the checksum and storage tools.
///
/// Prefixes are lowercase only; `0X1A` is not a hex literal.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadixLiteral {
    #[regex("0x[0-9A-Fa-f]+")]
    Hex,
    #[regex("0b[01]+")]
    Binary,
    #[regex("[0-9]+")]
    Decimal,
}

impl RadixLiteral {
    pub const fn radix(self) -> u32 {
        match self {
            RadixLiteral::Hex => 16,
            RadixLiteral::Binary => 2,
            RadixLiteral::Decimal => 10,
        }
    }

    pub const fn prefix_len(self) -> usize {
        match self {
            RadixLiteral::Hex | RadixLiteral::Binary => 2,
            RadixLiteral::Decimal => 0,
        }
    }
}

/// Classifies `token` as a whole radix literal.
///
/// Returns `None` unless the entire token is exactly one literal, so `"0b12"`
/// and `"0x"` are rejected rather than split.
pub fn classify_literal(token: &str) -> Option<RadixLiteral> {
    let mut lexer = RadixLiteral::lexer(token);
    match lexer.next() {
        Some(Ok(kind)) if lexer.span() == (0..token.len()) => Some(kind),
        _ => None,
    }
}

/// Parses a radix literal (`25`, `0x1A`, `0b1010`) into its value.
///
/// Returns `None` when `token` is not a literal at all.
///
/// # Errors
///
/// Returns [`Error::MagnitudeOutOfRange`] when the literal exceeds 64 bits.
pub fn parse_literal(token: &str) -> Option<Result<u64>> {
    let kind = classify_literal(token)?;
    Some(parse_digits(&token[kind.prefix_len()..], kind.radix()))
}

/// Exact non-negative decimal number, `units / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    pub units: u128,
    pub scale: u32,
}

/// Most significant digits accepted in a decimal number.
///
/// Keeps `units × 1024³` far below `u128::MAX`.
const MAX_DECIMAL_DIGITS: usize = 28;

impl Decimal {
    /// Parses `123` or `123.456` (no sign, no exponent, no bare dot).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidNumericFormat`] if the text is not of that shape
    /// - [`Error::MagnitudeOutOfRange`] for more than 28 significant digits
    pub fn parse(text: &str) -> Result<Self> {
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (text, ""),
        };

        let well_formed = !int_part.is_empty()
            && int_part.bytes().all(|b| b.is_ascii_digit())
            && frac_part.bytes().all(|b| b.is_ascii_digit())
            && !(text.contains('.') && frac_part.is_empty());
        if !well_formed {
            return Err(Error::InvalidNumericFormat(text.to_string()));
        }

        let int_part = int_part.trim_start_matches('0');
        let frac_part = frac_part.trim_end_matches('0');
        let significant = if int_part.is_empty() {
            frac_part.trim_start_matches('0').len()
        } else {
            int_part.len() + frac_part.len()
        };
        if significant > MAX_DECIMAL_DIGITS {
            return Err(Error::MagnitudeOutOfRange);
        }

        let units = int_part
            .bytes()
            .chain(frac_part.bytes())
            .fold(0u128, |acc, b| acc * 10 + u128::from(b - b'0'));

        Ok(Self {
            units,
            scale: frac_part.len() as u32,
        })
    }

    pub fn from_integer(value: u64) -> Self {
        Self {
            units: u128::from(value),
            scale: 0,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.scale == 0
    }

    /// Computes `ceil(self × numerator / denominator)` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MagnitudeOutOfRange`] if the result exceeds `u64::MAX`.
    pub fn scale_ceil(&self, numerator: u128, denominator: u128) -> Result<u64> {
        let num = self
            .units
            .checked_mul(numerator)
            .ok_or(Error::MagnitudeOutOfRange)?;
        let Some(den) = 10u128
            .checked_pow(self.scale)
            .and_then(|p| p.checked_mul(denominator))
        else {
            // `num` fits in u128 and `den` does not, so the quotient is below 1
            return Ok(u64::from(num > 0));
        };
        u64::try_from(num.div_ceil(den)).map_err(|_| Error::MagnitudeOutOfRange)
    }

    /// Approximates `self × numerator / denominator` without rounding to an integer.
    pub fn scale_f64(&self, numerator: u128, denominator: u128) -> f64 {
        let exponent = i32::try_from(self.scale).unwrap_or(i32::MAX);
        self.units as f64 * numerator as f64 / (10f64.powi(exponent) * denominator as f64)
    }
}

/// Validates a frequency in Hz: finite and strictly positive.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] naming `field`.
pub fn validate_frequency(field: &'static str, hz: f64) -> Result<f64> {
    if !hz.is_finite() || hz <= 0.0 {
        return Err(Error::InvalidParameter {
            field,
            message: format!("{hz} Hz is not a positive frequency"),
        });
    }
    Ok(hz)
}

/// Validates a clock divider: finite and strictly positive.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`].
pub fn validate_divider(divider: f64) -> Result<f64> {
    if !divider.is_finite() || divider <= 0.0 {
        return Err(Error::InvalidParameter {
            field: "divider",
            message: format!("{divider} is not a positive divider"),
        });
    }
    Ok(divider)
}

/// Validates a duty cycle percentage within `[0, 100]`.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`].
pub fn validate_duty_percent(percent: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(Error::InvalidParameter {
            field: "duty cycle",
            message: format!("{percent}% is outside 0-100%"),
        });
    }
    Ok(percent)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_parse_digits_matches_std(value in any::<u64>()) {
            prop_assert_eq!(parse_digits(&format!("{value:b}"), 2).unwrap(), value);
            prop_assert_eq!(parse_digits(&format!("{value:o}"), 8).unwrap(), value);
            prop_assert_eq!(parse_digits(&value.to_string(), 10).unwrap(), value);
            prop_assert_eq!(parse_digits(&format!("{value:x}"), 16).unwrap(), value);
        }

        #[test]
        fn test_decode_hex_inverts_formatting(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let hex: String = bytes.iter().map(|b| format!("{b:02x} ")).collect();
            prop_assert_eq!(decode_hex(&hex).unwrap(), bytes);
        }

        #[test]
        fn test_decode_hex_never_panics(input in "\\PC*") {
            let _ = decode_hex(&input);
        }

        #[test]
        fn test_classify_literal_never_panics(input in "\\PC{0,16}") {
            let _ = parse_literal(&input);
        }

        #[test]
        fn test_decimal_integer_roundtrip(value in any::<u64>()) {
            let parsed = Decimal::parse(&value.to_string()).unwrap();
            prop_assert_eq!(parsed.scale_ceil(1, 1).unwrap(), value);
        }
    }
}
