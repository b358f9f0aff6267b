//! Integer conversion between bases 2, 8, 10 and 16
//!
//! Parsing is exact over the full `u64` range.
//!
//! # Example
//!
//! ```
//! use mcucalc::core::radix::{convert, Radix};
//!
//! let result = convert("ff", Radix::Hexadecimal).unwrap();
//! assert_eq!(result.magnitude, 255);
//! assert_eq!(result.render(Radix::Binary).prefixed, "0b11111111");
//! assert_eq!(result.render(Radix::Octal).prefixed, "0o377");
//! ```

use crate::core::error::Result;
use crate::validators::{parse_digits, require_non_empty};
use serde::{Deserialize, Serialize};

/// Supported number bases
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Radix {
    #[strum(to_string = "binary", serialize = "2", serialize = "bin")]
    Binary,
    #[strum(to_string = "octal", serialize = "8", serialize = "oct")]
    Octal,
    #[strum(to_string = "decimal", serialize = "10", serialize = "dec")]
    Decimal,
    #[strum(to_string = "hexadecimal", serialize = "16", serialize = "hex")]
    Hexadecimal,
}

impl Radix {
    pub const ALL: [Radix; 4] = [
        Radix::Binary,
        Radix::Octal,
        Radix::Decimal,
        Radix::Hexadecimal,
    ];

    pub const fn base(self) -> u32 {
        match self {
            Radix::Binary => 2,
            Radix::Octal => 8,
            Radix::Decimal => 10,
            Radix::Hexadecimal => 16,
        }
    }

    pub fn from_base(base: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.base() == base)
    }

    /// Canonical literal prefix; decimal has none.
    pub const fn prefix(self) -> &'static str {
        match self {
            Radix::Binary => "0b",
            Radix::Octal => "0o",
            Radix::Decimal => "",
            Radix::Hexadecimal => "0x",
        }
    }

    /// Renders `value` without prefix, hex digits uppercase.
    pub fn digits(self, value: u64) -> String {
        match self {
            Radix::Binary => format!("{value:b}"),
            Radix::Octal => format!("{value:o}"),
            Radix::Decimal => value.to_string(),
            Radix::Hexadecimal => format!("{value:X}"),
        }
    }

    /// Parses an unprefixed digit string in this radix.
    ///
    /// # Errors
    ///
    /// See [`parse_digits`].
    pub fn parse(self, digits: &str) -> Result<u64> {
        parse_digits(digits, self.base())
    }
}

/// One rendering of a magnitude
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadixValue {
    pub radix: Radix,
    pub digits: String,
    pub prefixed: String,
}

impl RadixValue {
    fn new(radix: Radix, value: u64) -> Self {
        let digits = radix.digits(value);
        Self {
            radix,
            prefixed: format!("{}{digits}", radix.prefix()),
            digits,
        }
    }
}

/// A parsed magnitude with its renderings in the three other bases
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseConversion {
    pub magnitude: u64,
    pub source: Radix,
    /// The input as typed, trimmed
    pub source_digits: String,
    /// The other three radixes, ascending
    pub outputs: Vec<RadixValue>,
}

impl BaseConversion {
    /// Renders the magnitude in any radix, including the source one.
    pub fn render(&self, radix: Radix) -> RadixValue {
        RadixValue::new(radix, self.magnitude)
    }
}

/// Parses `value` in `source` and renders it in the other three bases.
///
/// # Errors
///
/// - [`Error::EmptyInput`](crate::Error::EmptyInput) for blank input
/// - [`Error::InvalidDigitForRadix`](crate::Error::InvalidDigitForRadix) for an illegal digit
/// - [`Error::MagnitudeOutOfRange`](crate::Error::MagnitudeOutOfRange) beyond `u64::MAX`
pub fn convert(value: &str, source: Radix) -> Result<BaseConversion> {
    let value = require_non_empty(value)?;
    let magnitude = source.parse(value)?;

    let outputs = Radix::ALL
        .into_iter()
        .filter(|&r| r != source)
        .map(|r| RadixValue::new(r, magnitude))
        .collect();

    tracing::debug!("Converted {value} from {source}: {magnitude}");
    Ok(BaseConversion {
        magnitude,
        source,
        source_digits: value.to_string(),
        outputs,
    })
}
