use thiserror::Error;

/// Core error types for mcucalc
///
/// Every variant is a local validation failure: it is raised before any
/// computation starts and never carries a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Nothing left to compute after trimming
    #[error("Input is empty")]
    EmptyInput,

    /// Input exceeds [`crate::validators::MAX_INPUT_LEN`]
    #[error("Input too long: {len} bytes (max {max})")]
    InputTooLong { len: usize, max: usize },

    /// Hex byte string has odd length or non-hex characters
    #[error("Invalid hex format: expected an even number of 0-9, A-F, a-f digits")]
    InvalidHexFormat,

    /// A checksum token is not a decimal, `0x` hex or `0b` binary literal
    #[error("Invalid value format: {0}")]
    InvalidToken(String),

    /// A digit is not legal in the selected radix
    #[error("Invalid digit '{digit}' for base {radix}")]
    InvalidDigitForRadix { radix: u32, digit: char },

    /// Character outside the Base64 alphabet
    #[error("Invalid Base64 character '{character}' at position {position}")]
    InvalidAlphabet { character: char, position: usize },

    /// Base64 text uses only valid characters but has a bad length or misplaced padding
    #[error("Malformed Base64: invalid length or padding")]
    MalformedBase64,

    /// Decoded bytes are not valid UTF-8
    #[error("Decoded data is not valid UTF-8 (first invalid byte at offset {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },

    /// Address range whose end lies before its start
    #[error("Invalid range: end address {end:#X} is below start address {start:#X}")]
    InvalidRange { start: u64, end: u64 },

    /// Input is neither a number nor an address range
    #[error("Invalid number: {0}")]
    InvalidNumericFormat(String),

    /// Value does not fit in 64 bits
    #[error("Value exceeds the supported range (max {max})", max = u64::MAX)]
    MagnitudeOutOfRange,

    /// Numeric parameter outside its allowed range
    #[error("Invalid {field}: {message}")]
    InvalidParameter {
        field: &'static str,
        message: String,
    },
}

/// Error kinds without payload, for callers that only branch on the kind
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
pub enum ErrorKind {
    EmptyInput,
    InputTooLong,
    InvalidHexFormat,
    InvalidToken,
    InvalidDigitForRadix,
    InvalidAlphabet,
    MalformedBase64,
    InvalidUtf8,
    InvalidRange,
    InvalidNumericFormat,
    MagnitudeOutOfRange,
    InvalidParameter,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyInput => ErrorKind::EmptyInput,
            Error::InputTooLong { .. } => ErrorKind::InputTooLong,
            Error::InvalidHexFormat => ErrorKind::InvalidHexFormat,
            Error::InvalidToken(_) => ErrorKind::InvalidToken,
            Error::InvalidDigitForRadix { .. } => ErrorKind::InvalidDigitForRadix,
            Error::InvalidAlphabet { .. } => ErrorKind::InvalidAlphabet,
            Error::MalformedBase64 => ErrorKind::MalformedBase64,
            Error::InvalidUtf8 { .. } => ErrorKind::InvalidUtf8,
            Error::InvalidRange { .. } => ErrorKind::InvalidRange,
            Error::InvalidNumericFormat(_) => ErrorKind::InvalidNumericFormat,
            Error::MagnitudeOutOfRange => ErrorKind::MagnitudeOutOfRange,
            Error::InvalidParameter { .. } => ErrorKind::InvalidParameter,
        }
    }

    /// Short suggestion on how to fix the input, shown under the error by the CLI.
    pub fn hint(&self) -> &'static str {
        match self {
            Error::EmptyInput => "Provide a value to compute",
            Error::InputTooLong { .. } => "Split the data into smaller chunks",
            Error::InvalidHexFormat => "Hex input must be byte pairs, e.g. 48 65 6C 6C 6F",
            Error::InvalidToken(_) => {
                "Use decimal (25), hex with 0x prefix (0x1A) or binary with 0b prefix (0b1010)"
            }
            Error::InvalidDigitForRadix { .. } => {
                "Check the selected source base; do not include a 0b/0o/0x prefix"
            }
            Error::InvalidAlphabet { .. } => "Base64 text may only contain A-Z, a-z, 0-9, +, / and =",
            Error::MalformedBase64 => "Check that the Base64 text was copied completely",
            Error::InvalidUtf8 { .. } => "The encoded data is binary, not text",
            Error::InvalidRange { .. } => "Write the range as 0xSTART-0xEND with START <= END",
            Error::InvalidNumericFormat(_) => {
                "Enter a number such as 4000, 1.5 or 0x3FFFF, or a range such as 0x0000-0x4000"
            }
            Error::MagnitudeOutOfRange => "Values are limited to 64 bits",
            Error::InvalidParameter { .. } => {
                "Frequencies must be positive; duty cycle must be between 0 and 100"
            }
        }
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::InvalidUtf8 {
            valid_up_to: err.utf8_error().valid_up_to(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
