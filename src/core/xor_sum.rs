//! XOR checksum over mixed-radix values
//!
//! Values may be written as decimal (`25`), hex (`0x1A`) or binary (`0b1010`)
//! and separated by commas (ASCII or full-width `，`), spaces or newlines.

use crate::core::error::{Error, Result};
use crate::validators::{check_input_len, parse_literal};
use serde::Serialize;

/// XOR-folded value with its three display forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XorSum {
    pub value: u64,
    pub decimal: String,
    /// `0x` prefix, uppercase digits
    pub hex: String,
    /// `0b` prefix, no padding
    pub binary: String,
    pub token_count: usize,
}

impl XorSum {
    fn new(value: u64, token_count: usize) -> Self {
        Self {
            value,
            decimal: value.to_string(),
            hex: format!("0x{value:X}"),
            binary: format!("0b{value:b}"),
            token_count,
        }
    }
}

fn is_separator(c: char) -> bool {
    c == ',' || c == '，' || c.is_whitespace()
}

/// Splits raw input into value tokens, dropping empty pieces.
///
/// # Examples
///
/// ```
/// use mcucalc::core::xor_sum::split_tokens;
///
/// assert_eq!(split_tokens("10, 0x1A，25\n0b1010"), vec!["10", "0x1A", "25", "0b1010"]);
/// assert!(split_tokens(" ,, \n").is_empty());
/// ```
pub fn split_tokens(raw: &str) -> Vec<&str> {
    raw.split(is_separator).filter(|t| !t.is_empty()).collect()
}

/// XORs all tokens together, starting from zero.
///
/// Tokens are validated in order, so the error names the first bad one.
///
/// # Errors
///
/// - [`Error::EmptyInput`] if there are no tokens
/// - [`Error::InvalidToken`] for a token that is not a radix literal
/// - [`Error::MagnitudeOutOfRange`] for a literal wider than 64 bits
pub fn xor_fold<S: AsRef<str>>(tokens: &[S]) -> Result<XorSum> {
    if tokens.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut acc = 0u64;
    for token in tokens {
        let token = token.as_ref().trim();
        let value = parse_literal(token).ok_or_else(|| Error::InvalidToken(token.to_string()))??;
        acc ^= value;
    }

    tracing::debug!("XOR of {} values: {:#X}", tokens.len(), acc);
    Ok(XorSum::new(acc, tokens.len()))
}

/// Tokenizes `raw` with [`split_tokens`] and folds it with [`xor_fold`].
///
/// # Errors
///
/// Same as [`xor_fold`], plus [`Error::InputTooLong`].
pub fn xor_fold_str(raw: &str) -> Result<XorSum> {
    check_input_len(raw)?;
    xor_fold(&split_tokens(raw))
}
