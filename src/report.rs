//! Plain-text rendering of calculation results
//!
//! Every result type is also `Serialize`, so [`render`] can emit either the
//! aligned text form or pretty JSON.

use crate::config::OutputFormat;
use crate::core::crc32::Crc32Checksum;
use crate::core::radix::BaseConversion;
use crate::core::storage::{StorageSize, format_scaled};
use crate::core::timer::{ClockDivision, FixedTiming, TimerSolution, format_frequency};
use crate::core::xor_sum::XorSum;
use crate::utils::group_thousands;
use serde::Serialize;
use std::fmt::Write;

/// Human-readable multi-line form of a result
pub trait Report {
    fn to_text(&self) -> String;
}

/// Renders `value` in the requested format.
pub fn render<T: Report + Serialize>(value: &T, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(value.to_text()),
        OutputFormat::Json => serde_json::to_string_pretty(value),
    }
}

/// Period time with nine decimals, as shown by clock calculators
fn format_period(time: f64, unit: impl std::fmt::Display) -> String {
    format!("{time:.9} {unit}")
}

impl Report for String {
    fn to_text(&self) -> String {
        self.clone()
    }
}

impl Report for Crc32Checksum {
    fn to_text(&self) -> String {
        format!("CRC32: {} ({} bytes, {})", self.hex, self.byte_len, self.mode)
    }
}

impl Report for XorSum {
    fn to_text(&self) -> String {
        format!(
            "Decimal: {}\nHex:     {}\nBinary:  {}",
            self.decimal, self.hex, self.binary
        )
    }
}

impl Report for BaseConversion {
    fn to_text(&self) -> String {
        self.outputs
            .iter()
            .map(|v| format!("{:<12} {}", format!("{}:", v.radix), v.prefixed))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Report for StorageSize {
    fn to_text(&self) -> String {
        let mut out = String::new();
        if let Some(range) = self.range {
            let _ = writeln!(out, "Range: {:#X} - {:#X}", range.start, range.end);
        }
        let _ = writeln!(out, "Bits:  {} b", group_thousands(self.bits));
        let _ = write!(out, "Bytes: {} B", group_thousands(self.bytes));
        for (value, unit) in [
            (self.kilobytes, "KB"),
            (self.megabytes, "MB"),
            (self.gigabytes, "GB"),
        ] {
            if let Some(value) = value {
                let _ = write!(out, "\n{unit}:    {} {unit}", format_scaled(value));
            }
        }
        out
    }
}

impl Report for TimerSolution {
    fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Clock source: {} (divider {})",
            self.clock_source, self.divider
        );
        let _ = writeln!(out, "Period:       {}", self.period);
        let _ = writeln!(out, "Duty:         {} ({}%)", self.duty, self.duty_percent);
        let _ = write!(
            out,
            "Frequency:    {} (target {}, error {:+.3}%)",
            format_frequency(self.achieved_frequency_hz),
            format_frequency(self.target_frequency_hz),
            self.error_percent()
        );
        if self.overflowed {
            let _ = write!(
                out,
                "\nWarning: period exceeds 16 bits even at the largest divider; output is faster than requested"
            );
        }
        if self.underflowed {
            let _ = write!(
                out,
                "\nWarning: target is faster than the source clock; output is slower than requested"
            );
        }
        out
    }
}

impl Report for FixedTiming {
    fn to_text(&self) -> String {
        let mut out = format!(
            "Period:    {}\nFrequency: {}\nPeriod time: {}",
            self.period,
            format_frequency(self.achieved_frequency_hz),
            format_period(self.period_time, self.time_unit)
        );
        if self.overflowed || self.underflowed {
            out.push_str("\nWarning: period register clamped to 0..=65535");
        }
        out
    }
}

impl Report for ClockDivision {
    fn to_text(&self) -> String {
        format!(
            "Frequency: {}\nPeriod:    {}",
            format_frequency(self.frequency_hz),
            format_period(self.period_time, self.time_unit)
        )
    }
}
