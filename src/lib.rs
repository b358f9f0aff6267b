//! mcucalc - Microcontroller helper calculations
//!
//! Deterministic kernels for the small computations that come up when
//! bringing up firmware: checksums, encodings, number bases, memory sizes
//! and timer registers.
//!
//! # Architecture
//!
//! - [`core`] - Calculation kernels and the shared error type
//! - [`validators`] - Input validation and exact number parsing
//! - [`report`] - Text and JSON rendering of results
//! - [`config`] - CLI default persistence
//! - [`utils`] - Utility functions (XDG directories, number grouping)
//!
//! # Example
//!
//! ```
//! use mcucalc::core::crc32::{checksum, InputMode};
//!
//! let crc = checksum("123456789", InputMode::Text).unwrap();
//! assert_eq!(crc.hex, "CBF43926");
//! ```

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod core;
pub mod report;
pub mod utils;
pub mod validators;

// Re-export commonly used types
pub use core::error::{Error, ErrorKind, Result};
