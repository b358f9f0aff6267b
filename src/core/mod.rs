//! Calculation kernels
//!
//! Each module is a stateless function family from validated input to a
//! result value or an [`error::Error`]. None of them depend on each other.
//!
//! - [`crc32`]: CRC-32 checksum over text or hex bytes
//! - [`xor_sum`]: XOR checksum over decimal/hex/binary values
//! - [`base64`]: Base64 encoding and strict decoding
//! - [`radix`]: Integer conversion between bases 2, 8, 10 and 16
//! - [`storage`]: Storage unit and address range sizing
//! - [`timer`]: Clock divider and PWM register calculation
//! - [`error`]: Error types shared by all kernels

pub mod base64;
pub mod crc32;
pub mod error;
pub mod radix;
pub mod storage;
pub mod timer;
pub mod xor_sum;
