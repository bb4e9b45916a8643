//! # JK ESS Error Handling
//!
//! This module defines the JkError enum, which represents the different error
//! types that can occur while reassembling, validating and decoding traffic
//! from the battery link.

use thiserror::Error;

/// Represents the different error types that can occur in the jkess-rs crate.
///
/// Every protocol variant is a local failure: the offending frame or
/// exchange is dropped and the stream keeps flowing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JkError {
    /// The 8-bit checksum stored at offset 299 does not match the computed sum.
    #[error("Invalid checksum: expected 0x{expected:02X}, calculated 0x{calculated:02X}")]
    ChecksumMismatch { expected: u8, calculated: u8 },

    /// The CRC16 trailer of a Modbus exchange does not match.
    #[error("Invalid Modbus CRC: expected 0x{expected:04X}, calculated 0x{calculated:04X}")]
    CrcMismatch { expected: u16, calculated: u16 },

    /// An assembled frame is shorter than the 300-byte minimum.
    #[error("Frame too short: {len} bytes")]
    FrameTooShort { len: usize },

    /// The record-type discriminator at offset 4 is not 1, 2 or 3.
    #[error("Unknown record type: {0}")]
    UnknownRecordType(u8),

    /// The payload ends before a field of the record layout.
    #[error("Truncated payload: need {needed} bytes, got {actual}")]
    TruncatedPayload { needed: usize, actual: usize },

    /// A partial assembly was superseded by a new magic prefix.
    #[error("Assembly abandoned: {discarded} buffered bytes discarded")]
    AssemblyAbandoned { discarded: usize },

    /// A checksum was requested over a buffer that is too short.
    #[error("Buffer out of range: {len} bytes, at least {required} required")]
    OutOfRange { len: usize, required: usize },

    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPortError(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A catch‑all error for uncategorized cases.
    #[error("Other error: {0}")]
    Other(String),
}

impl From<std::io::Error> for JkError {
    fn from(err: std::io::Error) -> Self {
        JkError::SerialPortError(err.to_string())
    }
}

impl From<tokio_serial::Error> for JkError {
    fn from(err: tokio_serial::Error) -> Self {
        JkError::SerialPortError(err.to_string())
    }
}
