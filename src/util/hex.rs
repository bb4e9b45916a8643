//! # Hex Helpers
//!
//! Raw bytes of rejected frames and exchanges are logged as hex so that a
//! capture can be replayed later through `jkess-cli decode`. This module holds
//! both directions: dumping bytes for the log and parsing captured text back.
//!
//! ```rust
//! use jkess_rs::util::hex::{decode_hex, format_hex_compact, pretty_hex};
//!
//! let bytes = decode_hex("55 AA EB 90").unwrap();
//! assert_eq!(format_hex_compact(&bytes), "55 AA EB 90");
//! assert!(pretty_hex(&bytes, 16).starts_with("0000: "));
//! ```

use thiserror::Error;

/// Errors raised while parsing captured hex text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex digits: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

/// Lowercase hex without separators.
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Parses hex text; whitespace, `:` and `-` separators and an optional
/// `0x` prefix are accepted.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();

    if cleaned.is_empty() {
        return Err(HexError::EmptyString);
    }
    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }
    hex::decode(&cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Uppercase bytes separated by single spaces, for one-line log messages.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Multi-line dump with offsets and an ASCII column.
pub fn pretty_hex(data: &[u8], bytes_per_line: usize) -> String {
    let width = bytes_per_line.max(1);
    data.chunks(width)
        .enumerate()
        .map(|(line, chunk)| {
            let hex = format_hex_compact(chunk);
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            format!("{:04x}: {:<pad$} |{}|", line * width, hex, ascii, pad = width * 3 - 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
