//! # Utility Modules
//!
//! Small helpers shared by the library and the CLI.

pub mod hex;

pub use hex::{decode_hex, encode_hex, format_hex_compact, pretty_hex, HexError};
