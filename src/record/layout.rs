//! # Fixed-Layout Record Descriptors
//!
//! Every record type is declared once with [`fixed_layout!`]: each field names
//! its Rust type and its absolute offset inside the payload. The macro emits
//! the struct, a field descriptor table (`FIELDS`), the minimum payload length
//! derived from it (`REQUIRED_LEN`) and the `decode` routine. Offsets therefore
//! live in exactly one place.
//!
//! Wire types implement [`Wire`]: integers are little-endian, flag sets are
//! read as little-endian integers (bit 0 = LSB of the first byte), strings
//! are NUL-padded, and the single float follows [`DecodeOptions`].

use crate::error::JkError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte order of the embedded IEEE-754 correction value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatByteOrder {
    #[default]
    Big,
    Little,
}

/// Knobs that influence payload decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub float_byte_order: FloatByteOrder,
}

/// Describes one field of a fixed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

impl FieldSpec {
    pub const fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// Smallest payload that covers every field of `fields`.
pub const fn required_len(fields: &[FieldSpec]) -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < fields.len() {
        let end = fields[i].end();
        if end > max {
            max = end;
        }
        i += 1;
    }
    max
}

/// A value with a fixed on-wire width.
pub trait Wire: Sized {
    const WIDTH: usize;

    /// Reads the value from the start of `bytes`; `None` if too short.
    fn read(bytes: &[u8], opts: &DecodeOptions) -> Option<Self>;
}

pub(crate) fn take<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

macro_rules! impl_wire_le {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Wire for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn read(bytes: &[u8], _opts: &DecodeOptions) -> Option<Self> {
                    take(bytes).map(<$ty>::from_le_bytes)
                }
            }
        )*
    };
}

impl_wire_le!(u8, u16, i16, u32, i32);

impl Wire for f32 {
    const WIDTH: usize = 4;

    fn read(bytes: &[u8], opts: &DecodeOptions) -> Option<Self> {
        let raw = take::<4>(bytes)?;
        Some(match opts.float_byte_order {
            FloatByteOrder::Big => f32::from_be_bytes(raw),
            FloatByteOrder::Little => f32::from_le_bytes(raw),
        })
    }
}

impl<T: Wire + Copy + Default, const N: usize> Wire for [T; N] {
    const WIDTH: usize = T::WIDTH * N;

    fn read(bytes: &[u8], opts: &DecodeOptions) -> Option<Self> {
        let mut out = [T::default(); N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = T::read(bytes.get(i * T::WIDTH..)?, opts)?;
        }
        Some(out)
    }
}

/// NUL-padded UTF-8 string occupying exactly `N` bytes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FixedStr<const N: usize>(String);

impl<const N: usize> FixedStr<N> {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const N: usize> Wire for FixedStr<N> {
    const WIDTH: usize = N;

    fn read(bytes: &[u8], _opts: &DecodeOptions) -> Option<Self> {
        let raw = bytes.get(..N)?;
        let text = String::from_utf8_lossy(raw);
        Some(FixedStr(text.trim_end_matches('\0').to_string()))
    }
}

/// Reads one field, failing the whole record on a short payload.
pub fn read_field<T: Wire>(
    payload: &[u8],
    offset: usize,
    opts: &DecodeOptions,
) -> Result<T, JkError> {
    payload
        .get(offset..)
        .and_then(|bytes| T::read(bytes, opts))
        .ok_or(JkError::TruncatedPayload {
            needed: offset + T::WIDTH,
            actual: payload.len(),
        })
}

/// Declares a fixed-layout record: struct, descriptor table and decoder.
#[macro_export]
macro_rules! fixed_layout {
    (
        $(#[$smeta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $ty:ty => $offset:expr
            ),* $(,)?
        }
    ) => {
        $(#[$smeta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        impl $name {
            /// Field descriptors in declaration order.
            pub const FIELDS: &'static [$crate::record::layout::FieldSpec] = &[
                $(
                    $crate::record::layout::FieldSpec {
                        name: stringify!($field),
                        offset: $offset,
                        width: <$ty as $crate::record::layout::Wire>::WIDTH,
                    },
                )*
            ];

            /// Minimum payload length covering every field.
            pub const REQUIRED_LEN: usize = $crate::record::layout::required_len(Self::FIELDS);

            /// Decodes the record from a payload (frame bytes after the header).
            ///
            /// Either every field is read or the call fails with
            /// `TruncatedPayload`; no partially populated value escapes.
            pub fn decode(
                payload: &[u8],
                opts: &$crate::record::layout::DecodeOptions,
            ) -> Result<Self, $crate::error::JkError> {
                if payload.len() < Self::REQUIRED_LEN {
                    return Err($crate::error::JkError::TruncatedPayload {
                        needed: Self::REQUIRED_LEN,
                        actual: payload.len(),
                    });
                }
                Ok($name {
                    $(
                        $field: $crate::record::layout::read_field::<$ty>(payload, $offset, opts)?,
                    )*
                })
            }
        }
    };
}
