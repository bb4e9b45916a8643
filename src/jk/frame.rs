//! # JK ESS Vendor Frames
//!
//! A vendor frame starts with the magic prefix `55 AA EB x0`, where the upper
//! nibble `x` of the fourth byte announces how many further reads complete
//! the frame (`0x90` on real hardware, i.e. nine). The fixed header is:
//!
//! | offset | meaning                         |
//! |--------|---------------------------------|
//! | 0..4   | magic prefix + fragment nibble  |
//! | 4      | record type (1, 2, 3)           |
//! | 5      | record source (0 = master)      |
//! | 6..    | record payload                  |
//! | 299    | sum-mod-256 of bytes 0..299     |
//!
//! `Frame` wraps one reassembled buffer; `FrameBuilder` produces valid frames
//! for tests, benchmarks and replay tooling.

use crate::constants::{
    JK_CHECKSUM_OFFSET, JK_FRAGMENT_COUNT_OFFSET, JK_MAGIC_BYTE3, JK_MAGIC_BYTE3_FIXED_MASK,
    JK_MAGIC_LEN, JK_MAGIC_PREFIX, JK_MIN_FRAME_LEN, JK_PAYLOAD_OFFSET, JK_RECORD_SOURCE_OFFSET,
    JK_RECORD_TYPE_OFFSET,
};
use crate::error::JkError;
use crate::jk::checksum::checksum_mod256;
use bytes::Bytes;
use serde::Serialize;
use std::fmt;

/// Returns `true` when `chunk` starts with the vendor magic prefix.
///
/// Only the low nibble of byte 3 is fixed; the high nibble is the number of
/// reads still to come. Devices always send `0x90` (nine more reads), but
/// any count is accepted so shorter captures reassemble too.
pub fn is_magic_prefix(chunk: &[u8]) -> bool {
    chunk.len() >= JK_MAGIC_LEN
        && chunk[..JK_MAGIC_PREFIX.len()] == JK_MAGIC_PREFIX
        && chunk[JK_FRAGMENT_COUNT_OFFSET] & JK_MAGIC_BYTE3_FIXED_MASK
            == JK_MAGIC_BYTE3 & JK_MAGIC_BYTE3_FIXED_MASK
}

/// Number of additional fragments announced by a magic-prefixed chunk.
pub fn announced_fragments(chunk: &[u8]) -> Option<u8> {
    if is_magic_prefix(chunk) {
        Some(chunk[JK_FRAGMENT_COUNT_OFFSET] >> 4)
    } else {
        None
    }
}

/// Who originated a frame, from the record-source byte at offset 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordSource {
    /// Broadcast by the master pack; always attributed to device 0.
    Master,
    /// Answer of an addressed slave pack.
    Slave,
}

impl RecordSource {
    pub fn from_byte(byte: u8) -> Self {
        if byte == 0 {
            RecordSource::Master
        } else {
            RecordSource::Slave
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSource::Master => write!(f, "Master"),
            RecordSource::Slave => write!(f, "Slave"),
        }
    }
}

/// One complete, possibly not yet validated vendor frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Frame {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn record_type_byte(&self) -> Option<u8> {
        self.bytes.get(JK_RECORD_TYPE_OFFSET).copied()
    }

    pub fn source_byte(&self) -> Option<u8> {
        self.bytes.get(JK_RECORD_SOURCE_OFFSET).copied()
    }

    pub fn source(&self) -> Option<RecordSource> {
        self.source_byte().map(RecordSource::from_byte)
    }

    /// Checksum byte as transmitted at offset 299.
    pub fn stored_checksum(&self) -> Option<u8> {
        self.bytes.get(JK_CHECKSUM_OFFSET).copied()
    }

    /// Bytes after the 6-byte header (empty for runt frames).
    pub fn payload(&self) -> &[u8] {
        self.bytes.get(JK_PAYLOAD_OFFSET..).unwrap_or(&[])
    }

    /// Checks the minimum length and the stored checksum.
    pub fn verify(&self) -> Result<(), JkError> {
        if self.bytes.len() < JK_MIN_FRAME_LEN {
            return Err(JkError::FrameTooShort {
                len: self.bytes.len(),
            });
        }
        let calculated = checksum_mod256(&self.bytes)?;
        let expected = self.bytes[JK_CHECKSUM_OFFSET];
        if expected != calculated {
            return Err(JkError::ChecksumMismatch {
                expected,
                calculated,
            });
        }
        Ok(())
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Builds checksummed vendor frames.
///
/// Payload offsets passed to the `put_*` helpers are relative to the payload
/// start (frame offset 6), matching the record layouts. A payload byte that
/// would land on offset 299 is replaced by the checksum.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    record_type: u8,
    source: u8,
    fragments: u8,
    total_len: usize,
    payload: Vec<u8>,
}

impl FrameBuilder {
    pub fn new(record_type: u8) -> Self {
        FrameBuilder {
            record_type,
            source: 0,
            fragments: JK_MAGIC_BYTE3 >> 4,
            total_len: JK_MIN_FRAME_LEN,
            payload: Vec::new(),
        }
    }

    /// Raw record-source byte (`0` = master).
    pub fn source(mut self, source: u8) -> Self {
        self.source = source;
        self
    }

    /// Number of additional fragments announced in the header nibble.
    pub fn fragments(mut self, fragments: u8) -> Self {
        self.fragments = fragments & 0x0F;
        self
    }

    /// Total frame length; never below the 300-byte minimum.
    pub fn total_len(mut self, len: usize) -> Self {
        self.total_len = len.max(JK_MIN_FRAME_LEN);
        self
    }

    pub fn put_bytes(mut self, offset: usize, data: &[u8]) -> Self {
        let end = offset + data.len();
        if self.payload.len() < end {
            self.payload.resize(end, 0);
        }
        self.payload[offset..end].copy_from_slice(data);
        self
    }

    pub fn put_u8(self, offset: usize, value: u8) -> Self {
        self.put_bytes(offset, &[value])
    }

    pub fn put_u16(self, offset: usize, value: u16) -> Self {
        self.put_bytes(offset, &value.to_le_bytes())
    }

    pub fn put_i16(self, offset: usize, value: i16) -> Self {
        self.put_bytes(offset, &value.to_le_bytes())
    }

    pub fn put_u32(self, offset: usize, value: u32) -> Self {
        self.put_bytes(offset, &value.to_le_bytes())
    }

    pub fn put_i32(self, offset: usize, value: i32) -> Self {
        self.put_bytes(offset, &value.to_le_bytes())
    }

    /// Produces the complete frame with a valid checksum at offset 299.
    pub fn build(&self) -> Vec<u8> {
        let len = self.total_len.max(JK_PAYLOAD_OFFSET + self.payload.len());
        let mut frame = vec![0u8; len];
        frame[..JK_MAGIC_PREFIX.len()].copy_from_slice(&JK_MAGIC_PREFIX);
        frame[JK_FRAGMENT_COUNT_OFFSET] =
            (self.fragments << 4) | (JK_MAGIC_BYTE3 & JK_MAGIC_BYTE3_FIXED_MASK);
        frame[JK_RECORD_TYPE_OFFSET] = self.record_type;
        frame[JK_RECORD_SOURCE_OFFSET] = self.source;
        frame[JK_PAYLOAD_OFFSET..JK_PAYLOAD_OFFSET + self.payload.len()]
            .copy_from_slice(&self.payload);

        // `total_len` never drops below the minimum frame length.
        if let Ok(sum) = checksum_mod256(&frame) {
            frame[JK_CHECKSUM_OFFSET] = sum;
        }
        frame
    }

    /// Builds the frame and cuts it into `fragments + 1` reads, the way the
    /// device delivers it on the wire.
    pub fn build_fragmented(&self) -> Vec<Vec<u8>> {
        split_into_reads(&self.build(), usize::from(self.fragments) + 1)
    }
}

/// Splits `frame` into `reads` non-empty chunks of near-equal size.
///
/// The first chunk always holds at least the magic prefix.
pub fn split_into_reads(frame: &[u8], reads: usize) -> Vec<Vec<u8>> {
    let reads = reads.clamp(1, (frame.len() / JK_MAGIC_LEN).max(1));
    let step = frame.len() / reads;
    let mut chunks = Vec::with_capacity(reads);
    let mut start = 0;
    for i in 0..reads {
        let end = if i + 1 == reads {
            frame.len()
        } else {
            (start + step).min(frame.len())
        };
        chunks.push(frame[start..end].to_vec());
        start = end;
    }
    chunks
}
