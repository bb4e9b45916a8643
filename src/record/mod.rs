//! # Record Decoding
//!
//! A validated vendor frame carries exactly one record. The record-type byte
//! at offset 4 selects the layout, the record-source byte at offset 5 tells
//! whether the master broadcast it (device 0) or an addressed slave answered
//! (device taken from the Modbus addressing context).
//!
//! ```rust
//! use jkess_rs::jk::FrameBuilder;
//! use jkess_rs::jk::Frame;
//! use jkess_rs::record::{decode, DecodeOptions, Record};
//!
//! let bytes = FrameBuilder::new(2).source(0).put_u8(167, 87).build();
//! let decoded = decode(&Frame::new(bytes), 4, &DecodeOptions::default()).unwrap();
//! assert_eq!(decoded.device_id, 0);
//! match decoded.record {
//!     Record::State(state) => assert_eq!(state.soc, 87),
//!     _ => unreachable!(),
//! }
//! ```

pub mod config;
pub mod flags;
pub mod info;
pub mod layout;
pub mod state;

pub use config::ConfigRecord;
pub use flags::{AlarmFlags, CellMask, ConfigFlags, TempSensorAbsence};
pub use info::DeviceInfoRecord;
pub use layout::{DecodeOptions, FieldSpec, FixedStr, FloatByteOrder};
pub use state::StateRecord;

use crate::constants::JK_MASTER_DEVICE_ID;
use crate::error::JkError;
use crate::jk::frame::{Frame, RecordSource};
use serde::Serialize;
use std::fmt;

/// Record-type discriminator at frame offset 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordType {
    Config,
    State,
    DeviceInfo,
}

impl RecordType {
    pub fn from_byte(byte: u8) -> Result<Self, JkError> {
        match byte {
            1 => Ok(RecordType::Config),
            2 => Ok(RecordType::State),
            3 => Ok(RecordType::DeviceInfo),
            other => Err(JkError::UnknownRecordType(other)),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            RecordType::Config => 1,
            RecordType::State => 2,
            RecordType::DeviceInfo => 3,
        }
    }

    /// Minimum payload length of this record type.
    pub fn required_len(&self) -> usize {
        match self {
            RecordType::Config => ConfigRecord::REQUIRED_LEN,
            RecordType::State => StateRecord::REQUIRED_LEN,
            RecordType::DeviceInfo => DeviceInfoRecord::REQUIRED_LEN,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Config => write!(f, "Config"),
            RecordType::State => write!(f, "State"),
            RecordType::DeviceInfo => write!(f, "DeviceInfo"),
        }
    }
}

/// One decoded record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Record {
    Config(ConfigRecord),
    State(StateRecord),
    DeviceInfo(DeviceInfoRecord),
}

impl Record {
    pub fn record_type(&self) -> RecordType {
        match self {
            Record::Config(_) => RecordType::Config,
            Record::State(_) => RecordType::State,
            Record::DeviceInfo(_) => RecordType::DeviceInfo,
        }
    }

    /// Decodes a payload (frame bytes after the 6-byte header).
    pub fn decode_payload(
        record_type: RecordType,
        payload: &[u8],
        opts: &DecodeOptions,
    ) -> Result<Self, JkError> {
        Ok(match record_type {
            RecordType::Config => Record::Config(ConfigRecord::decode(payload, opts)?),
            RecordType::State => Record::State(StateRecord::decode(payload, opts)?),
            RecordType::DeviceInfo => Record::DeviceInfo(DeviceInfoRecord::decode(payload, opts)?),
        })
    }

    /// The type-specific part of the per-record log line.
    pub fn summary(&self) -> String {
        match self {
            Record::Config(c) => format!(
                "Device Addr: {} Cells: {}",
                c.device_address, c.cell_count
            ),
            Record::State(s) => format!("SoC: {}%", s.soc),
            Record::DeviceInfo(i) => format!(
                "DeviceID: {} HW: {} SW: {}",
                i.manufacturer_device_id, i.hardware_version, i.software_version
            ),
        }
    }
}

/// A record together with its resolved origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedFrame {
    pub device_id: u8,
    pub source: RecordSource,
    pub record: Record,
}

/// Validates and decodes one assembled frame.
///
/// `context_device_id` is the unit id established by the preceding Modbus
/// exchange; it is ignored for master frames, which always map to device 0.
pub fn decode(
    frame: &Frame,
    context_device_id: u8,
    opts: &DecodeOptions,
) -> Result<DecodedFrame, JkError> {
    frame.verify()?;

    let too_short = || JkError::FrameTooShort { len: frame.len() };
    let record_type = RecordType::from_byte(frame.record_type_byte().ok_or_else(too_short)?)?;
    let source = frame.source().ok_or_else(too_short)?;

    let device_id = match source {
        RecordSource::Master => JK_MASTER_DEVICE_ID,
        RecordSource::Slave => context_device_id,
    };

    let record = Record::decode_payload(record_type, frame.payload(), opts)?;
    Ok(DecodedFrame {
        device_id,
        source,
        record,
    })
}
