//! # jkess-rs - Decoding JK ESS Battery Telemetry from a Shared RS485 Link
//!
//! A cluster of JK battery-management controllers shares one RS485 bus. The
//! master pack polls its slaves with Modbus register writes, and every pack
//! answers with a ~300 byte vendor frame that the adapter delivers over
//! several physical reads. This crate turns that raw byte stream into typed
//! per-pack records.
//!
//! ## Features
//!
//! - Reassembly of vendor frames split across reads, with abandonment of
//!   superseded partial frames
//! - 8-bit frame checksum and table-driven Modbus CRC16
//! - Classification of Modbus write-multiple-registers exchanges, which set
//!   the device addressing context
//! - Config, State and DeviceInfo record decoding from declarative fixed
//!   layouts
//! - An in-memory device table with a pluggable record sink
//! - An async serial read loop built on `tokio-serial`
//!
//! ## Usage
//!
//! ```rust
//! use jkess_rs::{ChunkOutcome, FrameBuilder, ModbusExchange, Pipeline};
//!
//! let mut pipeline = Pipeline::default();
//!
//! // The master addresses pack 2, pack 2 answers with a State frame.
//! pipeline.feed(&ModbusExchange::build_response(2, 0x1620, 1));
//! for read in FrameBuilder::new(2).source(1).put_u8(167, 87).build_fragmented() {
//!     pipeline.feed(&read);
//! }
//!
//! let entry = pipeline.table().get(2).unwrap();
//! assert_eq!(entry.state.as_ref().unwrap().soc, 87);
//! ```

pub mod config;
pub mod constants;
pub mod device_table;
pub mod error;
pub mod jk;
pub mod logging;
pub mod pipeline;
pub mod record;
pub mod util;

pub use crate::config::MonitorConfig;
pub use crate::device_table::{DeviceEntry, DeviceTable, JsonLogSink, RecordSink};
pub use crate::error::JkError;
pub use crate::logging::{init_logger, log_info};
pub use crate::pipeline::{run, ChunkOutcome, Pipeline, PipelineStats};

pub use jk::{
    checksum_mod256, crc16_modbus, AssemblyEvent, ByteSource, Frame, FrameAssembler,
    FrameBuilder, ModbusExchange, RecordSource, RegisterGroup, SerialConfig,
};
pub use record::{decode, DecodeOptions, DecodedFrame, Record, RecordType};
