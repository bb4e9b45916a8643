//! # Processing Pipeline
//!
//! Routes every chunk read from the link to the component that owns it:
//!
//! 1. a chunk with the vendor magic prefix goes to the reassembler,
//! 2. while an assembly is open every other chunk continues it,
//! 3. otherwise a chunk matching a Modbus register-write pattern is
//!    classified and, if its CRC holds, sets the addressing context,
//! 4. anything else is dropped as unrecognized.
//!
//! Completed frames are decoded with the current addressing context and
//! stored in the [`DeviceTable`]. Every failure is local: it is logged with
//! the raw bytes, counted, and the next chunk is processed normally. Only a
//! transport error ends [`run`].

use crate::device_table::DeviceTable;
use crate::error::JkError;
use crate::jk::assembler::{AssemblyEvent, FrameAssembler};
use crate::jk::frame::{is_magic_prefix, Frame, RecordSource};
use crate::jk::modbus::{classify, ModbusExchange};
use crate::jk::serial::ByteSource;
use crate::logging::{log_raw, log_rejected};
use crate::record::{decode, DecodeOptions, RecordType};
use crate::util::hex::format_hex_compact;
use bytes::Bytes;
use log::{debug, error, info, Level};
use serde::Serialize;

/// What happened to one chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// Zero-length read; nothing changed.
    Empty,
    /// A magic prefix opened an assembly.
    FrameStarted {
        /// `AssemblyAbandoned` when a partial assembly was superseded.
        abandoned: Option<JkError>,
    },
    /// Appended to the open assembly, more fragments outstanding.
    FragmentAccepted,
    /// A frame completed, validated and landed in the device table.
    Decoded {
        device_id: u8,
        record_type: RecordType,
        source: RecordSource,
    },
    /// A frame completed but was discarded.
    Rejected(JkError),
    Modbus(ModbusExchange),
    /// A Modbus exchange whose CRC did not match.
    ModbusRejected(JkError),
    Unrecognized,
}

/// Running counters over the life of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub chunks: u64,
    pub bytes: u64,
    pub frames_completed: u64,
    pub config_records: u64,
    pub state_records: u64,
    pub device_info_records: u64,
    pub checksum_failures: u64,
    pub crc_failures: u64,
    pub decode_failures: u64,
    pub abandoned_assemblies: u64,
    pub unrecognized_chunks: u64,
    pub modbus_exchanges: u64,
}

impl PipelineStats {
    pub fn records_decoded(&self) -> u64 {
        self.config_records + self.state_records + self.device_info_records
    }

    fn count_record(&mut self, record_type: RecordType) {
        match record_type {
            RecordType::Config => self.config_records += 1,
            RecordType::State => self.state_records += 1,
            RecordType::DeviceInfo => self.device_info_records += 1,
        }
    }
}

/// Single-consumer state carried from chunk to chunk.
#[derive(Debug)]
pub struct Pipeline {
    assembler: FrameAssembler,
    table: DeviceTable,
    context_device_id: u8,
    options: DecodeOptions,
    stats: PipelineStats,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}

impl Pipeline {
    pub fn new(options: DecodeOptions) -> Self {
        Self::with_table(options, DeviceTable::new())
    }

    /// Uses a prepared table, e.g. one with a sink installed.
    pub fn with_table(options: DecodeOptions, table: DeviceTable) -> Self {
        Pipeline {
            assembler: FrameAssembler::new(),
            table,
            context_device_id: 0,
            options,
            stats: PipelineStats::default(),
        }
    }

    pub fn table(&self) -> &DeviceTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut DeviceTable {
        &mut self.table
    }

    pub fn into_table(self) -> DeviceTable {
        self.table
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Unit id of the last CRC-valid Modbus exchange (0 before any).
    pub fn context_device_id(&self) -> u8 {
        self.context_device_id
    }

    pub fn is_assembling(&self) -> bool {
        self.assembler.is_assembling()
    }

    /// Processes one chunk exactly as delivered by a single read.
    pub fn feed(&mut self, chunk: &[u8]) -> ChunkOutcome {
        if chunk.is_empty() {
            return ChunkOutcome::Empty;
        }
        self.stats.chunks += 1;
        self.stats.bytes += chunk.len() as u64;

        if is_magic_prefix(chunk) || self.assembler.is_assembling() {
            return match self.assembler.push(chunk) {
                AssemblyEvent::Started { abandoned, .. } => ChunkOutcome::FrameStarted {
                    abandoned: self.note_abandoned(abandoned),
                },
                AssemblyEvent::Fragment { .. } => ChunkOutcome::FragmentAccepted,
                AssemblyEvent::Complete { frame, abandoned } => {
                    self.note_abandoned(abandoned);
                    self.process_frame(frame)
                }
                AssemblyEvent::Ignored => self.unrecognized(chunk),
            };
        }

        match classify(chunk) {
            Some(exchange) => self.process_exchange(exchange, chunk),
            None => self.unrecognized(chunk),
        }
    }

    fn note_abandoned(&mut self, abandoned: Option<Bytes>) -> Option<JkError> {
        let raw = abandoned?;
        self.stats.abandoned_assemblies += 1;
        let err = JkError::AssemblyAbandoned {
            discarded: raw.len(),
        };
        log_raw(Level::Warn, &err.to_string(), &raw);
        Some(err)
    }

    fn process_frame(&mut self, frame: Frame) -> ChunkOutcome {
        self.stats.frames_completed += 1;

        match decode(&frame, self.context_device_id, &self.options) {
            Ok(decoded) => {
                let record_type = decoded.record.record_type();
                info!(
                    "{} record from device {} ({}): {}",
                    record_type,
                    decoded.device_id,
                    decoded.source,
                    decoded.record.summary()
                );
                self.stats.count_record(record_type);
                self.table.upsert(decoded.device_id, decoded.record);
                ChunkOutcome::Decoded {
                    device_id: decoded.device_id,
                    record_type,
                    source: decoded.source,
                }
            }
            Err(err) => {
                match err {
                    JkError::ChecksumMismatch { .. } => self.stats.checksum_failures += 1,
                    _ => self.stats.decode_failures += 1,
                }
                log_rejected(&format!("Frame rejected: {err}"), frame.as_bytes());
                ChunkOutcome::Rejected(err)
            }
        }
    }

    fn process_exchange(&mut self, exchange: ModbusExchange, raw: &[u8]) -> ChunkOutcome {
        self.stats.modbus_exchanges += 1;

        match exchange.verify() {
            Ok(()) => {
                debug!(
                    "Modbus {:?} unit {} register {} qty {}",
                    exchange.kind,
                    exchange.unit_id,
                    exchange.group(),
                    exchange.quantity
                );
                self.context_device_id = exchange.unit_id;
                ChunkOutcome::Modbus(exchange)
            }
            Err(err) => {
                self.stats.crc_failures += 1;
                log_rejected(&format!("Modbus exchange rejected: {err}"), raw);
                ChunkOutcome::ModbusRejected(err)
            }
        }
    }

    fn unrecognized(&mut self, chunk: &[u8]) -> ChunkOutcome {
        self.stats.unrecognized_chunks += 1;
        debug!("Unrecognized chunk: {}", format_hex_compact(chunk));
        ChunkOutcome::Unrecognized
    }
}

/// Polls `source` and feeds every non-empty chunk to `pipeline` in order.
///
/// Returns `Ok(())` once the source is exhausted; a transport error ends the
/// loop and is returned. The pipeline stays with the caller either way.
pub async fn run<S>(source: &mut S, pipeline: &mut Pipeline) -> Result<(), JkError>
where
    S: ByteSource + ?Sized,
{
    loop {
        let chunk = match source.read_chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => {
                info!("Byte source ended");
                return Ok(());
            }
            Err(err) => {
                error!("Transport failed: {err}");
                return Err(err);
            }
        };
        if !chunk.is_empty() {
            pipeline.feed(&chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jk::frame::FrameBuilder;

    #[test]
    fn test_empty_chunk_is_not_counted() {
        let mut pipeline = Pipeline::default();
        assert_eq!(pipeline.feed(&[]), ChunkOutcome::Empty);
        assert_eq!(pipeline.stats().chunks, 0);
    }

    #[test]
    fn test_unrecognized_noise() {
        let mut pipeline = Pipeline::default();
        assert_eq!(pipeline.feed(&[0x01, 0x02, 0x03]), ChunkOutcome::Unrecognized);
        assert_eq!(pipeline.stats().unrecognized_chunks, 1);
        assert!(pipeline.table().is_empty());
    }

    #[test]
    fn test_continuation_wins_over_modbus_pattern() {
        let mut pipeline = Pipeline::default();
        let reads = FrameBuilder::new(2).fragments(2).build_fragmented();
        pipeline.feed(&reads[0]);
        // A Modbus-shaped chunk in the middle of an assembly is payload.
        let response = ModbusExchange::build_response(1, 0x1620, 1);
        assert_eq!(pipeline.feed(&response), ChunkOutcome::FragmentAccepted);
        assert_eq!(pipeline.stats().modbus_exchanges, 0);
        assert_eq!(pipeline.context_device_id(), 0);
    }

    #[test]
    fn test_crc_failure_keeps_context() {
        let mut pipeline = Pipeline::default();
        pipeline.feed(&ModbusExchange::build_response(4, 0x1620, 1));
        assert_eq!(pipeline.context_device_id(), 4);

        let mut bad = ModbusExchange::build_response(6, 0x1620, 1);
        bad[7] ^= 0xFF;
        assert!(matches!(
            pipeline.feed(&bad),
            ChunkOutcome::ModbusRejected(JkError::CrcMismatch { .. })
        ));
        assert_eq!(pipeline.context_device_id(), 4);
        assert_eq!(pipeline.stats().crc_failures, 1);
    }
}
