//! # Link Transport
//!
//! The decoding core only needs an ordered source of byte chunks. This module
//! defines that boundary as the [`ByteSource`] trait and provides the RS485
//! serial implementation on top of `tokio-serial`.
//!
//! Chunk boundaries matter: the vendor protocol counts physical reads, so a
//! source hands out whatever one read delivered without re-chunking.

use crate::error::JkError;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_serial::SerialPortBuilderExt;

/// Ordered source of raw chunks.
#[async_trait]
pub trait ByteSource: Send {
    /// Returns the next chunk.
    ///
    /// `Ok(Some(empty))` means nothing arrived during this poll,
    /// `Ok(None)` means the source is exhausted.
    async fn read_chunk(&mut self) -> Result<Option<Bytes>, JkError>;
}

/// Serial parity setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

impl From<Parity> for tokio_serial::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => tokio_serial::Parity::None,
            Parity::Even => tokio_serial::Parity::Even,
            Parity::Odd => tokio_serial::Parity::Odd,
        }
    }
}

/// Configuration for serial connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baudrate: u32,
    pub parity: Parity,
    /// Upper bound for a single read; must exceed the largest fragment.
    pub read_buffer_size: usize,
    /// Silence after which an empty chunk is reported.
    pub poll_interval_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            port: "/dev/ttyUSB0".to_string(),
            baudrate: 115_200,
            parity: Parity::None,
            read_buffer_size: 1024,
            poll_interval_ms: 50,
        }
    }
}

impl SerialConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// `ByteSource` over any async reader, one chunk per `read` call.
pub struct StreamByteSource<R> {
    reader: R,
    buffer: Vec<u8>,
    poll_interval: Duration,
}

impl<R: AsyncRead + Unpin + Send> StreamByteSource<R> {
    pub fn new(reader: R, read_buffer_size: usize, poll_interval: Duration) -> Self {
        StreamByteSource {
            reader,
            buffer: vec![0u8; read_buffer_size.max(1)],
            poll_interval,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> ByteSource for StreamByteSource<R> {
    async fn read_chunk(&mut self) -> Result<Option<Bytes>, JkError> {
        let read = tokio::time::timeout(self.poll_interval, self.reader.read(&mut self.buffer)).await;
        match read {
            Err(_elapsed) => Ok(Some(Bytes::new())),
            Ok(Ok(0)) => Ok(None),
            Ok(Ok(n)) => Ok(Some(Bytes::copy_from_slice(&self.buffer[..n]))),
            Ok(Err(e)) => Err(JkError::SerialPortError(e.to_string())),
        }
    }
}

/// The RS485 link as a `ByteSource`.
pub type SerialByteSource = StreamByteSource<tokio_serial::SerialStream>;

/// Opens the serial port described by `config` (8 data bits, 1 stop bit).
pub fn open_serial(config: &SerialConfig) -> Result<SerialByteSource, JkError> {
    let port = tokio_serial::new(&config.port, config.baudrate)
        .data_bits(tokio_serial::DataBits::Eight)
        .stop_bits(tokio_serial::StopBits::One)
        .parity(config.parity.into())
        .open_native_async()
        .map_err(|e| JkError::SerialPortError(format!("{}: {}", config.port, e)))?;

    log::info!(
        "Reading from serial port {} at {} baud",
        config.port,
        config.baudrate
    );
    Ok(StreamByteSource::new(
        port,
        config.read_buffer_size,
        config.poll_interval(),
    ))
}
