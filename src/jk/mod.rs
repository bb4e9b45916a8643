//! The jk module contains the components responsible for the link-level
//! protocol: integrity checks, vendor frame reassembly, Modbus exchange
//! classification and the serial transport boundary.

pub mod assembler;
pub mod checksum;
pub mod frame;
pub mod modbus;
pub mod serial;
pub mod serial_mock;

pub use assembler::{AssemblyEvent, FrameAssembler};
pub use checksum::{checksum_mod256, crc16_modbus};
pub use frame::{Frame, FrameBuilder, RecordSource};
pub use modbus::{classify, ExchangeKind, ModbusExchange, RegisterGroup};
pub use serial::{open_serial, ByteSource, SerialByteSource, SerialConfig, StreamByteSource};
pub use serial_mock::MockByteSource;
