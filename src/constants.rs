//! JK ESS Protocol Constants
//!
//! Wire-level constants shared by the vendor frame protocol and the Modbus
//! register-write exchanges multiplexed on the same RS485 link.

/// First three bytes of every vendor frame.
pub const JK_MAGIC_PREFIX: [u8; 3] = [0x55, 0xAA, 0xEB];

/// The fourth magic byte as it appears on the wire (`0x90`).
///
/// Only its low nibble is fixed; the high nibble carries the number of
/// additional fragments that complete the frame.
pub const JK_MAGIC_BYTE3: u8 = 0x90;

/// Mask selecting the fixed part of the fourth magic byte.
pub const JK_MAGIC_BYTE3_FIXED_MASK: u8 = 0x0F;

/// Length of the magic prefix including the fragment-count byte.
pub const JK_MAGIC_LEN: usize = 4;

/// Offset of the byte holding the fragment count in its upper nibble.
pub const JK_FRAGMENT_COUNT_OFFSET: usize = 3;

/// Offset of the record-type discriminator.
pub const JK_RECORD_TYPE_OFFSET: usize = 4;

/// Offset of the record-source byte (`0` = master).
pub const JK_RECORD_SOURCE_OFFSET: usize = 5;

/// Offset at which the record payload starts.
pub const JK_PAYLOAD_OFFSET: usize = 6;

/// Offset of the 8-bit checksum byte.
pub const JK_CHECKSUM_OFFSET: usize = 299;

/// Minimum length of a decodable frame.
pub const JK_MIN_FRAME_LEN: usize = 300;

/// Number of leading bytes summed by the 8-bit checksum.
pub const JK_CHECKSUM_SPAN: usize = 299;

/// Device identifier reserved for master-originated frames.
pub const JK_MASTER_DEVICE_ID: u8 = 0;

// ----------------------------------------------------------------------------
// Modbus register-write exchanges
// ----------------------------------------------------------------------------

/// Function code for "write multiple registers".
pub const MODBUS_FC_WRITE_MULTIPLE: u8 = 0x10;

/// Exact length of a write-multiple-registers request on this link.
pub const MODBUS_WRITE_REQUEST_LEN: usize = 11;

/// Exact length of a write-multiple-registers response.
pub const MODBUS_WRITE_RESPONSE_LEN: usize = 8;

/// Request header length before the data bytes (unit, fc, addr, qty, count).
pub const MODBUS_REQUEST_HEADER_LEN: usize = 7;

/// Response length covered by the CRC (unit, fc, addr, qty).
pub const MODBUS_RESPONSE_CRC_SPAN: usize = 6;

/// Register address announcing a configuration-data exchange.
pub const MODBUS_REG_CONFIG: u16 = 0x161E;

/// Register address announcing a state-data exchange.
pub const MODBUS_REG_STATE: u16 = 0x1620;
