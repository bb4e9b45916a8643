//! # Modbus Write-Multiple-Registers Classifier
//!
//! The master pack polls slaves with Modbus function 0x10 writes before each
//! slave answers with a vendor frame. Those exchanges share the link with the
//! vendor frames and are recognised purely by their exact length and the
//! function-code byte:
//!
//! - request (11 bytes): `unit fc addr(2) qty(2) count data(count) crc(2)`
//! - response (8 bytes): `unit fc addr(2) qty(2) crc(2)`
//!
//! Multi-byte fields are big-endian as transmitted. The CRC trailer is
//! compared with [`crc16_modbus`] over everything before it.

use crate::constants::{
    MODBUS_FC_WRITE_MULTIPLE, MODBUS_REG_CONFIG, MODBUS_REG_STATE, MODBUS_REQUEST_HEADER_LEN,
    MODBUS_RESPONSE_CRC_SPAN, MODBUS_WRITE_REQUEST_LEN, MODBUS_WRITE_RESPONSE_LEN,
};
use crate::error::JkError;
use crate::jk::checksum::{append_crc16, crc16_modbus};
use nom::{
    bytes::complete::take,
    number::complete::{be_u16, be_u8},
    IResult,
};
use serde::Serialize;
use std::fmt;

/// Direction of a register-write exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExchangeKind {
    Request,
    Response,
}

/// Register group addressed by an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegisterGroup {
    /// `0x161E`: the master asks for configuration data.
    Config,
    /// `0x1620`: the master asks for state data.
    State,
    /// Accepted but not categorised.
    Other(u16),
}

impl RegisterGroup {
    pub fn from_address(address: u16) -> Self {
        match address {
            MODBUS_REG_CONFIG => RegisterGroup::Config,
            MODBUS_REG_STATE => RegisterGroup::State,
            other => RegisterGroup::Other(other),
        }
    }
}

impl fmt::Display for RegisterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterGroup::Config => write!(f, "Config"),
            RegisterGroup::State => write!(f, "State"),
            RegisterGroup::Other(addr) => write!(f, "0x{addr:04X}"),
        }
    }
}

/// One classified register-write request or response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModbusExchange {
    pub kind: ExchangeKind,
    pub unit_id: u8,
    pub function_code: u8,
    pub address: u16,
    pub quantity: u16,
    /// Only present on requests.
    pub byte_count: Option<u8>,
    pub data: Vec<u8>,
    /// CRC as transmitted.
    pub crc: u16,
    /// CRC computed over the covered bytes.
    pub calculated_crc: u16,
}

impl ModbusExchange {
    pub fn group(&self) -> RegisterGroup {
        RegisterGroup::from_address(self.address)
    }

    pub fn crc_ok(&self) -> bool {
        self.crc == self.calculated_crc
    }

    /// Integrity check; a mismatch is informational, never fatal.
    pub fn verify(&self) -> Result<(), JkError> {
        if self.crc_ok() {
            Ok(())
        } else {
            Err(JkError::CrcMismatch {
                expected: self.crc,
                calculated: self.calculated_crc,
            })
        }
    }

    /// Encodes a write-multiple-registers request with a valid CRC.
    pub fn build_request(unit_id: u8, address: u16, quantity: u16, data: &[u8]) -> Vec<u8> {
        let mut out = vec![unit_id, MODBUS_FC_WRITE_MULTIPLE];
        out.extend_from_slice(&address.to_be_bytes());
        out.extend_from_slice(&quantity.to_be_bytes());
        out.push(data.len() as u8);
        out.extend_from_slice(data);
        append_crc16(&out)
    }

    /// Encodes a write-multiple-registers response with a valid CRC.
    pub fn build_response(unit_id: u8, address: u16, quantity: u16) -> Vec<u8> {
        let mut out = vec![unit_id, MODBUS_FC_WRITE_MULTIPLE];
        out.extend_from_slice(&address.to_be_bytes());
        out.extend_from_slice(&quantity.to_be_bytes());
        append_crc16(&out)
    }
}

/// Cheap pre-check: exact request/response length and function code 0x10.
pub fn is_write_exchange(chunk: &[u8]) -> bool {
    matches!(
        chunk.len(),
        MODBUS_WRITE_REQUEST_LEN | MODBUS_WRITE_RESPONSE_LEN
    ) && chunk[1] == MODBUS_FC_WRITE_MULTIPLE
}

/// Classifies a chunk as a register-write exchange.
///
/// Length and function code alone decide; `None` means neither pattern
/// matched. A request whose byte count does not fit its 11 bytes is still a
/// request, its CRC then covers at most the bytes before the trailer and
/// normally fails `verify`.
pub fn classify(chunk: &[u8]) -> Option<ModbusExchange> {
    if !is_write_exchange(chunk) {
        return None;
    }

    let result = match chunk.len() {
        MODBUS_WRITE_REQUEST_LEN => parse_request(chunk),
        _ => parse_response(chunk),
    };
    match result {
        Ok((rest, exchange)) if rest.is_empty() => Some(exchange),
        _ => None,
    }
}

fn parse_header(input: &[u8]) -> IResult<&[u8], (u8, u8, u16, u16)> {
    let (input, unit_id) = be_u8(input)?;
    let (input, function_code) = be_u8(input)?;
    let (input, address) = be_u16(input)?;
    let (input, quantity) = be_u16(input)?;
    Ok((input, (unit_id, function_code, address, quantity)))
}

fn parse_request(chunk: &[u8]) -> IResult<&[u8], ModbusExchange> {
    let (input, (unit_id, function_code, address, quantity)) = parse_header(chunk)?;
    let (input, byte_count) = be_u8(input)?;
    let (input, body) = take(input.len().saturating_sub(2))(input)?;
    let (input, crc) = be_u16(input)?;
    let data = &body[..usize::from(byte_count).min(body.len())];
    let covered = MODBUS_REQUEST_HEADER_LEN + data.len();

    Ok((
        input,
        ModbusExchange {
            kind: ExchangeKind::Request,
            unit_id,
            function_code,
            address,
            quantity,
            byte_count: Some(byte_count),
            data: data.to_vec(),
            crc,
            calculated_crc: crc16_modbus(chunk, covered),
        },
    ))
}

fn parse_response(chunk: &[u8]) -> IResult<&[u8], ModbusExchange> {
    let (input, (unit_id, function_code, address, quantity)) = parse_header(chunk)?;
    let (input, crc) = be_u16(input)?;

    Ok((
        input,
        ModbusExchange {
            kind: ExchangeKind::Response,
            unit_id,
            function_code,
            address,
            quantity,
            byte_count: None,
            data: Vec::new(),
            crc,
            calculated_crc: crc16_modbus(chunk, MODBUS_RESPONSE_CRC_SPAN),
        },
    ))
}
