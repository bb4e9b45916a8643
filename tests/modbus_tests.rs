//! Tests for classification of Modbus register-write exchanges.

use jkess_rs::jk::modbus::{classify, is_write_exchange, ExchangeKind};
use jkess_rs::util::hex::decode_hex;
use jkess_rs::{JkError, ModbusExchange, RegisterGroup};

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    decode_hex(hex).unwrap()
}

/// Tests a captured config-data request from the master to unit 1.
#[test]
fn test_config_request() {
    let exchange = classify(&hex_to_bytes("01 10 16 1E 00 01 02 00 00 D2 2F")).unwrap();
    assert_eq!(exchange.kind, ExchangeKind::Request);
    assert_eq!(exchange.unit_id, 1);
    assert_eq!(exchange.function_code, 0x10);
    assert_eq!(exchange.address, 0x161E);
    assert_eq!(exchange.quantity, 1);
    assert_eq!(exchange.byte_count, Some(2));
    assert_eq!(exchange.data, vec![0x00, 0x00]);
    assert_eq!(exchange.crc, 0xD22F);
    assert_eq!(exchange.group(), RegisterGroup::Config);
    assert!(exchange.verify().is_ok());
}

/// Tests a captured state-data response from unit 2.
#[test]
fn test_state_response() {
    let exchange = classify(&hex_to_bytes("02 10 16 20 00 01 04 78")).unwrap();
    assert_eq!(exchange.kind, ExchangeKind::Response);
    assert_eq!(exchange.unit_id, 2);
    assert_eq!(exchange.byte_count, None);
    assert!(exchange.data.is_empty());
    assert_eq!(exchange.group(), RegisterGroup::State);
    assert!(exchange.crc_ok());
}

/// Tests that a corrupted trailer is reported as a CRC mismatch, not dropped.
#[test]
fn test_crc_mismatch_is_reported() {
    let exchange = classify(&hex_to_bytes("01 10 16 1E 00 01 65 88")).unwrap();
    assert!(!exchange.crc_ok());
    assert_eq!(
        exchange.verify(),
        Err(JkError::CrcMismatch {
            expected: 0x6588,
            calculated: 0x6587
        })
    );
}

/// Tests that other register addresses are accepted without a group.
#[test]
fn test_uncategorised_address() {
    let bytes = ModbusExchange::build_response(3, 0x1000, 2);
    let exchange = classify(&bytes).unwrap();
    assert_eq!(exchange.group(), RegisterGroup::Other(0x1000));
    assert_eq!(exchange.group().to_string(), "0x1000");
    assert!(exchange.crc_ok());
}

/// Tests that lengths other than 8 and 11 are never classified.
#[test]
fn test_length_gate() {
    let response = ModbusExchange::build_response(1, 0x1620, 1);
    assert!(is_write_exchange(&response));
    assert!(classify(&response[..7]).is_none());

    let mut longer = response.clone();
    longer.push(0x00);
    assert!(classify(&longer).is_none());
    assert!(classify(&[]).is_none());
}

/// Tests that builders reproduce the captured bytes.
#[test]
fn test_builders_match_capture() {
    assert_eq!(
        ModbusExchange::build_request(2, 0x1620, 1, &[0x00, 0x00]),
        hex_to_bytes("02 10 16 20 00 01 02 00 00 C2 01")
    );
    assert_eq!(
        ModbusExchange::build_response(1, 0x161E, 1),
        hex_to_bytes("01 10 16 1E 00 01 65 87")
    );
}
