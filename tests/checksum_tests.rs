//! Tests for the frame checksum and the Modbus CRC16.

use jkess_rs::jk::checksum::{append_crc16, checksum_mod256, crc16_modbus};
use jkess_rs::util::hex::decode_hex;
use jkess_rs::JkError;
use proptest::prelude::*;

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    decode_hex(hex).unwrap()
}

/// Tests the CRC16 against vectors computed with the reference tables.
#[test]
fn test_crc16_golden_vectors() {
    let vectors: &[(&[u8], u16)] = &[
        (&[], 0xFFFF),
        (&[0x00], 0xBF40),
        (&[0x00; 8], 0x400B),
        (&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A], 0xC5CD),
        (b"123456789", 0x374B),
    ];
    for (input, expected) in vectors {
        assert_eq!(
            crc16_modbus(input, input.len()),
            *expected,
            "input {input:02X?}"
        );
    }
}

/// Tests that captured request/response trailers verify.
#[test]
fn test_crc16_captured_exchanges() {
    for hex in [
        "01 10 16 1E 00 01 02 00 00 D2 2F",
        "01 10 16 1E 00 01 65 87",
        "02 10 16 20 00 01 02 00 00 C2 01",
        "02 10 16 20 00 01 04 78",
    ] {
        let bytes = hex_to_bytes(hex);
        let covered = bytes.len() - 2;
        let stored = u16::from_be_bytes([bytes[covered], bytes[covered + 1]]);
        assert_eq!(crc16_modbus(&bytes, covered), stored, "{hex}");
    }
}

/// Tests that `length` limits the bytes covered by the CRC.
#[test]
fn test_crc16_respects_length() {
    let bytes = hex_to_bytes("01 03 00 00 00 0A FF FF");
    assert_eq!(crc16_modbus(&bytes, 6), 0xC5CD);
    assert_eq!(crc16_modbus(&bytes, 0), 0xFFFF);
}

/// Tests that the checksum rejects buffers shorter than 300 bytes.
#[test]
fn test_checksum_rejects_short_buffer() {
    assert_eq!(
        checksum_mod256(&[0u8; 299]),
        Err(JkError::OutOfRange {
            len: 299,
            required: 300
        })
    );
    assert_eq!(checksum_mod256(&[0u8; 300]), Ok(0));
}

/// Tests that the checksum covers exactly bytes 0..299.
#[test]
fn test_checksum_window() {
    let mut frame = vec![0u8; 310];
    frame[0] = 0x55;
    frame[298] = 0x01;
    frame[299] = 0xEE;
    frame[305] = 0x77;
    assert_eq!(checksum_mod256(&frame), Ok(0x56));
}

proptest! {
    #[test]
    fn prop_checksum_is_pure(frame in proptest::collection::vec(any::<u8>(), 300..400)) {
        prop_assert_eq!(checksum_mod256(&frame), checksum_mod256(&frame));
        let expected = frame[..299].iter().map(|&b| b as u32).sum::<u32>() % 256;
        prop_assert_eq!(checksum_mod256(&frame).unwrap() as u32, expected);
    }

    #[test]
    fn prop_appended_crc_verifies(data in proptest::collection::vec(any::<u8>(), 0..64)) {
        let framed = append_crc16(&data);
        let stored = u16::from_be_bytes([framed[data.len()], framed[data.len() + 1]]);
        prop_assert_eq!(crc16_modbus(&framed, data.len()), stored);
    }
}
