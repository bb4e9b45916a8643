//! Tests for decoding validated frames into Config, State and DeviceInfo
//! records.

use jkess_rs::record::{AlarmFlags, ConfigFlags, FloatByteOrder, TempSensorAbsence};
use jkess_rs::{
    decode, DecodeOptions, DeviceTable, Frame, FrameBuilder, JkError, Record, RecordSource,
    RecordType,
};

fn decode_default(bytes: Vec<u8>, context: u8) -> Result<jkess_rs::DecodedFrame, JkError> {
    decode(&Frame::new(bytes), context, &DecodeOptions::default())
}

/// Tests that a synthetic State frame yields the values written at each offset.
#[test]
fn test_state_record_roundtrip() {
    let bytes = FrameBuilder::new(2)
        .source(1)
        .put_u16(0, 3300)
        .put_u16(30, 3290)
        .put_u32(64, 0x0000_FFFF)
        .put_u16(68, 3295)
        .put_u8(72, 1)
        .put_u8(73, 16)
        .put_i16(138, 215)
        .put_u32(144, 52_800)
        .put_i32(152, -4_250)
        .put_u32(160, (AlarmFlags::CELL_OVER_VOLTAGE | AlarmFlags::CHARGE_MOS).bits())
        .put_u8(167, 87)
        .put_u32(176, 42)
        .put_u8(184, 100)
        .put_u8(208, TempSensorAbsence::BATTERY_SENSOR_2.bits())
        .put_bytes(220, &0.995f32.to_be_bytes())
        .put_u32(256, 123_456)
        .put_u8(269, 7)
        .build();

    let decoded = decode_default(bytes, 1).unwrap();
    assert_eq!(decoded.device_id, 1);
    assert_eq!(decoded.source, RecordSource::Slave);

    let state = match decoded.record {
        Record::State(state) => state,
        other => panic!("expected State, got {:?}", other.record_type()),
    };
    assert_eq!(state.cell_voltages[0], 3300);
    assert_eq!(state.cell_voltages[15], 3290);
    assert_eq!(state.soc, 87);
    assert_eq!(state.cell_present.count(), 16);
    assert_eq!(state.cell_voltage_avg, 3295);
    assert_eq!((state.max_voltage_cell, state.min_voltage_cell), (1, 16));
    assert_eq!(state.temp_mos, 215);
    assert_eq!(state.battery_voltage, 52_800);
    assert_eq!(state.battery_current, -4_250);
    assert!(state.alarms.contains(AlarmFlags::CELL_OVER_VOLTAGE));
    assert!(state.alarms.contains(AlarmFlags::CHARGE_MOS));
    assert!(!state.alarms.contains(AlarmFlags::DISCHARGE_MOS));
    assert_eq!(state.soc_cycle_count, 42);
    assert_eq!(state.soh, 100);
    assert_eq!(state.temp_sensor_absent, TempSensorAbsence::BATTERY_SENSOR_2);
    assert_eq!(state.voltage_correction, 0.995);
    assert_eq!(state.rtc_ticks, 123_456);
    assert_eq!(state.rvd_2, 7);
}

/// Tests that a Config frame decodes thresholds, flags and the address.
#[test]
fn test_config_record() {
    let bytes = FrameBuilder::new(1)
        .source(0)
        .put_u32(4, 2_600)
        .put_u32(12, 3_650)
        .put_i32(92, -50)
        .put_u32(108, 16)
        .put_u32(264, 3)
        .put_u16(276, (ConfigFlags::HEAT_ENABLED | ConfigFlags::PORT_SWITCH).bits())
        .put_u8(280, 24)
        .put_u8(281, 0xA5)
        .build();

    let decoded = decode_default(bytes, 9).unwrap();
    let config = match decoded.record {
        Record::Config(config) => config,
        other => panic!("expected Config, got {:?}", other.record_type()),
    };
    assert_eq!(config.vol_cell_uv, 2_600);
    assert_eq!(config.vol_cell_ov, 3_650);
    assert_eq!(config.tmp_charge_ut, -50);
    assert_eq!(config.cell_count, 16);
    assert_eq!(config.device_address, 3);
    assert_eq!(
        config.flags,
        ConfigFlags::HEAT_ENABLED | ConfigFlags::PORT_SWITCH
    );
    assert_eq!(config.tim_smart_sleep, 24);
    assert_eq!(config.field_enable_control, 0xA5);
}

/// Tests that a DeviceInfo frame yields trimmed strings and counters.
#[test]
fn test_device_info_record() {
    let bytes = FrameBuilder::new(3)
        .source(2)
        .put_bytes(0, b"JK_PB2A16S15P")
        .put_bytes(16, b"19A")
        .put_bytes(24, b"19.08")
        .put_u32(32, 86_400)
        .put_u32(36, 12)
        .build();

    let decoded = decode_default(bytes, 2).unwrap();
    match decoded.record {
        Record::DeviceInfo(info) => {
            assert_eq!(info.manufacturer_device_id.as_str(), "JK_PB2A16S15P");
            assert_eq!(info.hardware_version.as_str(), "19A");
            assert_eq!(info.software_version.as_str(), "19.08");
            assert_eq!(info.odd_run_time, 86_400);
            assert_eq!(info.power_on_times, 12);
        }
        other => panic!("expected DeviceInfo, got {:?}", other.record_type()),
    }
}

/// Tests that a master frame is always attributed to device 0.
#[test]
fn test_master_source_overrides_context() {
    for context in [0u8, 1, 5, 255] {
        let bytes = FrameBuilder::new(2).source(0).build();
        let decoded = decode_default(bytes, context).unwrap();
        assert_eq!(decoded.device_id, 0);
        assert_eq!(decoded.source, RecordSource::Master);
    }
}

/// Tests that a corrupted checksum fails and leaves the table untouched.
#[test]
fn test_corrupted_checksum() {
    let mut bytes = FrameBuilder::new(2).source(1).put_u8(167, 87).build();
    bytes[299] ^= 0x01;
    let stored = bytes[299];

    let mut table = DeviceTable::new();
    match decode_default(bytes, 1) {
        Ok(decoded) => table.upsert(decoded.device_id, decoded.record),
        Err(err) => assert_eq!(
            err,
            JkError::ChecksumMismatch {
                expected: stored,
                calculated: stored ^ 0x01
            }
        ),
    }
    assert!(table.is_empty());
}

/// Tests that an unknown record type is a decode error.
#[test]
fn test_unknown_record_type() {
    let bytes = FrameBuilder::new(9).build();
    assert_eq!(decode_default(bytes, 0), Err(JkError::UnknownRecordType(9)));
}

/// Tests that the type byte is covered by the checksum, so retyping a frame
/// only decodes once the checksum is recomputed.
#[test]
fn test_retyped_frame_needs_fresh_checksum() {
    let mut bytes = FrameBuilder::new(9).build();
    bytes[4] = 2;
    assert!(matches!(
        decode_default(bytes.clone(), 0),
        Err(JkError::ChecksumMismatch { .. })
    ));

    bytes[299] = bytes[..299].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    let decoded = decode_default(bytes, 0).unwrap();
    assert_eq!(decoded.record.record_type(), RecordType::State);
}

/// Tests that a frame under 300 bytes is rejected before the checksum.
#[test]
fn test_short_frame() {
    let bytes = FrameBuilder::new(2).build()[..299].to_vec();
    assert_eq!(
        decode_default(bytes, 0),
        Err(JkError::FrameTooShort { len: 299 })
    );
}

/// Tests that frames longer than 300 bytes decode with the checksum at 299.
#[test]
fn test_oversized_frame() {
    let bytes = FrameBuilder::new(2).total_len(308).put_u8(167, 55).build();
    let decoded = decode_default(bytes, 0).unwrap();
    assert_eq!(decoded.record.record_type(), RecordType::State);
}

/// Tests that a short payload fails the whole record.
#[test]
fn test_truncated_payload() {
    let err = Record::decode_payload(RecordType::Config, &[0u8; 281], &DecodeOptions::default())
        .unwrap_err();
    assert_eq!(
        err,
        JkError::TruncatedPayload {
            needed: 282,
            actual: 281
        }
    );
}

/// Tests that the float byte-order knob reaches the State decoder.
#[test]
fn test_little_endian_correction_factor() {
    let bytes = FrameBuilder::new(2)
        .put_bytes(220, &1.25f32.to_le_bytes())
        .build();
    let opts = DecodeOptions {
        float_byte_order: FloatByteOrder::Little,
    };
    match decode(&Frame::new(bytes), 0, &opts).unwrap().record {
        Record::State(state) => assert_eq!(state.voltage_correction, 1.25),
        other => panic!("expected State, got {:?}", other.record_type()),
    }
}
