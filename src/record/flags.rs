//! Bit-packed flag sets carried in Config and State records.
//!
//! Each set is read as a little-endian integer, so bit `i` is bit `i % 8` of
//! byte `i / 8`. Reserved bits are retained verbatim and exposed through
//! `bits()`.

use crate::record::layout::{take, DecodeOptions, Wire};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Feature switches of a Config record (10 named bits, 6 reserved).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ConfigFlags: u16 {
        const HEAT_ENABLED = 1 << 0;
        const DISABLE_TEMP_SENSOR = 1 << 1;
        const GPS_HEARTBEAT = 1 << 2;
        /// Set: RS485, clear: CAN.
        const PORT_SWITCH = 1 << 3;
        const LCD_ALWAYS_ON = 1 << 4;
        const SPECIAL_CHARGER = 1 << 5;
        const SMART_SLEEP = 1 << 6;
        const DISABLE_PCL_MODULE = 1 << 7;
        const TIMED_STORED_DATA = 1 << 8;
        const CHARGING_FLOAT_MODE = 1 << 9;
    }
}

bitflags! {
    /// Protection alarms of a State record (24 named bits).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AlarmFlags: u32 {
        const WIRE_RESISTANCE = 1 << 0;
        const MOS_OVER_TEMP = 1 << 1;
        const CELL_QUANTITY = 1 << 2;
        const CURRENT_SENSOR_ERROR = 1 << 3;
        const CELL_OVER_VOLTAGE = 1 << 4;
        const BATTERY_OVER_VOLTAGE = 1 << 5;
        const CHARGE_OVER_CURRENT = 1 << 6;
        const CHARGE_SHORT_CIRCUIT = 1 << 7;
        const CHARGE_OVER_TEMP = 1 << 8;
        const CHARGE_UNDER_TEMP = 1 << 9;
        const CPU_AUX_COMM_ERROR = 1 << 10;
        const CELL_UNDER_VOLTAGE = 1 << 11;
        const BATTERY_UNDER_VOLTAGE = 1 << 12;
        const DISCHARGE_OVER_CURRENT = 1 << 13;
        const DISCHARGE_SHORT_CIRCUIT = 1 << 14;
        const DISCHARGE_OVER_TEMP = 1 << 15;
        const CHARGE_MOS = 1 << 16;
        const DISCHARGE_MOS = 1 << 17;
        const GPS_DISCONNECTED = 1 << 18;
        const MODIFY_PASSWORD_IN_TIME = 1 << 19;
        const DISCHARGE_ON_FAILED = 1 << 20;
        const BATTERY_OVER_TEMP = 1 << 21;
        const TEMP_SENSOR_ANOMALY = 1 << 22;
        const PLC_MODULE_ANOMALY = 1 << 23;
    }
}

bitflags! {
    /// Temperature-sensor absence bits of a State record (6 named bits).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TempSensorAbsence: u8 {
        const MOS_SENSOR = 1 << 0;
        const BATTERY_SENSOR_1 = 1 << 1;
        const BATTERY_SENSOR_2 = 1 << 2;
        const BATTERY_SENSOR_3 = 1 << 3;
        const BATTERY_SENSOR_4 = 1 << 4;
        const BATTERY_SENSOR_5 = 1 << 5;
    }
}

macro_rules! impl_wire_flags {
    ($($flags:ty: $raw:ty),* $(,)?) => {
        $(
            impl Wire for $flags {
                const WIDTH: usize = std::mem::size_of::<$raw>();

                fn read(bytes: &[u8], _opts: &DecodeOptions) -> Option<Self> {
                    take(bytes).map(|raw| <$flags>::from_bits_retain(<$raw>::from_le_bytes(raw)))
                }
            }
        )*
    };
}

impl_wire_flags!(ConfigFlags: u16, AlarmFlags: u32, TempSensorAbsence: u8);

/// One bit per cell slot (32 slots), e.g. cell presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct CellMask(u32);

impl CellMask {
    pub const SLOTS: usize = 32;

    pub const fn from_bits(bits: u32) -> Self {
        CellMask(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Whether slot `cell` is set; out-of-range slots read as clear.
    pub fn is_set(&self, cell: usize) -> bool {
        cell < Self::SLOTS && self.0 & (1 << cell) != 0
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Indices of the set slots in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        (0..Self::SLOTS).filter(move |&cell| self.is_set(cell))
    }

    pub fn to_array(&self) -> [bool; 32] {
        let mut out = [false; 32];
        for (cell, slot) in out.iter_mut().enumerate() {
            *slot = self.is_set(cell);
        }
        out
    }
}

impl Wire for CellMask {
    const WIDTH: usize = 4;

    fn read(bytes: &[u8], _opts: &DecodeOptions) -> Option<Self> {
        take(bytes).map(|raw| CellMask(u32::from_le_bytes(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_mask_bit_order() {
        // bit 0 = LSB of first byte, bit 9 = bit 1 of second byte
        let mask = CellMask::read(&[0x01, 0x02, 0x00, 0x80], &DecodeOptions::default()).unwrap();
        assert!(mask.is_set(0));
        assert!(!mask.is_set(1));
        assert!(mask.is_set(9));
        assert!(mask.is_set(31));
        assert!(!mask.is_set(32));
        assert_eq!(mask.iter_set().collect::<Vec<_>>(), vec![0, 9, 31]);
        assert_eq!(mask.count(), 3);
    }

    #[test]
    fn test_config_flags_keep_reserved_bits() {
        let flags = ConfigFlags::read(&[0x41, 0x82], &DecodeOptions::default()).unwrap();
        assert!(flags.contains(ConfigFlags::HEAT_ENABLED));
        assert!(flags.contains(ConfigFlags::SMART_SLEEP));
        assert!(flags.contains(ConfigFlags::CHARGING_FLOAT_MODE));
        assert!(!flags.contains(ConfigFlags::GPS_HEARTBEAT));
        assert_eq!(flags.bits(), 0x8241);
    }

    #[test]
    fn test_alarm_flags_third_byte() {
        let flags = AlarmFlags::read(&[0x00, 0x00, 0x81, 0x00], &DecodeOptions::default()).unwrap();
        assert_eq!(
            flags,
            AlarmFlags::CHARGE_MOS | AlarmFlags::PLC_MODULE_ANOMALY
        );
    }

    #[test]
    fn test_temp_sensor_absence() {
        let flags = TempSensorAbsence::read(&[0b0010_0001], &DecodeOptions::default()).unwrap();
        assert!(flags.contains(TempSensorAbsence::MOS_SENSOR));
        assert!(flags.contains(TempSensorAbsence::BATTERY_SENSOR_5));
        assert_eq!(flags.iter_names().count(), 2);
    }
}
