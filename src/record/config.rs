//! Record type 1: protection thresholds and configuration of one pack.
//!
//! Voltages are in mV, currents in mA, timers in seconds and temperatures in
//! 0.1 °C, as reported by the BMS.

use crate::record::flags::ConfigFlags;

crate::fixed_layout! {
    /// Configuration data (register block 0x1000).
    pub struct ConfigRecord {
        vol_smart_sleep: u32 => 0,
        vol_cell_uv: u32 => 4,
        vol_cell_uv_recover: u32 => 8,
        vol_cell_ov: u32 => 12,
        vol_cell_ov_recover: u32 => 16,
        vol_balance_trigger: u32 => 20,
        vol_soc_full: u32 => 24,
        vol_soc_empty: u32 => 28,
        /// Recommended charge voltage per cell.
        vol_cell_rcv: u32 => 32,
        /// Float voltage per cell.
        vol_cell_rfv: u32 => 36,
        vol_sys_power_off: u32 => 40,
        cur_charge_oc: u32 => 44,
        tim_charge_ocp_delay: u32 => 48,
        tim_charge_ocp_recover: u32 => 52,
        cur_discharge_oc: u32 => 56,
        tim_discharge_ocp_delay: u32 => 60,
        tim_discharge_ocp_recover: u32 => 64,
        tim_scp_recover: u32 => 68,
        cur_balance_max: u32 => 72,
        tmp_charge_ot: i32 => 76,
        tmp_charge_ot_recover: i32 => 80,
        tmp_discharge_ot: i32 => 84,
        tmp_discharge_ot_recover: i32 => 88,
        tmp_charge_ut: i32 => 92,
        tmp_charge_ut_recover: i32 => 96,
        tmp_mos_ot: i32 => 100,
        tmp_mos_ot_recover: i32 => 104,
        cell_count: u32 => 108,
        charge_enabled: u32 => 112,
        discharge_enabled: u32 => 116,
        balance_enabled: u32 => 120,
        /// Nominal capacity in mAh.
        cap_battery_cell: u32 => 124,
        scp_delay: u32 => 128,
        vol_start_balance: u32 => 132,
        /// Connection wire resistance per cell slot, in µΩ.
        cell_wire_resistance: [u32; 32] => 136,
        device_address: u32 => 264,
        tim_precharge: u32 => 268,
        flags: ConfigFlags => 276,
        tim_smart_sleep: u8 => 280,
        field_enable_control: u8 => 281,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::layout::DecodeOptions;

    #[test]
    fn test_layout_has_no_overlaps() {
        let mut fields = ConfigRecord::FIELDS.to_vec();
        fields.sort_by_key(|f| f.offset);
        for pair in fields.windows(2) {
            assert!(pair[0].end() <= pair[1].offset, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
        assert_eq!(ConfigRecord::REQUIRED_LEN, 282);
    }

    #[test]
    fn test_signed_temperature() {
        let mut payload = vec![0u8; ConfigRecord::REQUIRED_LEN];
        payload[92..96].copy_from_slice(&(-100i32).to_le_bytes());
        payload[136..140].copy_from_slice(&1200u32.to_le_bytes());
        let record = ConfigRecord::decode(&payload, &DecodeOptions::default()).unwrap();
        assert_eq!(record.tmp_charge_ut, -100);
        assert_eq!(record.cell_wire_resistance[0], 1200);
        assert_eq!(record.cell_wire_resistance[31], 0);
    }
}
