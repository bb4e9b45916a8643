//! Record type 2: live measurements of one pack.
//!
//! The BMS reserves 32 cell slots for voltages and wire resistances; only the
//! first 16 are populated on the packs this link carries, so only those are
//! kept. Presence and wire-resistance status still cover all 32 slots.

use crate::record::flags::{AlarmFlags, CellMask, TempSensorAbsence};

/// Cell slots retained from the voltage and resistance arrays.
pub const RETAINED_CELLS: usize = 16;

crate::fixed_layout! {
    /// State data (register block 0x1200).
    pub struct StateRecord {
        /// Cell voltages in mV.
        cell_voltages: [u16; RETAINED_CELLS] => 0,
        cell_present: CellMask => 64,
        cell_voltage_avg: u16 => 68,
        cell_voltage_diff_max: u16 => 70,
        max_voltage_cell: u8 => 72,
        min_voltage_cell: u8 => 73,
        /// Balance wire resistance per cell, in mΩ.
        cell_wire_resistance: [u16; RETAINED_CELLS] => 74,
        temp_mos: i16 => 138,
        wire_resistance_alarm: CellMask => 140,
        /// Pack voltage in mV.
        battery_voltage: u32 => 144,
        /// Pack power in mW.
        battery_power: u32 => 148,
        /// Pack current in mA; negative while discharging.
        battery_current: i32 => 152,
        temp_battery_1: i16 => 156,
        temp_battery_2: i16 => 158,
        alarms: AlarmFlags => 160,
        balance_current: i16 => 164,
        /// 0 = off, 1 = charging, 2 = discharging.
        balance_state: u8 => 166,
        /// State of charge in percent.
        soc: u8 => 167,
        soc_capacity_remaining: i32 => 168,
        soc_full_charge_capacity: u32 => 172,
        soc_cycle_count: u32 => 176,
        soc_cycle_capacity: u32 => 180,
        /// State of health in percent.
        soh: u8 => 184,
        precharge: u8 => 185,
        user_alarm: u16 => 186,
        run_time: u32 => 188,
        charge_on: u8 => 192,
        discharge_on: u8 => 193,
        user_alarm_2: u16 => 194,
        time_discharge_ocp_recover: u16 => 196,
        time_discharge_scp_recover: u16 => 198,
        time_charge_ocp_recover: u16 => 200,
        time_charge_scp_recover: u16 => 202,
        time_uvp_recover: u16 => 204,
        time_ovp_recover: u16 => 206,
        temp_sensor_absent: TempSensorAbsence => 208,
        heating: u8 => 209,
        time_emergency: u16 => 212,
        discharge_current_correction: u16 => 214,
        charge_current_voltage: u16 => 216,
        discharge_current_voltage: u16 => 218,
        /// Calibration factor; byte order follows `DecodeOptions`.
        voltage_correction: f32 => 220,
        /// Pack voltage in 10 mV units.
        battery_voltage_short: u16 => 228,
        heat_current: i16 => 230,
        rvd: u8 => 238,
        charger_plugged: u8 => 239,
        sys_run_ticks: u32 => 240,
        temp_battery_3: i16 => 248,
        temp_battery_4: i16 => 250,
        temp_battery_5: i16 => 252,
        rtc_ticks: u32 => 256,
        time_enter_sleep: u32 => 264,
        pcl_module_state: u8 => 268,
        rvd_2: u8 => 269,
    }
}

impl StateRecord {
    pub fn is_charging(&self) -> bool {
        self.battery_current > 0
    }

    /// Highest and lowest voltage among cells flagged present.
    pub fn cell_voltage_range(&self) -> Option<(u16, u16)> {
        let present = self
            .cell_present
            .iter_set()
            .filter(|&cell| cell < RETAINED_CELLS)
            .map(|cell| self.cell_voltages[cell]);
        present.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((hi, lo)) => Some((hi.max(v), lo.min(v))),
        })
    }
}
