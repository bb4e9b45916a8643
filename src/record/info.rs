//! Record type 3: identification of one pack.

use crate::record::layout::FixedStr;

crate::fixed_layout! {
    /// Device details (register block 0x1400).
    pub struct DeviceInfoRecord {
        manufacturer_device_id: FixedStr<16> => 0,
        hardware_version: FixedStr<8> => 16,
        software_version: FixedStr<8> => 24,
        /// Operating time in seconds.
        odd_run_time: u32 => 32,
        power_on_times: u32 => 36,
    }
}
