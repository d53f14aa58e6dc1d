// Report layout constants for the Sony DualSense.
// Offsets and report IDs follow https://controllers.fandom.com/wiki/Sony_DualSense

/// Sony Interactive Entertainment vendor ID
pub const SONY_VID: u16 = 0x054C;

/// DualSense (CFI-ZCT1) product ID
pub const DUALSENSE_PID: u16 = 0x0CE6;

/// Size of the USB input report (report ID 0x01)
pub const USB_REPORT_SIZE: usize = 64;

/// Offset of the power byte in the USB input report
pub const USB_POWER_OFFSET: usize = 53;

/// Size of the expanded Bluetooth input report (report ID 0x31)
pub const BT_REPORT_SIZE: usize = 78;

/// Offset of the power byte in the expanded Bluetooth input report
pub const BT_POWER_OFFSET: usize = 54;

/// Report ID of the expanded Bluetooth input report
pub const BT_FULL_REPORT_ID: u8 = 0x31;

/// Report ID of the minimal Bluetooth report sent right after pairing
pub const BT_MINIMAL_REPORT_ID: u8 = 0x01;

/// Feature report 0x05 (get calibration). Requesting it switches the
/// controller to the expanded Bluetooth report.
pub const CALIBRATION_FEATURE_REPORT_ID: u8 = 0x05;

/// Highest value of the battery level nibble
pub const MAX_BATTERY_LEVEL: u8 = 10;

/// Number of icons in each of the charging / not-charging sets
pub const DEFAULT_ICON_LEVELS: usize = 5;
