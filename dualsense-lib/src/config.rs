use crate::constants::*;
use crate::error::Error;
use crate::transport::TransportKind;
use crate::wakeup::TruncationRule;
use std::time::Duration;

/// Where the power byte lives in an input report, and how long that report is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportLayout {
    pub offset: usize,
    pub size: usize,
}

impl ReportLayout {
    pub const fn new(offset: usize, size: usize) -> Self {
        Self { offset, size }
    }

    pub const fn usb() -> Self {
        Self::new(USB_POWER_OFFSET, USB_REPORT_SIZE)
    }

    pub const fn bluetooth() -> Self {
        Self::new(BT_POWER_OFFSET, BT_REPORT_SIZE)
    }

    fn validate(&self, name: &str) -> Result<(), Error> {
        if self.offset >= self.size {
            return Err(Error::InvalidConfig(format!(
                "{name} power offset {} is outside the {}-byte report",
                self.offset, self.size
            )));
        }
        Ok(())
    }
}

/// Device identification and per-transport framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    pub usb: ReportLayout,
    pub bluetooth: ReportLayout,
    /// Pause between opening the device and querying it
    pub settle_delay: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: SONY_VID,
            product_id: DUALSENSE_PID,
            usb: ReportLayout::usb(),
            bluetooth: ReportLayout::bluetooth(),
            settle_delay: Duration::from_secs(1),
        }
    }
}

impl DeviceConfig {
    pub fn with_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
        self
    }

    pub fn with_usb_layout(mut self, layout: ReportLayout) -> Self {
        self.usb = layout;
        self
    }

    pub fn with_bluetooth_layout(mut self, layout: ReportLayout) -> Self {
        self.bluetooth = layout;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Layout for a transport. `None` for [`TransportKind::Unsupported`].
    pub fn layout(&self, kind: TransportKind) -> Option<ReportLayout> {
        match kind {
            TransportKind::Usb => Some(self.usb),
            TransportKind::Bluetooth => Some(self.bluetooth),
            TransportKind::Unsupported => None,
        }
    }
}

/// Scale of the level nibble and number of discrete icon images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub max_level: u8,
    pub icon_levels: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_level: MAX_BATTERY_LEVEL,
            icon_levels: DEFAULT_ICON_LEVELS,
        }
    }
}

impl DecoderConfig {
    pub fn with_icon_levels(mut self, icon_levels: usize) -> Self {
        self.icon_levels = icon_levels;
        self
    }

    pub fn with_max_level(mut self, max_level: u8) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_level == 0 {
            return Err(Error::InvalidConfig("max_level must be at least 1".to_string()));
        }
        // icon buckets are 101/n wide, so more than 101 would leave the top one unreachable
        if !(1..=101).contains(&self.icon_levels) {
            return Err(Error::InvalidConfig(format!(
                "icon_levels must be within 1..=101, got {}",
                self.icon_levels
            )));
        }
        Ok(())
    }
}

/// Bluetooth wake-up behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeUpConfig {
    pub feature_report_id: u8,
    pub truncation: TruncationRule,
    /// Feature reports sent per cycle before giving up on the session
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for WakeUpConfig {
    fn default() -> Self {
        Self {
            feature_report_id: CALIBRATION_FEATURE_REPORT_ID,
            truncation: TruncationRule::ReportId(BT_MINIMAL_REPORT_ID),
            max_attempts: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl WakeUpConfig {
    pub fn with_truncation(mut self, rule: TruncationRule) -> Self {
        self.truncation = rule;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Everything the poll loop needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub device: DeviceConfig,
    pub decoder: DecoderConfig,
    pub wakeup: WakeUpConfig,
    /// Sleep before every acquisition attempt
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            decoder: DecoderConfig::default(),
            wakeup: WakeUpConfig::default(),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl MonitorConfig {
    /// All delays set to zero. Handy for driving the loop from tests.
    pub fn immediate() -> Self {
        let defaults = Self::default();
        Self {
            device: defaults.device.with_settle_delay(Duration::ZERO),
            wakeup: defaults.wakeup.with_retry_delay(Duration::ZERO),
            poll_interval: Duration::ZERO,
            ..defaults
        }
    }

    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    pub fn with_decoder(mut self, decoder: DecoderConfig) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_wakeup(mut self, wakeup: WakeUpConfig) -> Self {
        self.wakeup = wakeup;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.decoder.validate()?;
        self.device.usb.validate("USB")?;
        self.device.bluetooth.validate("Bluetooth")?;
        if self.wakeup.max_attempts == 0 {
            return Err(Error::InvalidConfig("wake-up max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}
