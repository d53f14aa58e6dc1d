//! Decoding of the DualSense power byte.
//!
//! The input report carries a single byte describing the battery: the low
//! nibble is a level in `0..=10`, the high nibble a charge state code. The
//! [`Decoder`] turns that byte into a [`PowerStatus`] with a percentage and
//! the index of the icon that best represents it. Decoding never fails; the
//! controller is known to report undefined nibble combinations transiently,
//! so every byte maps to some valid status.

use crate::config::DecoderConfig;
use modular_bitfield::prelude::*;
use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerField {
    pub level: B4,
    pub state: B4,
}

impl From<u8> for PowerField {
    fn from(byte: u8) -> Self {
        PowerField::from_bytes([byte])
    }
}

/// Charge state reported in the high nibble of the power byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoPrimitive, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ChargeState {
    #[strum(to_string = "Discharging")]
    Discharging = 0x0,
    #[strum(to_string = "Charging")]
    Charging = 0x1,
    #[strum(to_string = "Complete")]
    Complete = 0x2,
    #[strum(to_string = "Abnormal voltage")]
    AbnormalVoltage = 0xA,
    #[strum(to_string = "Abnormal temperature")]
    AbnormalTemperature = 0xB,
    // 0xF is the documented charging error; every undefined code lands here too
    #[num_enum(default)]
    #[strum(to_string = "Charging error")]
    ChargingError = 0xF,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PowerStatus {
    /// Battery charge, 0-100
    pub percent: u8,
    pub state: ChargeState,
    /// Index into the icon set, `0..icon_levels`
    pub icon_index: usize,
}

/// Maps power bytes to [`PowerStatus`] values for a fixed level scale and icon count.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl Decoder {
    /// The config is expected to have passed [`DecoderConfig::validate`].
    /// A zero `max_level` or `icon_levels` is treated as 1 rather than dividing by zero.
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config: DecoderConfig {
                max_level: config.max_level.max(1),
                icon_levels: config.icon_levels.max(1),
            },
        }
    }

    /// Decode the power byte found at `offset` in `report`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is out of bounds. Offsets come from a validated
    /// [`ReportLayout`](crate::config::ReportLayout) and reports are length-checked
    /// before decoding, so this only happens on a programming error.
    pub fn decode(&self, report: &[u8], offset: usize) -> PowerStatus {
        self.decode_field(PowerField::from(report[offset]))
    }

    pub fn decode_field(&self, field: PowerField) -> PowerStatus {
        let state = ChargeState::from_primitive(field.state());
        // firmware can report a stale level next to "complete"
        let level = if state == ChargeState::Complete {
            self.config.max_level
        } else {
            field.level().min(self.config.max_level)
        };
        let percent = self.level_to_percent(level);
        PowerStatus {
            percent,
            state,
            icon_index: self.icon_index(percent),
        }
    }

    /// `round(level * 100 / max_level)`, rounding halves up.
    pub fn level_to_percent(&self, level: u8) -> u8 {
        let max = u32::from(self.config.max_level);
        let level = u32::from(level).min(max);
        ((level * 200 + max) / (2 * max)) as u8
    }

    /// Bucket a percentage into `icon_levels` near-equal slices of `0..=100`.
    ///
    /// Each bucket is `101 / icon_levels` wide, so 100 always lands in the
    /// last one. Computed as `percent * icon_levels / 101` to stay in integers.
    pub fn icon_index(&self, percent: u8) -> usize {
        let levels = self.config.icon_levels;
        let percent = usize::from(percent.min(100));
        (percent * levels / 101).min(levels - 1)
    }
}
