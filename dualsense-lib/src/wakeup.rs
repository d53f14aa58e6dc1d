//! Bluetooth wake-up handshake.
//!
//! Right after pairing the DualSense only sends a minimal report with no
//! battery data. Requesting the calibration feature report makes it switch to
//! the expanded report for the rest of the session.

use crate::config::WakeUpConfig;
use crate::error::Error;
use crate::transport::DeviceHandle;
use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, info};

/// How a truncated Bluetooth report is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationRule {
    /// The first byte equals this report ID.
    ReportId(u8),
    /// The power byte is present and zero. Cannot tell a flat battery from a
    /// minimal report, so only useful for firmware without distinct report IDs.
    ZeroPowerField,
}

impl TruncationRule {
    /// Empty reports are never considered truncated; they are read errors.
    pub fn is_truncated(&self, report: &[u8], offset: usize) -> bool {
        match *self {
            TruncationRule::ReportId(id) => report.first() == Some(&id),
            TruncationRule::ZeroPowerField => report.get(offset) == Some(&0),
        }
    }
}

/// A zero-filled buffer of `size` bytes whose first byte is the feature report ID.
pub fn calibration_request(report_id: u8, size: usize) -> Bytes {
    let mut buf = BytesMut::with_capacity(size.max(1));
    buf.put_u8(report_id);
    buf.put_bytes(0, size.saturating_sub(1));
    buf.freeze()
}

/// Ask the controller to start sending expanded reports.
pub fn request_full_report<H: DeviceHandle>(
    handle: &mut H,
    config: &WakeUpConfig,
    report_size: usize,
) -> Result<(), Error> {
    let request = calibration_request(config.feature_report_id, report_size);
    info!("Writing Bluetooth wake-up byte {:#04x}...", config.feature_report_id);
    debug!(bytes = hex::encode(&request), "Feature report");
    handle.send_feature_report(&request)
}
