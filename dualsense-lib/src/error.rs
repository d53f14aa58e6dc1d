use crate::transport::BusType;
use hidapi::HidError;
use thiserror::Error;

/// The primary error type for the `dualsense-lib` library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("HID subsystem failed to initialize: {0}")]
    HidInit(#[source] HidError),

    #[error("Controller {vendor_id:04x}:{product_id:04x} not found. Is the DualSense connected?")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    #[error("Device info error: {0}")]
    DeviceInfo(#[source] HidError),

    #[error("Unsupported transport: {0}")]
    UnsupportedTransport(BusType),

    #[error("Non-blocking mode error: {0}")]
    ConfigurationFailed(#[source] HidError),

    #[error("Read error: {0}")]
    ReadFailed(#[source] HidError),

    #[error("Read error: device returned an empty report")]
    EmptyRead,

    #[error("Read error: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Write error: {0}")]
    WriteFailed(#[source] HidError),

    #[error("Bluetooth report still truncated after {attempts} wake-up request(s)")]
    ReportTruncated { attempts: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Errors that must stop the process instead of feeding the retry loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::HidInit(_) | Error::InvalidConfig(_))
    }
}
