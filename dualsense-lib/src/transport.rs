use crate::config::DeviceConfig;
use crate::error::Error;
use hidapi::{HidApi, HidDevice};
use strum_macros::Display;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bus reported by the HID layer for an open device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BusType {
    #[strum(to_string = "USB")]
    Usb,
    #[strum(to_string = "Bluetooth")]
    Bluetooth,
    #[strum(to_string = "I2C")]
    I2c,
    #[strum(to_string = "SPI")]
    Spi,
    #[strum(to_string = "Unknown")]
    Unknown,
}

impl From<hidapi::BusType> for BusType {
    fn from(bus: hidapi::BusType) -> Self {
        #[allow(unreachable_patterns)]
        match bus {
            hidapi::BusType::Usb => BusType::Usb,
            hidapi::BusType::Bluetooth => BusType::Bluetooth,
            hidapi::BusType::I2c => BusType::I2c,
            hidapi::BusType::Spi => BusType::Spi,
            _ => BusType::Unknown,
        }
    }
}

/// The link the controller talks over. Selects report size and power byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransportKind {
    #[strum(to_string = "USB")]
    Usb,
    #[strum(to_string = "Bluetooth")]
    Bluetooth,
    #[strum(to_string = "Unsupported")]
    Unsupported,
}

impl From<BusType> for TransportKind {
    fn from(bus: BusType) -> Self {
        match bus {
            BusType::Usb => TransportKind::Usb,
            BusType::Bluetooth => TransportKind::Bluetooth,
            BusType::I2c | BusType::Spi | BusType::Unknown => TransportKind::Unsupported,
        }
    }
}

/// An open connection to the controller. Dropping the handle closes it.
pub trait DeviceHandle {
    fn bus_type(&self) -> Result<BusType, Error>;

    fn set_nonblocking(&mut self) -> Result<(), Error>;

    /// Read one input report into `buf`, returning the number of bytes written.
    /// In non-blocking mode `Ok(0)` means no report was pending.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

    fn send_feature_report(&mut self, data: &[u8]) -> Result<(), Error>;
}

/// Source of device handles. Opens the first device matching its configuration.
pub trait Transport {
    type Handle: DeviceHandle;

    fn open(&mut self) -> Result<Self::Handle, Error>;
}

/// [`Transport`] backed by the system HID library.
pub struct HidTransport {
    api: HidApi,
    vendor_id: u16,
    product_id: u16,
}

impl HidTransport {
    /// Initialize the HID subsystem. A failure here is not worth retrying.
    pub fn new(config: &DeviceConfig) -> Result<Self, Error> {
        let api = HidApi::new().map_err(Error::HidInit)?;
        info!("HID subsystem initialized");
        Ok(Self {
            api,
            vendor_id: config.vendor_id,
            product_id: config.product_id,
        })
    }

    /// Every HID interface currently visible for the configured vendor ID.
    pub fn matching_devices(&mut self) -> Result<Vec<DeviceSummary>, Error> {
        self.api.refresh_devices().map_err(Error::DeviceInfo)?;
        let devices = self
            .api
            .device_list()
            .filter(|d| d.vendor_id() == self.vendor_id)
            .map(|d| DeviceSummary {
                vendor_id: d.vendor_id(),
                product_id: d.product_id(),
                bus: BusType::from(d.bus_type()),
                product: d.product_string().map(str::to_string),
                path: d.path().to_string_lossy().into_owned(),
                selected: d.product_id() == self.product_id,
            })
            .collect();
        Ok(devices)
    }
}

impl Transport for HidTransport {
    type Handle = HidHandle;

    fn open(&mut self) -> Result<HidHandle, Error> {
        debug!("Opening controller device {:04x}:{:04x}...", self.vendor_id, self.product_id);
        let device = self.api.open(self.vendor_id, self.product_id).map_err(|e| {
            debug!("open failed: {}", e);
            Error::DeviceNotFound {
                vendor_id: self.vendor_id,
                product_id: self.product_id,
            }
        })?;
        Ok(HidHandle { device })
    }
}

pub struct HidHandle {
    device: HidDevice,
}

impl DeviceHandle for HidHandle {
    fn bus_type(&self) -> Result<BusType, Error> {
        let info = self.device.get_device_info().map_err(Error::DeviceInfo)?;
        Ok(BusType::from(info.bus_type()))
    }

    fn set_nonblocking(&mut self) -> Result<(), Error> {
        self.device.set_blocking_mode(false).map_err(Error::ConfigurationFailed)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.device.read(buf).map_err(Error::ReadFailed)
    }

    fn send_feature_report(&mut self, data: &[u8]) -> Result<(), Error> {
        self.device.send_feature_report(data).map_err(Error::WriteFailed)
    }
}

impl Drop for HidHandle {
    fn drop(&mut self) {
        debug!("Closing controller device");
    }
}

/// One entry of [`HidTransport::matching_devices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub vendor_id: u16,
    pub product_id: u16,
    pub bus: BusType,
    pub product: Option<String>,
    pub path: String,
    /// Whether the product ID matches the one the monitor opens
    pub selected: bool,
}
