pub mod config;
pub mod constants;
pub mod error;
pub mod monitor;
pub mod report;
pub mod status;
pub mod transport;
pub mod wakeup;


pub use config::{DecoderConfig, DeviceConfig, MonitorConfig, ReportLayout, WakeUpConfig};
pub use error::Error;
pub use monitor::Monitor;
pub use report::{ChargeState, Decoder, PowerStatus};
pub use status::{Icon, Reading, Status, StatusSink};
pub use transport::{BusType, HidTransport, TransportKind};
