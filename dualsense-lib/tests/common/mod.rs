//! Scripted HID transport shared by the integration tests

// Not every test file uses every helper
#![allow(dead_code)]

use dualsense_lib::constants::*;
use dualsense_lib::error::Error;
use dualsense_lib::transport::{BusType, DeviceHandle, Transport};
use hidapi::HidError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::time::Instant;

pub fn hid_error(message: &str) -> HidError {
    HidError::HidApiError {
        message: message.to_string(),
    }
}

/// Everything the monitor did to the fake device, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open,
    Close,
    SetNonblocking,
    Read,
    FeatureReport(Vec<u8>),
}

#[derive(Debug, Default)]
pub struct Log {
    pub events: Vec<Event>,
    /// Tokio clock reading for each entry in `events`
    pub times: Vec<Instant>,
}

impl Log {
    pub fn record(&mut self, event: Event) {
        self.events.push(event);
        self.times.push(Instant::now());
    }

    /// Index and time of the first `event` at or after index `from`.
    pub fn time_of(&self, event: &Event, from: usize) -> Option<(usize, Instant)> {
        self.events
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, e)| *e == event)
            .map(|(i, _)| (i, self.times[i]))
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }

    pub fn reads(&self) -> usize {
        self.count(&Event::Read)
    }

    pub fn feature_reports(&self) -> Vec<Vec<u8>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::FeatureReport(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Behaviour of a single open device session.
pub struct Session {
    pub bus: Result<BusType, String>,
    pub nonblocking: Result<(), String>,
    pub reads: VecDeque<Result<Vec<u8>, String>>,
    pub feature_report: Result<(), String>,
}

impl Session {
    pub fn new(bus: BusType) -> Self {
        Self {
            bus: Ok(bus),
            nonblocking: Ok(()),
            reads: VecDeque::new(),
            feature_report: Ok(()),
        }
    }

    pub fn usb() -> Self {
        Self::new(BusType::Usb)
    }

    pub fn bluetooth() -> Self {
        Self::new(BusType::Bluetooth)
    }

    pub fn read(mut self, report: Vec<u8>) -> Self {
        self.reads.push_back(Ok(report));
        self
    }

    pub fn read_error(mut self, message: &str) -> Self {
        self.reads.push_back(Err(message.to_string()));
        self
    }

    pub fn nonblocking_error(mut self, message: &str) -> Self {
        self.nonblocking = Err(message.to_string());
        self
    }

    pub fn bus_error(mut self, message: &str) -> Self {
        self.bus = Err(message.to_string());
        self
    }

    pub fn feature_report_error(mut self, message: &str) -> Self {
        self.feature_report = Err(message.to_string());
        self
    }
}

/// Each `open()` pops the next entry; `None` means the device is absent.
#[derive(Default)]
pub struct ScriptedTransport {
    pub sessions: VecDeque<Option<Session>>,
    pub log: Rc<RefCell<Log>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(mut self, session: Session) -> Self {
        self.sessions.push_back(Some(session));
        self
    }

    pub fn absent(mut self) -> Self {
        self.sessions.push_back(None);
        self
    }

    pub fn log(&self) -> Rc<RefCell<Log>> {
        Rc::clone(&self.log)
    }
}

impl Transport for ScriptedTransport {
    type Handle = ScriptedHandle;

    fn open(&mut self) -> Result<ScriptedHandle, Error> {
        match self.sessions.pop_front().flatten() {
            Some(session) => {
                self.log.borrow_mut().record(Event::Open);
                Ok(ScriptedHandle {
                    session,
                    log: Rc::clone(&self.log),
                })
            }
            None => Err(Error::DeviceNotFound {
                vendor_id: SONY_VID,
                product_id: DUALSENSE_PID,
            }),
        }
    }
}

pub struct ScriptedHandle {
    session: Session,
    log: Rc<RefCell<Log>>,
}

impl DeviceHandle for ScriptedHandle {
    fn bus_type(&self) -> Result<BusType, Error> {
        self.session.bus.clone().map_err(|e| Error::DeviceInfo(hid_error(&e)))
    }

    fn set_nonblocking(&mut self) -> Result<(), Error> {
        self.log.borrow_mut().record(Event::SetNonblocking);
        self.session
            .nonblocking
            .clone()
            .map_err(|e| Error::ConfigurationFailed(hid_error(&e)))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.log.borrow_mut().record(Event::Read);
        match self.session.reads.pop_front() {
            Some(Ok(report)) => {
                let n = report.len().min(buf.len());
                buf[..n].copy_from_slice(&report[..n]);
                Ok(n)
            }
            Some(Err(e)) => Err(Error::ReadFailed(hid_error(&e))),
            // nothing pending in non-blocking mode
            None => Ok(0),
        }
    }

    fn send_feature_report(&mut self, data: &[u8]) -> Result<(), Error> {
        self.log.borrow_mut().record(Event::FeatureReport(data.to_vec()));
        self.session
            .feature_report
            .clone()
            .map_err(|e| Error::WriteFailed(hid_error(&e)))
    }
}

impl Drop for ScriptedHandle {
    fn drop(&mut self) {
        self.log.borrow_mut().record(Event::Close);
    }
}

/// A full-size USB report carrying `power` at the USB offset.
pub fn usb_report(power: u8) -> Vec<u8> {
    let mut report = vec![0u8; USB_REPORT_SIZE];
    report[0] = 0x01;
    report[USB_POWER_OFFSET] = power;
    report
}

/// A full-size expanded Bluetooth report carrying `power`.
pub fn bt_report(power: u8) -> Vec<u8> {
    let mut report = vec![0u8; BT_REPORT_SIZE];
    report[0] = BT_FULL_REPORT_ID;
    report[BT_POWER_OFFSET] = power;
    report
}

/// The minimal report a freshly paired controller sends.
pub fn bt_minimal_report() -> Vec<u8> {
    hex::decode("017f7f7f7f0800000000").expect("Failed to decode hex")
}
