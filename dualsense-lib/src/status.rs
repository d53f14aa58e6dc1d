use crate::error::Error;
use crate::report::PowerStatus;
use crate::transport::TransportKind;
use std::fmt;
use tokio::sync::watch;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Icon selector for the display consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "set", content = "index", rename_all = "snake_case"))]
pub enum Icon {
    Disconnected,
    /// Used while on USB power
    Charging(usize),
    NotCharging(usize),
}

/// Result of one successful poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    pub transport: TransportKind,
    pub power: PowerStatus,
}

impl Reading {
    pub fn icon(&self) -> Icon {
        match self.transport {
            TransportKind::Usb => Icon::Charging(self.power.icon_index),
            _ => Icon::NotCharging(self.power.icon_index),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Connection: {}, Battery: {}% ({})",
            self.transport, self.power.percent, self.power.state
        )
    }
}

/// What gets published after every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Status {
    pub message: String,
    /// `None` leaves whatever icon is currently shown
    pub icon: Option<Icon>,
    pub reading: Option<Reading>,
}

impl Status {
    pub fn from_reading(reading: Reading) -> Self {
        Self {
            message: reading.to_string(),
            icon: Some(reading.icon()),
            reading: Some(reading),
        }
    }

    pub fn from_error(error: &Error) -> Self {
        let icon = match error {
            Error::ConfigurationFailed(_) | Error::WriteFailed(_) => None,
            _ => Some(Icon::Disconnected),
        };
        Self {
            message: error.to_string(),
            icon,
            reading: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.reading.is_some()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Consumer of published statuses. Each call replaces the previous value.
pub trait StatusSink {
    fn publish(&mut self, status: Status);
}

impl StatusSink for watch::Sender<Option<Status>> {
    fn publish(&mut self, status: Status) {
        // keeps the value even when no receiver is currently subscribed
        self.send_replace(Some(status));
    }
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    fn publish(&mut self, status: Status) {
        (**self).publish(status);
    }
}

impl StatusSink for Vec<Status> {
    fn publish(&mut self, status: Status) {
        self.push(status);
    }
}
