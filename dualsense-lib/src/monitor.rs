use crate::config::{MonitorConfig, ReportLayout};
use crate::error::Error;
use crate::report::Decoder;
use crate::status::{Reading, Status, StatusSink};
use crate::transport::{DeviceHandle, Transport, TransportKind};
use crate::wakeup;
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The poll loop: acquire, probe, read, decode, publish, release, repeat.
///
/// The device is reopened on every cycle instead of being held open, so a
/// stale handle after a disconnect never outlives one iteration.
pub struct Monitor<T: Transport, S: StatusSink> {
    transport: T,
    sink: S,
    decoder: Decoder,
    config: MonitorConfig,
}

impl<T: Transport, S: StatusSink> Monitor<T, S> {
    pub fn new(transport: T, sink: S, config: MonitorConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            transport,
            sink,
            decoder: Decoder::new(config.decoder),
            config,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Poll forever. Every error is published and retried after the poll interval.
    pub async fn run(&mut self) {
        info!("Starting battery monitor (interval {:?})", self.config.poll_interval);
        loop {
            sleep(self.config.poll_interval).await;
            let _ = self.run_cycle().await;
        }
    }

    /// Run a single cycle and publish its outcome.
    pub async fn run_cycle(&mut self) -> Result<Reading, Error> {
        let result = self.poll_once().await;
        let status = match &result {
            Ok(reading) => Status::from_reading(*reading),
            Err(e) => {
                warn!("{}", e);
                Status::from_error(e)
            }
        };
        info!("{}", status);
        self.sink.publish(status);
        result
    }

    // The handle is owned by this activation and dropped on every return path.
    async fn poll_once(&mut self) -> Result<Reading, Error> {
        let mut handle = self.transport.open()?;

        sleep(self.config.device.settle_delay).await;
        debug!("Reading device info...");
        let bus = handle.bus_type()?;
        let kind = TransportKind::from(bus);
        let layout = self
            .config
            .device
            .layout(kind)
            .ok_or(Error::UnsupportedTransport(bus))?;
        debug!(%bus, offset = layout.offset, size = layout.size, "Transport classified");

        handle.set_nonblocking()?;

        let report = self.read_full_report(&mut handle, kind, layout).await?;
        let power = self.decoder.decode(&report, layout.offset);
        debug!(
            power_byte = format!("{:#04x}", report[layout.offset]),
            percent = power.percent,
            state = %power.state,
            icon = power.icon_index,
            "Decoded power status"
        );

        Ok(Reading { transport: kind, power })
    }

    /// Read until a complete report arrives, sending at most `max_attempts`
    /// wake-up requests on Bluetooth. Once they are spent, a report of the
    /// expected size is accepted and anything shorter fails the cycle.
    async fn read_full_report<H: DeviceHandle>(
        &self,
        handle: &mut H,
        kind: TransportKind,
        layout: ReportLayout,
    ) -> Result<Bytes, Error> {
        let policy = &self.config.wakeup;
        let mut attempts = 0;

        loop {
            let report = read_report(handle, layout.size)?;

            if kind == TransportKind::Bluetooth && policy.truncation.is_truncated(&report, layout.offset) {
                if attempts >= policy.max_attempts {
                    // a full-size report that only looks truncated is real data
                    if report.len() == layout.size {
                        debug!(attempts, "Wake-up exhausted, decoding full-size report");
                        return Ok(report);
                    }
                    return Err(Error::ReportTruncated { attempts });
                }
                attempts += 1;
                debug!(attempt = attempts, "Truncated Bluetooth report");
                wakeup::request_full_report(handle, policy, layout.size)?;
                sleep(policy.retry_delay).await;
                continue;
            }

            if report.len() != layout.size {
                return Err(Error::ShortRead {
                    expected: layout.size,
                    actual: report.len(),
                });
            }
            return Ok(report);
        }
    }
}

fn read_report<H: DeviceHandle>(handle: &mut H, size: usize) -> Result<Bytes, Error> {
    debug!("Reading status ({} bytes)...", size);
    let mut buf = vec![0u8; size];
    let n = handle.read(&mut buf)?;
    if n == 0 {
        return Err(Error::EmptyRead);
    }
    buf.truncate(n);
    debug!(bytes = hex::encode(&buf), "HID Read");
    Ok(Bytes::from(buf))
}

async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
