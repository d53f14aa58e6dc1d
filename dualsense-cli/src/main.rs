use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dualsense_cli::{fatal, parse_hex_u16};
use dualsense_lib::constants::{BT_MINIMAL_REPORT_ID, DEFAULT_ICON_LEVELS};
use dualsense_lib::wakeup::TruncationRule;
use dualsense_lib::{DecoderConfig, DeviceConfig, HidTransport, Monitor, MonitorConfig, Status, StatusSink, WakeUpConfig};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Truncation {
    /// Minimal report recognized by its leading report ID
    ReportId,
    /// Minimal report recognized by an all-zero power byte
    ZeroPowerField,
}

/// Battery monitor for the Sony DualSense controller.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Controller vendor ID (hex)
    #[arg(long, default_value = "054c", value_parser = parse_hex_u16)]
    vendor_id: u16,

    /// Controller product ID (hex)
    #[arg(long, default_value = "0ce6", value_parser = parse_hex_u16)]
    product_id: u16,

    /// Delay between polls in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    interval_ms: u64,

    /// Number of icon levels per charge direction
    #[arg(long, default_value_t = DEFAULT_ICON_LEVELS)]
    icons: usize,

    /// Wake-up requests per cycle before reopening the device
    #[arg(long, default_value_t = 1)]
    wakeup_attempts: u32,

    /// How a truncated Bluetooth report is detected
    #[arg(long, value_enum, default_value_t = Truncation::ReportId)]
    truncation: Truncation,

    /// Print each status as a JSON line
    #[arg(long)]
    json: bool,

    /// Take a single reading and exit
    #[arg(long)]
    once: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn monitor_config(&self) -> MonitorConfig {
        let truncation = match self.truncation {
            Truncation::ReportId => TruncationRule::ReportId(BT_MINIMAL_REPORT_ID),
            Truncation::ZeroPowerField => TruncationRule::ZeroPowerField,
        };
        MonitorConfig::default()
            .with_device(DeviceConfig::default().with_ids(self.vendor_id, self.product_id))
            .with_decoder(DecoderConfig::default().with_icon_levels(self.icons))
            .with_wakeup(
                WakeUpConfig::default()
                    .with_truncation(truncation)
                    .with_max_attempts(self.wakeup_attempts),
            )
            .with_poll_interval(Duration::from_millis(self.interval_ms))
    }
}

/// Writes statuses straight to stdout.
struct Printer {
    json: bool,
}

impl Printer {
    fn print(&self, status: &Status) {
        if self.json {
            match serde_json::to_string(status) {
                Ok(line) => println!("{}", line),
                Err(e) => error!("Failed to encode status: {}", e),
            }
        } else {
            println!("{}", status);
        }
    }
}

impl StatusSink for Printer {
    fn publish(&mut self, status: Status) {
        self.print(&status);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = args.monitor_config();
    let printer = Printer { json: args.json };

    let transport = HidTransport::new(&config.device).map_err(fatal)?;

    if args.once {
        let mut monitor = Monitor::new(transport, printer, config)?;
        monitor.run_cycle().await?;
        return Ok(());
    }

    let (tx, mut rx) = watch::channel::<Option<Status>>(None);
    let mut monitor = Monitor::new(transport, tx, config)?;

    let display = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let latest = rx.borrow_and_update().clone();
            if let Some(status) = latest {
                printer.print(&status);
            }
        }
    });

    tokio::select! {
        _ = monitor.run() => {}
        res = tokio::signal::ctrl_c() => {
            res.context("Failed to listen for Ctrl+C")?;
            info!("Shutting down");
        }
    }

    display.abort();
    Ok(())
}
