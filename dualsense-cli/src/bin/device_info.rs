use anyhow::Result;
use clap::Parser;
use dualsense_cli::parse_hex_u16;
use dualsense_lib::{DeviceConfig, HidTransport, Monitor, MonitorConfig, Status};

/// List DualSense HID interfaces and take one battery reading.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Controller vendor ID (hex)
    #[arg(long, default_value = "054c", value_parser = parse_hex_u16)]
    vendor_id: u16,

    /// Controller product ID (hex)
    #[arg(long, default_value = "0ce6", value_parser = parse_hex_u16)]
    product_id: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let device = DeviceConfig::default().with_ids(args.vendor_id, args.product_id);
    let mut transport = HidTransport::new(&device)?;

    let devices = transport.matching_devices()?;
    println!("HID interfaces for vendor {:04x}: {}", args.vendor_id, devices.len());
    for (i, d) in devices.iter().enumerate() {
        println!(
            "  #{} {:04x}:{:04x} {} {}{}",
            i + 1,
            d.vendor_id,
            d.product_id,
            d.bus,
            d.product.as_deref().unwrap_or("<no product string>"),
            if d.selected { "  [monitored]" } else { "" }
        );
        println!("     path: {}", d.path);
    }

    let config = MonitorConfig::default().with_device(device);
    let mut monitor = Monitor::new(transport, Vec::<Status>::new(), config)?;
    let result = monitor.run_cycle().await;

    println!();
    match result {
        Ok(reading) => {
            println!("{}", reading);
            println!("  Charge state: {}", reading.power.state);
            println!("  Icon:         {:?}", reading.icon());
        }
        Err(e) => println!("No reading: {}", e),
    }

    Ok(())
}
