//! Helpers shared by the CLI binaries

use dualsense_lib::Error;

/// Wrap a fatal monitor error for `main` to return. anyhow prints it on exit,
/// so callers must not log it as well.
pub fn fatal(err: Error) -> anyhow::Error {
    anyhow::Error::new(err).context("Cannot monitor the controller without HID support")
}

/// Parse a USB vendor or product ID written in hex, with or without a `0x` prefix.
pub fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex ID '{}': {}", s, e))
}
