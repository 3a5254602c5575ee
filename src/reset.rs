//! The reset itself: find the board, open its port, send the command.

use crate::config::ResetConfig;
use crate::device::{resolve_first, DeviceCommand};
use crate::error::Result;
use crate::serial::{SerialBackend, SerialConnection};
use log::info;
use std::path::PathBuf;

/// What a completed run did
#[derive(Debug, Clone, PartialEq)]
pub struct ResetReport {
    pub device: PathBuf,
    pub command: DeviceCommand,
    pub bytes_written: usize,
}

/// Find the board's serial node without touching it
pub fn locate(config: &ResetConfig) -> Result<PathBuf> {
    config.validate()?;

    let device = resolve_first(&config.pattern)?;
    info!("Found device {}", device.display());
    Ok(device)
}

/// Send the configured command to the first matching device
///
/// The port is closed before this returns, whether or not the write worked.
pub fn run<B: SerialBackend>(config: &ResetConfig, backend: &B) -> Result<ResetReport> {
    let device = locate(config)?;

    let mut conn = SerialConnection::open(backend, config.port_config(&device))?;
    let bytes_written = conn.send(&config.command.payload())?;
    drop(conn);

    info!("Sent {} to {}", config.command, device.display());

    Ok(ResetReport {
        device,
        command: config.command,
        bytes_written,
    })
}
