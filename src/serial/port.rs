//! Serial port configuration and connection management
//!
//! Opens the board's CDC control channel and pushes a command payload
//! through it. The port is released when the connection is dropped.

use crate::error::{ResetError, Result};
use log::debug;
use serialport::{DataBits, FlowControl, Parity, StopBits};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Baud rate used when nothing else is configured
///
/// The board is a USB CDC device, so the line rate is not used on the wire;
/// 9600 matches what conventional serial libraries pick by default.
pub const DEFAULT_BAUD: u32 = 9600;

/// Default open/write timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Configuration for serial port connection
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Serial port path (e.g., /dev/serial/by-id/usb-Pimoroni_..., /dev/ttyACM0)
    pub port_path: PathBuf,
    /// Baud rate (default: 9600)
    pub baud_rate: u32,
    /// Data bits (default: 8)
    pub data_bits: DataBits,
    /// Parity (default: None)
    pub parity: Parity,
    /// Stop bits (default: 1)
    pub stop_bits: StopBits,
    /// Flow control (default: None)
    pub flow_control: FlowControl,
    /// Write timeout
    pub timeout: Duration,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            port_path: PathBuf::from("/dev/ttyACM0"),
            baud_rate: DEFAULT_BAUD,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PortConfig {
    /// Create a new configuration with default settings
    pub fn new(port_path: impl AsRef<Path>) -> Self {
        Self {
            port_path: port_path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Something that can open a serial endpoint for writing
pub trait SerialBackend {
    type Port: Write;

    /// Open the port described by `config`
    fn open(&self, config: &PortConfig) -> io::Result<Self::Port>;
}

/// Real serial ports through the `serialport` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSerial;

impl SerialBackend for SystemSerial {
    type Port = Box<dyn serialport::SerialPort>;

    fn open(&self, config: &PortConfig) -> io::Result<Self::Port> {
        let port = serialport::new(config.port_path.to_string_lossy(), config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()?;

        Ok(port)
    }
}

/// An open serial connection to the board
///
/// Owns the port handle. Dropping the connection drops the handle, which
/// closes the device.
pub struct SerialConnection<P: Write> {
    port: P,
    config: PortConfig,
}

impl<P: Write> SerialConnection<P> {
    /// Open a serial connection with the given configuration
    pub fn open<B>(backend: &B, config: PortConfig) -> Result<Self>
    where
        B: SerialBackend<Port = P>,
    {
        debug!(
            "Opening {} at {} baud (timeout {:?})",
            config.port_path.display(),
            config.baud_rate,
            config.timeout
        );

        let port = backend
            .open(&config)
            .map_err(|source| ResetError::PortOpenFailure {
                path: config.port_path.clone(),
                source,
            })?;

        Ok(Self { port, config })
    }

    /// Write the whole payload and flush it out
    pub fn send(&mut self, payload: &[u8]) -> Result<usize> {
        self.port
            .write_all(payload)
            .and_then(|_| self.port.flush())
            .map_err(|source| ResetError::WriteFailure {
                path: self.config.port_path.clone(),
                source,
            })?;

        debug!("Wrote {} bytes to {}", payload.len(), self.config.port_path.display());
        Ok(payload.len())
    }
}

impl<P: Write> Drop for SerialConnection<P> {
    fn drop(&mut self) {
        debug!("Closing {}", self.config.port_path.display());
    }
}
