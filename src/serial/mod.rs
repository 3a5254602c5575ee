//! Serial port communication module
//!
//! This module provides functionality for:
//! - Describing how the board's control port is opened
//! - Opening it through a swappable backend
//! - Writing a command payload and releasing the port

#[cfg(test)]
pub mod mock;
pub mod port;

pub use port::{PortConfig, SerialBackend, SerialConnection, SystemSerial};
