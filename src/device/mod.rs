//! Picade USB Audio device handling
//!
//! Locating the board's serial node and the commands its firmware accepts.

pub mod command;
pub mod resolve;

pub use command::DeviceCommand;
pub use resolve::{resolve_first, PICADE_AUDIO_PATTERN};
