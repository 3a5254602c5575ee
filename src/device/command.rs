//! Command payloads understood by the Picade USB Audio firmware
//!
//! The firmware listens on its CDC serial interface for the ASCII prefix
//! `multiverse:` followed by a four byte command word. Anything else is
//! silently discarded, and nothing is ever sent back.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Prefix the firmware waits for before reading a command word
pub const COMMAND_PREFIX: &[u8] = b"multiverse:";

/// Length of the command word that follows the prefix
pub const COMMAND_WORD_LEN: usize = 4;

/// Commands accepted by the board
///
/// Config files and the command line share the `FromStr` parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum DeviceCommand {
    /// Reboot into the USB bootloader, resetting the audio output mode
    #[default]
    UsbBoot,
    /// Plain watchdog reboot
    Reset,
}

impl DeviceCommand {
    /// All known commands
    pub const ALL: [DeviceCommand; 2] = [DeviceCommand::UsbBoot, DeviceCommand::Reset];

    /// The four byte command word
    pub fn word(self) -> &'static [u8; COMMAND_WORD_LEN] {
        match self {
            DeviceCommand::UsbBoot => b"_usb",
            DeviceCommand::Reset => b"_rst",
        }
    }

    /// Full wire payload, prefix included, no terminator
    pub fn payload(self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(COMMAND_PREFIX.len() + COMMAND_WORD_LEN);
        payload.extend_from_slice(COMMAND_PREFIX);
        payload.extend_from_slice(self.word());
        payload
    }

    /// Short name used on the command line and in config files
    pub fn name(self) -> &'static str {
        match self {
            DeviceCommand::UsbBoot => "usb",
            DeviceCommand::Reset => "rst",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DeviceCommand::UsbBoot => "reboot into the USB bootloader (resets audio mode)",
            DeviceCommand::Reset => "watchdog reboot",
        }
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.payload()))
    }
}

impl FromStr for DeviceCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_start_matches('_') {
            "usb" | "bootloader" => Ok(DeviceCommand::UsbBoot),
            "rst" | "reset" => Ok(DeviceCommand::Reset),
            other => Err(format!(
                "unknown command '{}' (expected one of: {})",
                other,
                DeviceCommand::ALL.map(DeviceCommand::name).join(", ")
            )),
        }
    }
}

impl TryFrom<String> for DeviceCommand {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
