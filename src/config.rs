//! Run configuration
//!
//! Built-in defaults, optionally overridden by a TOML file and then by
//! command-line flags. Every key is optional:
//!
//! ```toml
//! pattern = "/dev/serial/by-id/usb-Pimoroni_Picade_USB_Audio_*"
//! command = "usb"
//! baud_rate = 9600
//! timeout_ms = 1000
//! ```

use crate::device::{DeviceCommand, PICADE_AUDIO_PATTERN};
use crate::error::{ResetError, Result};
use crate::serial::port::{DEFAULT_BAUD, DEFAULT_TIMEOUT};
use crate::serial::PortConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct ResetConfig {
    /// Glob used to find the board's serial node
    pub pattern: String,
    /// Command sent to the board
    pub command: DeviceCommand,
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            pattern: PICADE_AUDIO_PATTERN.to_string(),
            command: DeviceCommand::default(),
            baud_rate: DEFAULT_BAUD,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// One source of settings; unset keys leave the lower layer alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub pattern: Option<String>,
    pub command: Option<DeviceCommand>,
    pub baud_rate: Option<u32>,
    pub timeout_ms: Option<u64>,
}

impl ConfigLayer {
    /// Load a layer from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ResetError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
            .map_err(|e| ResetError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse a layer from TOML text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

impl ResetConfig {
    /// Apply a layer on top of the current settings
    pub fn merge(mut self, layer: ConfigLayer) -> Self {
        if let Some(pattern) = layer.pattern {
            self.pattern = pattern;
        }
        if let Some(command) = layer.command {
            self.command = command;
        }
        if let Some(baud_rate) = layer.baud_rate {
            self.baud_rate = baud_rate;
        }
        if let Some(timeout_ms) = layer.timeout_ms {
            self.timeout = Duration::from_millis(timeout_ms);
        }
        self
    }

    /// Reject settings that cannot produce a working run
    pub fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(ResetError::Config("device pattern must not be empty".into()));
        }
        if self.baud_rate == 0 {
            return Err(ResetError::Config("baud rate must be greater than zero".into()));
        }
        if self.timeout.is_zero() {
            return Err(ResetError::Config("timeout must be greater than zero".into()));
        }
        Ok(())
    }

    /// Port settings for the resolved device
    pub fn port_config(&self, port_path: &Path) -> PortConfig {
        PortConfig::new(port_path)
            .with_baud_rate(self.baud_rate)
            .with_timeout(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_board() {
        let config = ResetConfig::default();
        assert_eq!(config.pattern, "/dev/serial/by-id/usb-Pimoroni_Picade_USB_Audio_*");
        assert_eq!(config.command, DeviceCommand::UsbBoot);
        assert_eq!(config.baud_rate, 9600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let layer = ConfigLayer::parse(
            r#"
pattern = "/dev/ttyACM*"
command = "rst"
baud_rate = 115200
timeout_ms = 250
"#,
        )
        .unwrap();

        let config = ResetConfig::default().merge(layer);
        assert_eq!(config.pattern, "/dev/ttyACM*");
        assert_eq!(config.command, DeviceCommand::Reset);
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_command_alias_in_file() {
        let layer = ConfigLayer::parse("command = \"bootloader\"").unwrap();
        assert_eq!(layer.command, Some(DeviceCommand::UsbBoot));
    }

    #[test]
    fn test_command_case_in_file() {
        let upper = ConfigLayer::parse("command = \"USB\"").unwrap();
        assert_eq!(upper.command, Some(DeviceCommand::UsbBoot));

        let word = ConfigLayer::parse("command = \"_rst\"").unwrap();
        assert_eq!(word.command, Some(DeviceCommand::Reset));

        assert!(ConfigLayer::parse("command = \"flash\"").is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ConfigLayer::parse("port = \"/dev/ttyACM0\"").is_err());
    }

    #[test]
    fn test_later_layer_wins() {
        let file = ConfigLayer {
            pattern: Some("/dev/ttyACM*".into()),
            baud_rate: Some(115200),
            ..Default::default()
        };
        let cli = ConfigLayer {
            pattern: Some("/dev/ttyUSB*".into()),
            ..Default::default()
        };

        let config = ResetConfig::default().merge(file).merge(cli);
        assert_eq!(config.pattern, "/dev/ttyUSB*");
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.command, DeviceCommand::UsbBoot);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "timeout_ms = 500").unwrap();

        let layer = ConfigLayer::load(file.path()).unwrap();
        assert_eq!(layer.timeout_ms, Some(500));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = ConfigLayer::load(Path::new("/nonexistent/picade.toml")).unwrap_err();
        assert_eq!(err.stage(), "config");
    }

    #[test]
    fn test_validate_rejects_zero_baud() {
        let config = ResetConfig {
            baud_rate: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ResetError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ResetConfig::default().merge(ConfigLayer {
            timeout_ms: Some(0),
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(ResetError::Config(_))));
    }

    #[test]
    fn test_port_config_carries_settings() {
        let config = ResetConfig::default().merge(ConfigLayer {
            baud_rate: Some(57600),
            timeout_ms: Some(100),
            ..Default::default()
        });

        let port = config.port_config(Path::new("/dev/ttyACM0"));
        assert_eq!(port.baud_rate, 57600);
        assert_eq!(port.timeout, Duration::from_millis(100));
    }
}
