//! Picade Audio Reset
//!
//! Switches the audio output mode of a Pimoroni Picade USB Audio board by
//! writing a command to its serial control channel.
//!
//! # Usage
//!
//! ```bash
//! # Send the default command to the first board found
//! picade-audio-reset
//!
//! # Show which device would be used, without opening it
//! picade-audio-reset --dry-run
//!
//! # Plain reboot instead of the bootloader command
//! picade-audio-reset --command rst
//!
//! # Settings from a file, one flag overridden
//! picade-audio-reset --config picade.toml --timeout-ms 250
//! ```

mod config;
mod device;
mod error;
mod reset;
mod serial;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use config::{ConfigLayer, ResetConfig};
use device::DeviceCommand;
use error::ResetError;
use serial::SystemSerial;

/// Picade Audio Reset
///
/// Resets the audio mode of a Picade USB Audio board over USB serial
#[derive(Parser)]
#[command(name = "picade-audio-reset")]
#[command(author = "Prasanna Gautam")]
#[command(version = "0.1.0")]
#[command(about = "Reset the audio mode of a Pimoroni Picade USB Audio board")]
struct Cli {
    /// Glob matching the board's serial device
    #[arg(short, long)]
    pattern: Option<String>,

    /// Command to send: usb (bootloader, resets audio mode) or rst (reboot)
    #[arg(short, long)]
    command: Option<DeviceCommand>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Serial timeout in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Load settings from a TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Find the device but do not write to it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            pattern: self.pattern.clone(),
            command: self.command,
            baud_rate: self.baud,
            timeout_ms: self.timeout_ms,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(err) = run(&cli) {
        match err.downcast_ref::<ResetError>() {
            Some(reset_err) => {
                eprintln!(
                    "{} {} failed: {}",
                    "[ERROR]".red().bold(),
                    reset_err.stage(),
                    reset_err
                );
                std::process::exit(reset_err.exit_code());
            }
            None => {
                eprintln!("{} {:#}", "[ERROR]".red().bold(), err);
                std::process::exit(1);
            }
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = ResetConfig::default();
    if let Some(path) = &cli.config {
        config = config.merge(ConfigLayer::load(path)?);
    }
    let config = config.merge(cli.overrides());

    log::debug!("Effective configuration: {:?}", config);

    if cli.dry_run {
        let device = reset::locate(&config)?;
        println!(
            "{} Would send {} ({}) to {}",
            "[*]".cyan().bold(),
            config.command.to_string().white(),
            config.command.description(),
            device.display()
        );
        return Ok(());
    }

    let report = reset::run(&config, &SystemSerial)?;
    println!(
        "{} Sent {} to {} ({} bytes)",
        "[OK]".green().bold(),
        report.command.to_string().white(),
        report.device.display(),
        report.bytes_written
    );

    Ok(())
}
