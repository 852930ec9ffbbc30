use camino::Utf8PathBuf;

use crate::{settings::Settings, terminal::DisplayMode};

#[derive(Debug, clap::Parser)]
/// Watch a byte stream bit by bit, on a terminal sized like a tiny display
#[command(version, about)]
pub struct SpitermCli {
    /// Serial port to capture from (e.g. /dev/ttyUSB0), lists available ports if omitted
    pub port: Option<String>,

    /// Baud rate to open [PORT] at for this session, any rate the port accepts
    #[clap(short, long)]
    pub baud: Option<u32>,

    /// Read the stream from stdin instead of a serial port
    #[clap(long, conflicts_with = "port")]
    pub stdin: bool,

    /// Display mode to start this session in (0 = Auto, 1 = Hex, 2 = Binary)
    #[clap(short, long, value_parser = clap::value_parser!(u8).range(0..3))]
    pub mode: Option<u8>,

    /// How many of the latest bytes to keep, overrides the saved buffer size
    #[clap(long)]
    pub capacity: Option<usize>,

    /// Override directory for the settings file
    #[clap(short, long)]
    pub config_path: Option<Utf8PathBuf>,

    /// Log level written to the log file next to the executable
    #[clap(long, default_value = "debug")]
    pub log_level: tracing::level_filters::LevelFilter,
}

/// Flags only override for the running session, saved settings are left as loaded.
impl SpitermCli {
    pub fn baud_rate(&self, settings: &Settings) -> u32 {
        self.baud.unwrap_or_else(|| settings.baud_rate())
    }

    pub fn display_mode(&self, settings: &Settings) -> DisplayMode {
        self.mode
            .map(DisplayMode::from_raw)
            .unwrap_or_else(|| settings.display_mode())
    }

    pub fn capacity(&self, settings: &Settings) -> usize {
        self.capacity.unwrap_or_else(|| settings.capacity())
    }
}
