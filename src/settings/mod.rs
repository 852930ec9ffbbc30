use std::{
    fmt::Write as _,
    io::Write,
    path::{Path, PathBuf},
};

use fs_err as fs;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::terminal::DisplayMode;

pub mod table;
use table::{
    BAUD_RATE, CAPACITY, DATA_BITS, DISPLAY_MODE, FIELDS, FLOW_CONTROL, FieldDescriptor, PARITY,
    STOP_BITS,
};

#[cfg(test)]
mod tests;

pub const SETTINGS_FILE_NAME: &str = "spiterm.toml";
pub const SETTINGS_FILE_TYPE: &str = "spiterm settings";
pub const SETTINGS_FILE_VERSION: u32 = 1;

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings file io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no settings field named \"{0}\"")]
    UnknownField(String),
    #[error("{value} is not an allowed value for {field}")]
    DisallowedValue { field: &'static str, value: u32 },
}

/// On-disk shape: a header, then every field as its display string.
#[derive(Debug, Deserialize)]
struct SettingsFile {
    filetype: String,
    version: u32,
    #[serde(default)]
    values: IndexMap<String, String>,
}

#[derive(Debug, Serialize)]
struct SettingsHeader<'a> {
    filetype: &'a str,
    version: u32,
}

/// Current value for every entry in [`FIELDS`], in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    path: PathBuf,
    values: IndexMap<&'static str, u32>,
    from_file: bool,
}

impl Default for Settings {
    fn default() -> Self {
        debug!("Setting default settings...");
        Self {
            path: PathBuf::new(),
            values: FIELDS.iter().map(|f| (f.name, f.default)).collect(),
            from_file: false,
        }
    }
}

impl Settings {
    /// Reads settings from `path` on top of the defaults.
    ///
    /// A missing file gets created with the defaults. A file with the wrong
    /// header is left alone and the defaults are used instead.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let mut settings = Settings {
            path: path.into(),
            ..Default::default()
        };

        if !path.exists() {
            info!("No settings at {}, writing defaults", path.display());
            settings.save()?;
            settings.log();
            return Ok(settings);
        }

        let contents = fs::read_to_string(path)?;
        let file: SettingsFile = toml::from_str(&contents)?;

        if file.version != SETTINGS_FILE_VERSION {
            warn!(
                "Bad settings version {} (expected {SETTINGS_FILE_VERSION}), using defaults",
                file.version
            );
        } else if file.filetype != SETTINGS_FILE_TYPE {
            warn!("Bad settings filetype \"{}\", using defaults", file.filetype);
        } else {
            settings.read_values(&file.values);
            settings.from_file = true;
        }

        settings.log();
        Ok(settings)
    }

    fn read_values(&mut self, stored: &IndexMap<String, String>) {
        debug!("Reading settings...");
        for field in FIELDS {
            let Some(raw) = stored.get(field.name) else {
                warn!("Did not read setting value {}!", field.name);
                continue;
            };
            match field.parse(raw) {
                Some(value) => {
                    self.values.insert(field.name, value);
                }
                None => warn!("Unknown value \"{raw}\" for {}, keeping default", field.name),
            }
        }
    }

    /// Writes to the path these settings were loaded from.
    pub fn save(&self) -> SettingsResult<()> {
        assert_ne!(self.path.components().count(), 0);
        self.save_at(&self.path)
    }

    pub fn save_at(&self, path: &Path) -> SettingsResult<()> {
        debug!("Writing settings...");
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let header = SettingsHeader {
            filetype: SETTINGS_FILE_TYPE,
            version: SETTINGS_FILE_VERSION,
        };
        let mut toml_config = toml::to_string(&header)?;
        toml_config.push_str("\n[values]\n");
        // Written by hand since toml can't serialize comments.
        for field in FIELDS {
            let value = toml::Value::String(field.string_for(self.get(field)).to_owned());
            _ = writeln!(toml_config, "# {}\n{} = {value}", field.help, field.name);
        }
        info!("Serialized settings length: {}", toml_config.len());

        let mut out = fs::File::create(path)?;
        out.write_all(toml_config.as_bytes())?;
        out.flush()?;
        out.sync_all()?;
        Ok(())
    }

    /// Logs every field as `label (name): value`.
    pub fn log(&self) {
        for field in FIELDS {
            debug!(
                "{} ({}): {}",
                field.label,
                field.name,
                field.string_for(self.get(field))
            );
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the values came from a valid settings file rather than defaults.
    pub fn loaded_from_file(&self) -> bool {
        self.from_file
    }

    fn get(&self, field: &FieldDescriptor) -> u32 {
        self.values.get(field.name).copied().unwrap_or(field.default)
    }

    pub fn value(&self, name: &str) -> Option<u32> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: u32) -> SettingsResult<()> {
        let field =
            table::descriptor(name).ok_or_else(|| SettingsError::UnknownField(name.to_owned()))?;
        if !field.is_allowed(value) {
            return Err(SettingsError::DisallowedValue {
                field: field.name,
                value,
            });
        }
        self.values.insert(field.name, value);
        Ok(())
    }

    fn value_or_default(&self, name: &'static str) -> u32 {
        self.value(name)
            .or_else(|| table::descriptor(name).map(|f| f.default))
            .unwrap_or_default()
    }

    pub fn display_mode(&self) -> DisplayMode {
        u8::try_from(self.value_or_default(DISPLAY_MODE))
            .ok()
            .and_then(DisplayMode::from_repr)
            .unwrap_or_default()
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.values.insert(DISPLAY_MODE, mode as u32);
    }

    pub fn baud_rate(&self) -> u32 {
        self.value_or_default(BAUD_RATE)
    }

    pub fn capacity(&self) -> usize {
        self.value_or_default(CAPACITY) as usize
    }

    pub fn data_bits(&self) -> serialport::DataBits {
        use serialport::DataBits;
        match self.value_or_default(DATA_BITS) {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        }
    }

    pub fn parity(&self) -> serialport::Parity {
        use serialport::Parity;
        match self.value_or_default(PARITY) {
            1 => Parity::Odd,
            2 => Parity::Even,
            _ => Parity::None,
        }
    }

    pub fn stop_bits(&self) -> serialport::StopBits {
        use serialport::StopBits;
        match self.value_or_default(STOP_BITS) {
            2 => StopBits::Two,
            _ => StopBits::One,
        }
    }

    pub fn flow_control(&self) -> serialport::FlowControl {
        use serialport::FlowControl;
        match self.value_or_default(FLOW_CONTROL) {
            1 => FlowControl::Software,
            2 => FlowControl::Hardware,
            _ => FlowControl::None,
        }
    }
}
