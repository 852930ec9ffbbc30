use std::path::PathBuf;

use fs_err as fs;

use super::{SETTINGS_FILE_NAME, Settings, SettingsError, table};
use crate::terminal::DisplayMode;

/// Unique scratch directory, removed on drop.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!(
            "spiterm-settings-{}-{}",
            std::process::id(),
            rand::random::<u64>()
        ));
        Self(dir)
    }
    fn settings_path(&self) -> PathBuf {
        self.0.join("nested").join(SETTINGS_FILE_NAME)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        _ = fs::remove_dir_all(&self.0);
    }
}

#[test]
fn test_defaults_follow_table() {
    let settings = Settings::default();
    for field in table::FIELDS {
        assert_eq!(settings.value(field.name), Some(field.default));
    }
    assert_eq!(settings.display_mode(), DisplayMode::Auto);
    assert_eq!(settings.capacity(), 4096);
    assert_eq!(settings.baud_rate(), 115200);
    assert_eq!(settings.data_bits(), serialport::DataBits::Eight);
    assert!(!settings.loaded_from_file());
}

#[test]
fn test_missing_file_writes_defaults() {
    let scratch = ScratchDir::new();
    let path = scratch.settings_path();

    let settings = Settings::load(&path).unwrap();
    assert!(path.exists());
    assert!(!settings.loaded_from_file());
    assert_eq!(settings.path(), path);

    // Second load reads what the first one wrote.
    let reloaded = Settings::load(&path).unwrap();
    assert!(reloaded.loaded_from_file());
    assert_eq!(reloaded.display_mode(), DisplayMode::Auto);
}

#[test]
fn test_save_then_load_keeps_changes() {
    let scratch = ScratchDir::new();
    let path = scratch.settings_path();

    let mut settings = Settings::load(&path).unwrap();
    settings.set_display_mode(DisplayMode::Binary);
    settings.set(table::PARITY, 2).unwrap();
    settings.set(table::CAPACITY, 16384).unwrap();
    settings.save().unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("display_mode = \"Binary\""));
    assert!(contents.contains("parity = \"Even\""));

    let reloaded = Settings::load(&path).unwrap();
    assert_eq!(reloaded.display_mode(), DisplayMode::Binary);
    assert_eq!(reloaded.parity(), serialport::Parity::Even);
    assert_eq!(reloaded.capacity(), 16384);
}

#[test]
fn test_bad_header_falls_back_to_defaults() {
    let scratch = ScratchDir::new();
    let path = scratch.settings_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "filetype = \"something else\"\nversion = 1\n\n[values]\ndisplay_mode = \"Hex\"\n",
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert!(!settings.loaded_from_file());
    assert_eq!(settings.display_mode(), DisplayMode::Auto);

    fs::write(
        &path,
        "filetype = \"spiterm settings\"\nversion = 99\n\n[values]\ndisplay_mode = \"Hex\"\n",
    )
    .unwrap();
    let settings = Settings::load(&path).unwrap();
    assert!(!settings.loaded_from_file());
    assert_eq!(settings.display_mode(), DisplayMode::Auto);
}

#[test]
fn test_unknown_strings_keep_defaults() {
    let scratch = ScratchDir::new();
    let path = scratch.settings_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "filetype = \"spiterm settings\"\nversion = 1\n\n[values]\ndisplay_mode = \"hex\"\nbaud_rate = \"12345\"\n",
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert!(settings.loaded_from_file());
    assert_eq!(settings.display_mode(), DisplayMode::Hex);
    assert_eq!(settings.baud_rate(), 115200);
}

#[test]
fn test_malformed_file_is_an_error() {
    let scratch = ScratchDir::new();
    let path = scratch.settings_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "this is = = not toml").unwrap();

    assert!(matches!(
        Settings::load(&path),
        Err(SettingsError::Parse(_))
    ));
}

#[test]
fn test_set_rejects_bad_values() {
    let mut settings = Settings::default();
    assert!(matches!(
        settings.set(table::BAUD_RATE, 1234),
        Err(SettingsError::DisallowedValue { .. })
    ));
    assert!(matches!(
        settings.set("not_a_field", 1),
        Err(SettingsError::UnknownField(_))
    ));
    assert_eq!(settings.baud_rate(), 115200);
}

#[test]
fn test_saved_file_carries_help_comments() {
    let scratch = ScratchDir::new();
    let path = scratch.settings_path();

    let mut settings = Settings::load(&path).unwrap();
    settings.set_display_mode(DisplayMode::Hex);
    settings.save().unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("filetype = \"spiterm settings\"\nversion = 1\n"));
    assert!(contents.contains("# How received bytes are drawn\ndisplay_mode = \"Hex\"\n"));
    for field in table::FIELDS {
        let comment = format!("# {}\n{} = ", field.help, field.name);
        assert!(contents.contains(&comment), "{}", field.name);
    }

    let reloaded = Settings::load(&path).unwrap();
    assert!(reloaded.loaded_from_file());
    for field in table::FIELDS {
        assert_eq!(reloaded.value(field.name), settings.value(field.name));
    }
}
