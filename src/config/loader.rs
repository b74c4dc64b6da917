//! Configuration loading and management.

use crate::source::SYSFS_USB_DEVICES;
use crate::topology::BuildPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Global settings.
    #[serde(default)]
    pub settings: Settings,
}

/// Global settings.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Directory USB devices are enumerated from.
    #[serde(default = "default_sysfs_path")]
    pub sysfs_path: PathBuf,

    /// Print speed, qualifier and endpoint details.
    #[serde(default)]
    pub verbose: bool,

    /// Abort on the first device that cannot be read instead of skipping it.
    #[serde(default)]
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sysfs_path: default_sysfs_path(),
            verbose: false,
            strict: false,
        }
    }
}

fn default_sysfs_path() -> PathBuf {
    PathBuf::from(SYSFS_USB_DEVICES)
}

impl Settings {
    /// Failure policy for device builds.
    pub fn build_policy(&self) -> BuildPolicy {
        if self.strict {
            BuildPolicy::Abort
        } else {
            BuildPolicy::Skip
        }
    }
}

impl Config {
    /// Load configuration from default locations.
    /// Search order:
    /// 1. ./lsusb.toml
    /// 2. ~/.config/lsusb/config.toml
    /// 3. /etc/lsusb.toml
    pub fn load() -> Result<Self, ConfigError> {
        let paths = Self::config_paths();

        for path in paths.into_iter().flatten() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        // No config file found - use defaults
        Ok(Config::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn config_paths() -> Vec<Option<PathBuf>> {
        vec![
            std::env::current_dir().ok().map(|p| p.join("lsusb.toml")),
            dirs::config_dir().map(|p| p.join("lsusb").join("config.toml")),
            Some(PathBuf::from("/etc/lsusb.toml")),
        ]
    }
}

/// Generate example configuration content.
pub fn example_config() -> &'static str {
    r#"# lsusb configuration file
# Place in ./lsusb.toml, ~/.config/lsusb/config.toml, or /etc/lsusb.toml

[settings]
# Directory USB devices are enumerated from
sysfs_path = "/sys/bus/usb/devices"
# Print speed, device qualifier and endpoint details
verbose = false
# Abort on the first unreadable device instead of skipping it
strict = false
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config = Config::parse(example_config()).unwrap();
        assert_eq!(
            config.settings.sysfs_path,
            PathBuf::from("/sys/bus/usb/devices")
        );
        assert!(!config.settings.verbose);
        assert_eq!(config.settings.build_policy(), BuildPolicy::Skip);
    }

    #[test]
    fn test_defaults_for_missing_keys() {
        let config = Config::parse("[settings]\nstrict = true\n").unwrap();
        assert_eq!(config.settings.sysfs_path, PathBuf::from(SYSFS_USB_DEVICES));
        assert_eq!(config.settings.build_policy(), BuildPolicy::Abort);

        let empty = Config::parse("").unwrap();
        assert!(!empty.settings.strict);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::parse("[settings]\nverbose = \"maybe\"\n"),
            Err(ConfigError::Toml(_))
        ));
    }
}
