//! # Configuration Module
//!
//! Capture settings with built-in defaults and an optional TOML override.
//!
//! The command line only selects the device index. Everything else (device
//! prefix, baud rate, output location, rotation size) comes from here.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CaptureError, Result};

/// Environment variable naming an optional TOML config file
pub const CONFIG_ENV_VAR: &str = "POV_CAPTURE_CONFIG";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CaptureConfig {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SerialConfig {
    #[serde(default = "default_device_prefix")]
    pub device_prefix: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// Output file configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    #[serde(default = "default_records_per_file")]
    pub records_per_file: u64,
}

// Default value functions
fn default_device_prefix() -> String { "/dev/ttyACM".to_string() }
fn default_baud_rate() -> u32 { 115_200 }

fn default_directory() -> PathBuf { PathBuf::from("./data") }
fn default_file_prefix() -> String { "POV_Raw_Input_".to_string() }
// 20 records/s for 15 minutes
fn default_records_per_file() -> u64 { 20 * 60 * 15 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device_prefix: default_device_prefix(),
            baud_rate: default_baud_rate(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            file_prefix: default_file_prefix(),
            records_per_file: default_records_per_file(),
        }
    }
}

impl CaptureConfig {
    /// Load configuration from a TOML file
    ///
    /// Missing tables and keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pov_capture::config::CaptureConfig;
    ///
    /// let config = CaptureConfig::load("capture.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: CaptureConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `POV_CAPTURE_CONFIG`, or use defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolve the serial device path for a device index
    ///
    /// ```
    /// use pov_capture::config::CaptureConfig;
    ///
    /// assert_eq!(CaptureConfig::default().device_path(3), "/dev/ttyACM3");
    /// ```
    pub fn device_path(&self, index: u32) -> String {
        format!("{}{}", self.serial.device_prefix, index)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.serial.device_prefix.is_empty() {
            return Err(CaptureError::Config(
                toml::de::Error::custom("serial device_prefix cannot be empty")
            ));
        }

        if self.serial.baud_rate == 0 {
            return Err(CaptureError::Config(
                toml::de::Error::custom("baud_rate must be greater than 0")
            ));
        }

        if self.output.directory.as_os_str().is_empty() {
            return Err(CaptureError::Config(
                toml::de::Error::custom("output directory cannot be empty")
            ));
        }

        if self.output.file_prefix.is_empty() {
            return Err(CaptureError::Config(
                toml::de::Error::custom("output file_prefix cannot be empty")
            ));
        }

        if self.output.records_per_file == 0 {
            return Err(CaptureError::Config(
                toml::de::Error::custom("records_per_file must be greater than 0")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.output.directory, PathBuf::from("./data"));
        assert_eq!(config.output.file_prefix, "POV_Raw_Input_");
        assert_eq!(config.output.records_per_file, 18_000);
    }

    #[test]
    fn test_device_path_appends_index() {
        let config = CaptureConfig::default();
        assert_eq!(config.device_path(0), "/dev/ttyACM0");
        assert_eq!(config.device_path(7), "/dev/ttyACM7");
        assert_eq!(config.device_path(12), "/dev/ttyACM12");
    }

    #[test]
    fn test_device_path_uses_configured_prefix() {
        let mut config = CaptureConfig::default();
        config.serial.device_prefix = "/dev/ttyUSB".to_string();
        assert_eq!(config.device_path(2), "/dev/ttyUSB2");
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let temp_file = write_config("");
        let config = CaptureConfig::load(temp_file.path()).unwrap();
        assert_eq!(config, CaptureConfig::default());
    }

    #[test]
    fn test_load_partial_override() {
        let temp_file = write_config(
            r#"
[serial]
device_prefix = "/dev/ttyUSB"

[output]
directory = "/var/log/pov"
records_per_file = 100
"#,
        );

        let config = CaptureConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.device_prefix, "/dev/ttyUSB");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.output.directory, PathBuf::from("/var/log/pov"));
        assert_eq!(config.output.file_prefix, "POV_Raw_Input_");
        assert_eq!(config.output.records_per_file, 100);
    }

    #[test]
    fn test_load_rejects_zero_records_per_file() {
        let temp_file = write_config("[output]\nrecords_per_file = 0\n");
        match CaptureConfig::load(temp_file.path()) {
            Err(CaptureError::Config(e)) => {
                assert!(e.to_string().contains("records_per_file"));
            }
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let temp_file = write_config("[serial\nbaud_rate = ");
        assert!(matches!(
            CaptureConfig::load(temp_file.path()),
            Err(CaptureError::Config(_))
        ));
    }

    #[test]
    fn test_from_env_without_variable_uses_fixed_constants() {
        std::env::remove_var(CONFIG_ENV_VAR);
        let config = CaptureConfig::from_env().unwrap();

        assert_eq!(config, CaptureConfig::default());
        assert_eq!(config.device_path(0), "/dev/ttyACM0");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.output.records_per_file, 20 * 60 * 15);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            CaptureConfig::load("/nonexistent/pov_capture.toml"),
            Err(CaptureError::Io(_))
        ));
    }

    #[test]
    fn test_empty_device_prefix() {
        let mut config = CaptureConfig::default();
        config.serial.device_prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_baud_rate() {
        let mut config = CaptureConfig::default();
        config.serial.baud_rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_output_directory() {
        let mut config = CaptureConfig::default();
        config.output.directory = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_file_prefix() {
        let mut config = CaptureConfig::default();
        config.output.file_prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_device_prefix(), "/dev/ttyACM");
        assert_eq!(default_baud_rate(), 115200);
        assert_eq!(default_directory(), PathBuf::from("./data"));
        assert_eq!(default_file_prefix(), "POV_Raw_Input_");
        assert_eq!(default_records_per_file(), 18000);
    }
}
