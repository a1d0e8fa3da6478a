// Keyhid Settings Module
// TOML configuration for the HID device, layout, replay and capture

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::key::{parse_numpad_name, ScanCodeMap};
use crate::layout::LayoutName;

/// Configuration loaded from a TOML file (default: ~/.config/keyhid/config.toml).
///
/// Every section and field is optional; command-line flags override what
/// the file says.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputConfig,
    pub layout: LayoutConfig,
    pub replay: ReplayConfig,
    pub capture: CaptureConfig,
    pub numpad: NumpadConfig,

    /// File the configuration was read from
    #[serde(skip)]
    source_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// HID gadget character device
    pub device: PathBuf,
    /// Seconds slept after each press and each release report
    pub delay: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/hidg0"),
            delay: 0.02,
        }
    }
}

impl OutputConfig {
    /// Hold delay as a duration. [`Config::validate`] rejects delays that
    /// do not convert; those count as zero here.
    pub fn hold(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Layout the host expects: "azerty" or "qwerty"
    pub name: LayoutName,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            name: LayoutName::Azerty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayConfig {
    /// Key log to replay
    pub log: Option<PathBuf>,
    /// Keep reading as the log grows
    pub follow: bool,
    /// Replay existing content instead of only new data
    pub from_start: bool,
    /// Wait between reads when the followed log has no new data
    pub poll_interval_ms: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            log: None,
            follow: true,
            from_start: false,
            poll_interval_ms: 100,
        }
    }
}

impl ReplayConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// evdev node of the keyboard to capture
    pub input: Option<PathBuf>,
    /// Grab the device so its keys reach only keyhid
    pub grab: bool,
    /// NumLock state assumed at start
    pub initial_num_lock: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input: None,
            grab: true,
            initial_num_lock: true,
        }
    }
}

/// Keypad scan codes. Empty means the standard PC codes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NumpadConfig {
    /// Scan code (as a string key) to keypad key name ("7", "kp7", "kpdot")
    pub scan_codes: BTreeMap<String, String>,
}

impl NumpadConfig {
    /// Build the scan-code table; the configured entries replace the defaults
    pub fn scan_code_map(&self) -> Result<ScanCodeMap, ConfigError> {
        if self.scan_codes.is_empty() {
            return Ok(ScanCodeMap::pc_default());
        }
        let mut map = ScanCodeMap::empty();
        for (code, name) in &self.scan_codes {
            let scan_code: u16 = code.trim().parse().map_err(|_| {
                ConfigError::InvalidValue(format!("numpad scan code '{}' is not a number", code))
            })?;
            let key = parse_numpad_name(name).ok_or_else(|| {
                ConfigError::InvalidValue(format!("'{}' is not a keypad key", name))
            })?;
            map.insert(scan_code, key);
        }
        Ok(map)
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::from_toml(&content)?;
        config.source_path = Some(path.as_ref().to_path_buf());
        log::debug!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Get the default configuration path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keyhid").join("config.toml"))
    }

    /// Load from the default location, or defaults if there is no file
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Self::default())
    }

    /// Load an explicit file, or fall back to the default location
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load_default(),
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Also rejects NaN, infinities and values past Duration::MAX
        if Duration::try_from_secs_f64(self.output.delay).is_err() {
            return Err(ConfigError::InvalidValue(format!(
                "output.delay must be a non-negative number of seconds, got {}",
                self.output.delay
            )));
        }
        if self.replay.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "replay.poll_interval_ms must be at least 1".to_string(),
            ));
        }
        self.numpad.scan_code_map()?;
        Ok(())
    }
}

/// Commented configuration file listing every option with its default
pub fn default_config_content() -> &'static str {
    r#"# keyhid configuration

[output]
# HID gadget device the reports are written to
device = "/dev/hidg0"
# Seconds to wait after each press and each release
delay = 0.02

[layout]
# Keyboard layout configured on the target host: "azerty" or "qwerty"
name = "azerty"

[replay]
# Key log to replay (can also be given with --log)
# log = "/var/log/keys.log"
# Keep reading as the log grows
follow = true
# Replay what is already in the log instead of only new keys
from_start = false
# Milliseconds to wait when no new data is available
poll_interval_ms = 100

[capture]
# Keyboard event device for live mode (can also be given with --input)
# input = "/dev/input/event3"
# Take exclusive access to the keyboard while capturing
grab = true
# NumLock state assumed when capture starts
initial_num_lock = true

[numpad]
# Scan codes of the keypad keys. Leave empty for a standard PC keyboard;
# when set, this table replaces the defaults.
[numpad.scan_codes]
# "71" = "kp7"
# "83" = "kpdot"
"#
}
