//! Front-end settings, read from `config.toml` in the snespad config
//! directory. Every field is optional.
//!
//! ```toml
//! poll_hz = 60
//! mapping_file = "/home/me/.config/snespad/mappings.toml"
//!
//! [pins]
//! latch = 2
//! clock = 3
//! data = 0
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use snespad_core::device::AdapterPins;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pins: PinSettings,
    /// Pad reads per second in monitor mode.
    pub poll_hz: u32,
    pub mapping_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PinSettings {
    pub latch: u8,
    pub clock: u8,
    pub data: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pins: PinSettings::default(),
            poll_hz: 60,
            mapping_file: None,
        }
    }
}

impl Default for PinSettings {
    fn default() -> Self {
        let pins = AdapterPins::DEFAULT;
        Self {
            latch: pins.latch,
            clock: pins.clock,
            data: pins.data,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn adapter_pins(&self) -> AdapterPins {
        AdapterPins {
            latch: self.pins.latch,
            clock: self.pins.clock,
            data: self.pins.data,
        }
    }

    /// Where button mappings are stored: `mapping_file` if set, otherwise
    /// `mappings.toml` next to the config file.
    pub fn mapping_path(&self, config_dir: Option<&Path>) -> Option<PathBuf> {
        self.mapping_file
            .clone()
            .or_else(|| config_dir.map(|dir| dir.join("mappings.toml")))
    }

    /// Poll interval, never shorter than 1ms.
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.poll_hz.clamp(1, 1000) as f64)
    }
}

/// The snespad directory under the platform config directory.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("snespad"))
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read config: {e}"),
            Self::Parse(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e)
    }
}
