//! # Monitor Configuration
//!
//! One explicit value describing how the monitor runs. It is read from an
//! optional JSON file, adjusted by command-line flags, and then handed by
//! value to the transport and the pipeline.
//!
//! ```json
//! {
//!   "serial": { "port": "/dev/ttyUSB1", "baudrate": 115200, "parity": "none" },
//!   "decoder": { "float_byte_order": "big" },
//!   "log_level": "debug"
//! }
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use crate::error::JkError;
use crate::jk::serial::SerialConfig;
use crate::record::layout::DecodeOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub serial: SerialConfig,
    pub decoder: DecodeOptions,
    /// Default `env_logger` filter; `RUST_LOG` overrides it.
    pub log_level: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            serial: SerialConfig::default(),
            decoder: DecodeOptions::default(),
            log_level: "info".to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn from_json(text: &str) -> Result<Self, JkError> {
        let config: MonitorConfig =
            serde_json::from_str(text).map_err(|e| JkError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, JkError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| JkError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Rejects values the transport cannot work with.
    pub fn validate(&self) -> Result<(), JkError> {
        if self.serial.port.is_empty() {
            return Err(JkError::ConfigError("serial.port must not be empty".into()));
        }
        if self.serial.baudrate == 0 {
            return Err(JkError::ConfigError("serial.baudrate must be positive".into()));
        }
        if self.serial.read_buffer_size == 0 {
            return Err(JkError::ConfigError(
                "serial.read_buffer_size must be positive".into(),
            ));
        }
        Ok(())
    }
}
