// src/config.rs
//! Configuration management

use crate::error::{GpsError, Result};
use crate::track;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub serial_port: String,
    pub baudrate: u32,
    /// Seconds to wait on the transport before giving up on the session.
    pub read_timeout_secs: u64,
    /// Minimum displacement between recorded vertices, meters.
    pub min_distance: f64,
    /// Motionless minutes before the trip is declared over.
    pub stop_time: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyACM0".to_string(),
            baudrate: 9600,
            read_timeout_secs: 5,
            min_distance: track::DEFAULT_MIN_DISTANCE_M,
            stop_time: track::DEFAULT_STOP_TIME_MIN,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from the config file, or defaults when absent.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| GpsError::Other(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| GpsError::Other(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GpsError::Other(format!("Failed to create config directory: {}", e)))?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(&config_path, contents)
            .map_err(|e| GpsError::Other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| GpsError::Other("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("gps-tracker")
            .join("config.json"))
    }
}
