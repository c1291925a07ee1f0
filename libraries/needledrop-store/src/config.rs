/// Record store configuration
use crate::error::{Result, StoreError};
use needledrop_archive::ArchiveConfig;
use needledrop_core::Rpm;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default config file, read from the working directory when present
pub const CONFIG_FILE: &str = "needledrop.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NeedledropConfig {
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Albums requested per crate
    #[serde(default = "default_crate_size")]
    pub crate_size: usize,

    /// Records a customer may take to the turntable
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Rewind / fast-forward step
    #[serde(default = "default_seek_step_secs")]
    pub seek_step_secs: f64,

    /// Playback rate at 45 RPM (33 RPM is 1.0)
    #[serde(default = "default_rpm45_rate")]
    pub rpm45_rate: f64,
}

impl Default for NeedledropConfig {
    fn default() -> Self {
        Self {
            archive: ArchiveConfig::default(),
            crate_size: default_crate_size(),
            max_records: default_max_records(),
            tick_interval_ms: default_tick_interval_ms(),
            seek_step_secs: default_seek_step_secs(),
            rpm45_rate: default_rpm45_rate(),
        }
    }
}

impl NeedledropConfig {
    /// Load configuration from `needledrop.toml` and environment
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        Self::load_from(path.exists().then_some(path), None)
    }

    /// Load from an optional file, then `NEEDLEDROP_*` variables
    ///
    /// Nested keys use `__`, e.g. `NEEDLEDROP_ARCHIVE__BASE_URL`. Passing
    /// `env` replaces the process environment as the variable source.
    pub fn load_from(file: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = file {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("NEEDLEDROP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = settings
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.archive
            .validate()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        if self.crate_size == 0 {
            return Err(StoreError::Config("crate_size must be at least 1".to_string()));
        }
        if self.max_records == 0 {
            return Err(StoreError::Config("max_records must be at least 1".to_string()));
        }
        if self.tick_interval_ms == 0 {
            return Err(StoreError::Config("tick_interval_ms must be at least 1".to_string()));
        }
        if !(self.seek_step_secs.is_finite() && self.seek_step_secs > 0.0) {
            return Err(StoreError::Config(format!(
                "seek_step_secs must be positive, got {}",
                self.seek_step_secs
            )));
        }
        if !(self.rpm45_rate.is_finite() && self.rpm45_rate > 0.0) {
            return Err(StoreError::Config(format!(
                "rpm45_rate must be positive, got {}",
                self.rpm45_rate
            )));
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

// Default values
fn default_crate_size() -> usize {
    20
}

fn default_max_records() -> usize {
    5
}

fn default_tick_interval_ms() -> u64 {
    250
}

fn default_seek_step_secs() -> f64 {
    5.0
}

fn default_rpm45_rate() -> f64 {
    Rpm::FORTY_FIVE_RATE
}
