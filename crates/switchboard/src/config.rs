//! Configuration loading and validation for the switchboard server

use liveness::ProberSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

// Re-export Validate trait for derive macro
#[allow(unused_imports)]
use validator::Validate as _;

use crate::types::EngineSettings;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found in search paths")]
    FileNotFound,

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub monitor: MonitorSettings,

    #[serde(default)]
    pub reload: ReloadSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        self.server.validate()?;
        self.probe.validate()?;
        self.cache.validate()?;
        self.monitor.validate()?;
        self.reload.validate()?;
        Ok(())
    }
}

/// Server-level settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerSettings {
    /// Address the HTTP API binds to
    #[validate(length(min = 1))]
    pub listen: String,

    /// Path of the channel list file
    #[validate(length(min = 1))]
    pub channels_file: String,
}

/// Probe settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProbeSettings {
    /// Total timeout for one probe
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_probe_timeout")]
    pub timeout: Duration,

    /// Concurrent probe ceiling. Kept low so full passes do not hammer
    /// upstream providers.
    #[validate(range(min = 1, max = 64))]
    pub concurrency: usize,

    /// User-agent header sent with probes
    #[validate(length(min = 1))]
    pub user_agent: String,
}

/// Selection cache settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheSettings {
    /// Freshness window of a completed selection
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_cache_ttl")]
    pub ttl: Duration,
}

/// Background monitor settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MonitorSettings {
    /// Sweep period for current-candidate checks
    #[serde(with = "humantime_serde")]
    #[validate(custom = "validate_monitor_period")]
    pub period: Duration,
}

/// Periodic channel list reload settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReloadSettings {
    /// Re-read interval for the channel list; absent disables periodic
    /// reloads (the /reload endpoint still works)
    #[serde(default, with = "humantime_serde::option")]
    #[validate(custom = "validate_reload_interval")]
    pub interval: Option<Duration>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

// Default implementations

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            channels_file: "./channels.yaml".to_string(),
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        let prober = ProberSettings::default();
        Self {
            timeout: prober.timeout,
            concurrency: 3,
            user_agent: prober.user_agent,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(60),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: None,
            format: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            probe: ProbeSettings::default(),
            cache: CacheSettings::default(),
            monitor: MonitorSettings::default(),
            reload: ReloadSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

// Custom validators

fn validate_probe_timeout(timeout: &Duration) -> Result<(), ValidationError> {
    let millis = timeout.as_millis();
    if !(100..=60_000).contains(&millis) {
        return Err(ValidationError::new("probe_timeout_out_of_range"));
    }
    Ok(())
}

fn validate_cache_ttl(ttl: &Duration) -> Result<(), ValidationError> {
    let secs = ttl.as_secs();
    if !(10..=3600).contains(&secs) {
        return Err(ValidationError::new("cache_ttl_out_of_range"));
    }
    Ok(())
}

fn validate_monitor_period(period: &Duration) -> Result<(), ValidationError> {
    let secs = period.as_secs();
    if !(5..=900).contains(&secs) {
        return Err(ValidationError::new("monitor_period_out_of_range"));
    }
    Ok(())
}

// validator unwraps Option fields: absent intervals are not validated
fn validate_reload_interval(interval: &Duration) -> Result<(), ValidationError> {
    if interval.as_secs() < 60 {
        return Err(ValidationError::new("reload_interval_too_short"));
    }
    Ok(())
}

// Configuration loading implementation

impl Config {
    /// Load configuration from default search paths
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(&path)
            }
            None => {
                tracing::info!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/switchboard/switchboard.yaml")];

        if let Some(home_path) = Self::home_config_path() {
            paths.push(home_path);
        }

        paths.push(PathBuf::from("./switchboard.yaml"));

        paths
            .into_iter()
            .find(|p: &PathBuf| p.exists() && p.is_file())
    }

    /// Get home directory config path
    fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/switchboard/switchboard.yaml"))
    }

    /// Prober settings for the probe client
    pub fn to_prober_settings(&self) -> ProberSettings {
        ProberSettings {
            timeout: self.probe.timeout,
            user_agent: self.probe.user_agent.clone(),
        }
    }

    /// Engine settings derived from cache + probe sections
    pub fn to_engine_settings(&self) -> EngineSettings {
        EngineSettings {
            cache_ttl: self.cache.ttl,
            concurrency: self.probe.concurrency,
        }
    }
}
