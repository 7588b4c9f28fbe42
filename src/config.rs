use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;
use crate::zone::{Zone, ZoneEntry};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Listen address and port
    pub server: ServerConfig,

    /// Served names and answer settings
    pub zone: ZoneConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8053,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// TTL carried by every answer, in seconds
    pub ttl: u32,

    /// Answer NXDOMAIN instead of an empty NOERROR for names outside the zone
    pub nxdomain_on_miss: bool,

    pub records: Vec<ZoneEntry>,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            ttl: 60,
            nxdomain_on_miss: false,
            records: vec![ZoneEntry::new("example.lab.", "127.0.0.1")],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path` if one is given, defaults otherwise,
    /// then apply command-line overrides on top.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port cannot be 0".to_string()));
        }

        if self.zone.records.is_empty() {
            return Err(ConfigError::Validation("zone has no records".to_string()));
        }

        self.log_filter()?;

        Ok(())
    }

    /// Filter built from the configured log level or directive
    pub fn log_filter(&self) -> Result<EnvFilter, ConfigError> {
        EnvFilter::try_new(&self.logging.level).map_err(|e| {
            ConfigError::Validation(format!("invalid log level {:?}: {}", self.logging.level, e))
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    /// Build the zone store from the configured records
    pub fn build_zone(&self) -> Result<Zone, ConfigError> {
        Ok(Zone::new(self.zone.records.iter().cloned())?)
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}
