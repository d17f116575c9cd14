//! File configuration.
//!
//! Everything here has a default, so an empty file (or no file) yields a
//! scraper pointed at the usual modem address. Command-line flags override
//! individual values after loading.

use crate::modem::{ModemConfig, DEFAULT_BASE_URL, DEFAULT_PROBE_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default metrics port.
pub const DEFAULT_PORT: u16 = 6666;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// `base_url` is blank.
    #[error("modem base URL is empty")]
    EmptyBaseUrl,
    /// `timeout_secs` is zero.
    #[error("request timeout must be at least one second")]
    InvalidTimeout,
    /// `probe_limit_bytes` is zero.
    #[error("probe limit must be non-zero")]
    InvalidProbeLimit,
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// `[modem]` table.
    #[serde(default)]
    pub modem: ModemSection,
    /// `[server]` table.
    #[serde(default)]
    pub server: ServerSection,
}

/// How to reach the modem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModemSection {
    /// Management interface address.
    pub base_url: String,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Replay this capture instead of contacting the modem.
    pub fixture: Option<PathBuf>,
    /// Per-request deadline in seconds.
    pub timeout_secs: u64,
    /// Maximum bytes read from a page.
    pub probe_limit_bytes: usize,
}

impl Default for ModemSection {
    fn default() -> Self {
        let defaults = ModemConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: defaults.username,
            password: defaults.password,
            fixture: None,
            timeout_secs: defaults.timeout.as_secs(),
            probe_limit_bytes: DEFAULT_PROBE_LIMIT,
        }
    }
}

impl ModemSection {
    /// Validates the section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.probe_limit_bytes == 0 {
            return Err(ConfigError::InvalidProbeLimit);
        }
        Ok(())
    }

    /// Converts into the settings the modem layer consumes.
    pub fn to_modem_config(&self) -> ModemConfig {
        ModemConfig {
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            fixture: self.fixture.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            probe_limit: self.probe_limit_bytes,
        }
    }
}

/// Metrics server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    /// Port the metrics endpoint listens on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.modem.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_valid() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        let config = FileConfig::from_file(file.path()).unwrap();
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.server.port, 6666);
        assert_eq!(config.modem.base_url, "https://192.168.100.1");
    }

    #[test]
    fn test_partial_sections() {
        let file = write_config(
            r#"
            [modem]
            password = "hunter2"
            fixture = "testdata/S33-signal.json"
            timeout_secs = 3

            [server]
            port = 9100
            "#,
        );
        let config = FileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9100);

        let modem = config.modem.to_modem_config();
        assert_eq!(modem.username, "admin");
        assert_eq!(modem.password, "hunter2");
        assert_eq!(modem.timeout, Duration::from_secs(3));
        assert_eq!(modem.fixture, Some(PathBuf::from("testdata/S33-signal.json")));
        assert_eq!(modem.probe_limit, DEFAULT_PROBE_LIMIT);
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let file = write_config("[modem]\ntimeout_secs = 0\n");
        assert!(matches!(
            FileConfig::from_file(file.path()),
            Err(ConfigError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_empty_base_url_invalid() {
        let section = ModemSection {
            base_url: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(section.validate(), Err(ConfigError::EmptyBaseUrl)));
    }

    #[test]
    fn test_zero_probe_limit_invalid() {
        let section = ModemSection {
            probe_limit_bytes: 0,
            ..Default::default()
        };
        assert!(matches!(section.validate(), Err(ConfigError::InvalidProbeLimit)));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("[modem\n");
        assert!(matches!(
            FileConfig::from_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FileConfig::from_file("/nonexistent/surfer.toml"),
            Err(ConfigError::FileReadError(_))
        ));
    }
}
