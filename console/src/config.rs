use engine::{ComputeConfig, QuotaConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Console configuration, loaded from an optional TOML file over defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    pub endpoint: EndpointSection,
    pub quota: QuotaSection,
    pub telemetry: TelemetrySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for EndpointSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaSection {
    pub max_concurrency: u32,
    pub max_intensity: u64,
    pub secret: String,
}

impl Default for QuotaSection {
    fn default() -> Self {
        let defaults = QuotaConfig::default();
        Self {
            max_concurrency: defaults.max_concurrency,
            max_intensity: defaults.max_intensity,
            secret: defaults.secret,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySection {
    pub poll_interval_secs: u64,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
        }
    }
}

impl ConsoleConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compute_config()
            .validate()
            .map_err(ConfigError::Invalid)?;
        self.quota_config()
            .validate()
            .map_err(ConfigError::Invalid)?;

        if self.telemetry.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "Telemetry poll interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn compute_config(&self) -> ComputeConfig {
        ComputeConfig::new()
            .with_base_url(self.endpoint.base_url.clone())
            .with_timeout(Duration::from_secs(self.endpoint.timeout_secs))
    }

    pub fn quota_config(&self) -> QuotaConfig {
        QuotaConfig::new()
            .with_max_concurrency(self.quota.max_concurrency)
            .with_max_intensity(self.quota.max_intensity)
            .with_secret(self.quota.secret.clone())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.telemetry.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.endpoint.base_url, "http://localhost:3000");
        assert_eq!(config.telemetry.poll_interval_secs, 2);
        assert!(config.validate().is_ok());

        let quota = config.quota_config();
        assert_eq!(quota.max_concurrency, 1000);
        assert_eq!(quota.max_intensity, 1_000_000);
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let raw = r#"
            [quota]
            max_concurrency = 5
            max_intensity = 100
            secret = "open-sesame"
        "#;

        let config: ConsoleConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.quota.max_concurrency, 5);
        assert_eq!(config.quota.max_intensity, 100);
        // Untouched sections keep their defaults.
        assert_eq!(config.endpoint.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[endpoint]\nbase_url = \"http://perf.example.com:3000\"\ntimeout_secs = 10"
        )
        .unwrap();

        let config = ConsoleConfig::load(file.path()).unwrap();
        assert_eq!(config.endpoint.base_url, "http://perf.example.com:3000");
        assert_eq!(
            config.compute_config().timeout,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[endpoint]\nbase_url = \"not-a-url\"").unwrap();

        assert!(matches!(
            ConsoleConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = Path::new("/definitely/not/here.toml");
        assert!(matches!(
            ConsoleConfig::load(path),
            Err(ConfigError::Io(_))
        ));
    }
}
