use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ComputeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("Base URL cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("Base URL must start with http:// or https://".to_string());
        }

        if self.timeout.is_zero() {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Ceilings enforced while the quota latch is locked, plus the secret that
/// unlocks them for the rest of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    pub max_concurrency: u32,
    pub max_intensity: u64,
    pub secret: String,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 1000,
            max_intensity: 1_000_000,
            secret: "changeme".to_string(),
        }
    }
}

impl QuotaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_concurrency(mut self, max_concurrency: u32) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_max_intensity(mut self, max_intensity: u64) -> Self {
        self.max_intensity = max_intensity;
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == 0 {
            return Err("Max concurrency must be greater than 0".to_string());
        }

        if self.max_intensity == 0 {
            return Err("Max intensity must be greater than 0".to_string());
        }

        if self.secret.is_empty() {
            return Err("Unlock secret cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_compute_config() {
        let config = ComputeConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_compute_config_builder() {
        let config = ComputeConfig::new()
            .with_base_url("https://perf.example.com")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.base_url, "https://perf.example.com");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_compute_config_validation() {
        let mut config = ComputeConfig::default();

        config.base_url = "".to_string();
        assert!(config.validate().is_err());

        config.base_url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        config.base_url = "http://localhost:3000".to_string();
        config.timeout = Duration::from_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_quota_config() {
        let config = QuotaConfig::default();
        assert_eq!(config.max_concurrency, 1000);
        assert_eq!(config.max_intensity, 1_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_quota_config_validation() {
        let mut config = QuotaConfig::default();

        config.max_concurrency = 0;
        assert!(config.validate().is_err());

        config.max_concurrency = 5;
        config.max_intensity = 0;
        assert!(config.validate().is_err());

        config.max_intensity = 100;
        config.secret = "".to_string();
        assert!(config.validate().is_err());

        config.secret = "hunter2".to_string();
        assert!(config.validate().is_ok());
    }
}
