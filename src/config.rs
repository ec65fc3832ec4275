// Client configuration for the coupon and live pricing services

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Configuration parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub default_currency: String,
    pub coupon_path: String,
    pub live_pricing_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: String::new(),
            timeout_ms: 10000,
            default_currency: "USD".to_string(),
            coupon_path: "/api/coupons/validate".to_string(),
            live_pricing_path: "/api/pricing/live".to_string(),
        }
    }
}

impl ClientConfig {
    // Missing keys fall back to the defaults above
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".to_string()));
        }
        if self.default_currency.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_currency must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str(
            r#"
            base_url = "https://api.example.com/"
            api_key = "secret"
            timeout_ms = 2500
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.default_currency, "USD");
        assert_eq!(
            config.endpoint(&config.coupon_path),
            "https://api.example.com/api/coupons/validate"
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ClientConfig::from_toml_str("timeout_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ClientConfig::from_toml_str("base_url = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
