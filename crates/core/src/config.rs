use crate::error::{CampaignError, CampaignResult};
use serde::Deserialize;

/// Relative location of the interchange file written by the generator.
pub const DEFAULT_DATASET_PATH: &str = "data/01_raw/marketing_campaign_performance.csv";

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_INSIGHTS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default functions
fn default_dataset_path() -> String {
    DEFAULT_DATASET_PATH.to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_http_port() -> u16 {
    8501
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> CampaignResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CAMPAIGN_INSIGHTS")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| CampaignError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_raw_dataset() {
        let config = AppConfig::default();
        assert_eq!(config.dataset.path, DEFAULT_DATASET_PATH);
        assert_eq!(config.api.http_port, 8501);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"api": {"http_port": 9000}}"#).unwrap();
        assert_eq!(config.api.http_port, 9000);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.dataset.path, DEFAULT_DATASET_PATH);
    }

    #[test]
    fn test_invalid_env_value_is_config_error() {
        std::env::set_var("CAMPAIGN_INSIGHTS__METRICS__PORT", "not-a-port");
        let result = AppConfig::load();
        std::env::remove_var("CAMPAIGN_INSIGHTS__METRICS__PORT");

        let err = result.unwrap_err();
        assert!(matches!(err, CampaignError::Config(_)), "{err:?}");
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
