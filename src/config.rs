//! Configuration management for the planning service
//!
//! Handles loading configuration from a TOML file and `TRIPWISE_*` environment
//! variables, and validates every setting before the service starts.

use crate::PlannerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Language model provider settings
    #[serde(default)]
    pub model: ModelConfig,
    /// Forecast API settings
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Reference dataset settings
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Language model provider settings (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the chat-completions API
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    /// Model identifier
    #[serde(default = "default_model_name")]
    pub model: String,
    /// API key; when absent the key is read from `api_key_env` on first use
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    #[serde(default = "default_model_api_key_env")]
    pub api_key_env: String,
    /// Sampling temperature
    #[serde(default = "default_model_temperature")]
    pub temperature: f32,
    /// Per-call timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of reasoning steps per request
    #[serde(default = "default_model_max_iterations")]
    pub max_iterations: u32,
}

/// Forecast API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the forecast API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_weather_max_retries")]
    pub max_retries: u32,
}

/// Reference dataset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding flights.json, hotels.json and places.json
    #[serde(default = "default_catalog_data_dir")]
    pub data_dir: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP endpoint for trace export; disabled when absent
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_model_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model_name() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_model_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_model_temperature() -> f32 {
    0.7
}

fn default_model_timeout() -> u32 {
    60
}

fn default_model_max_iterations() -> u32 {
    12
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_weather_max_retries() -> u32 {
    2
}

fn default_catalog_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_model_base_url(),
            model: default_model_name(),
            api_key: None,
            api_key_env: default_model_api_key_env(),
            temperature: default_model_temperature(),
            timeout_seconds: default_model_timeout(),
            max_iterations: default_model_max_iterations(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: default_weather_max_retries(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: default_catalog_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl ModelConfig {
    /// Per-call timeout for the model provider
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Whether an API key is available without consulting the provider
    #[must_use]
    pub fn api_key_present(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
            || std::env::var(&self.api_key_env).is_ok_and(|key| !key.trim().is_empty())
    }
}

impl WeatherConfig {
    /// Per-request timeout for the forecast API
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl PlannerConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.or_else(|| {
            let local = PathBuf::from("config.toml");
            if local.exists() {
                Some(local)
            } else {
                Self::get_config_path()
            }
        });

        if let Some(config_file) = config_file.filter(|path| path.exists()) {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPWISE_MODEL__API_KEY overrides model.api_key, and so on
        builder = builder.add_source(
            Environment::with_prefix("TRIPWISE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripwise").join("config.toml"))
    }

    /// Apply default values to fields left empty by the file or environment
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.model.base_url.is_empty() {
            self.model.base_url = default_model_base_url();
        }
        if self.model.model.is_empty() {
            self.model.model = default_model_name();
        }
        if self.model.api_key_env.is_empty() {
            self.model.api_key_env = default_model_api_key_env();
        }
        if self.model.timeout_seconds == 0 {
            self.model.timeout_seconds = default_model_timeout();
        }
        if self.model.max_iterations == 0 {
            self.model.max_iterations = default_model_max_iterations();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.catalog.data_dir.as_os_str().is_empty() {
            self.catalog.data_dir = default_catalog_data_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    ///
    /// A missing key is fine here: it only surfaces on the first planning attempt.
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.model.api_key {
            if api_key.trim().is_empty() {
                return Err(PlannerError::config(
                    "Model API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(PlannerError::config(
                    "Model API key appears to be invalid (too short). Please check your API key."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.model.timeout_seconds > 600 {
            return Err(PlannerError::config("Model timeout cannot exceed 600 seconds").into());
        }

        if !(1..=50).contains(&self.model.max_iterations) {
            return Err(
                PlannerError::config("Model max iterations must be between 1 and 50").into(),
            );
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(
                PlannerError::config("Model temperature must be between 0.0 and 2.0").into(),
            );
        }

        if self.weather.timeout_seconds > 300 {
            return Err(
                PlannerError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.max_retries > 10 {
            return Err(PlannerError::config("Weather API max retries cannot exceed 10").into());
        }

        if self.server.port == 0 {
            return Err(PlannerError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Model API base URL", &self.model.base_url),
            ("Weather API base URL", &self.weather.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PlannerError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.model.model, "llama-3.3-70b-versatile");
        assert_eq!(config.model.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.model.max_iterations, 12);
        assert_eq!(config.catalog.data_dir, PathBuf::from("data"));
        assert_eq!(config.logging.level, "info");
        assert!(config.model.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_api_key() {
        let config = PlannerConfig::default();
        // the key is resolved lazily by the model provider
        assert!(config.validate_api_keys().is_ok());
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = PlannerConfig::default();
        config.model.api_key = Some("abc".to_string());
        let result = config.validate_api_keys();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = PlannerConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = PlannerConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = PlannerConfig::default();
        config.model.max_iterations = 80;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = PlannerConfig::default();
        config.model.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Model API base URL"));
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = PlannerConfig::default();
        config.model.model = String::new();
        config.model.max_iterations = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.model.model, "llama-3.3-70b-versatile");
        assert_eq!(config.model.max_iterations, 12);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("tripwise-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[model]\nmax_iterations = 5\n\n[catalog]\ndata_dir = \"fixtures\"\n",
        )
        .unwrap();

        let config = PlannerConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.model.max_iterations, 5);
        assert_eq!(config.catalog.data_dir, PathBuf::from("fixtures"));
        assert_eq!(config.server.port, 8000);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = PlannerConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("tripwise"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
