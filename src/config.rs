//! Configuration management for the `TripAI` service.
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::error::PlanError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `TripAI` service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripAiConfig {
    /// Generative-model endpoint configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generative-model endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Endpoint URL of the generative-model API
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
    /// API key, supplied through file or environment, never hard-coded
    pub api_key: Option<String>,
    /// Attempts per acquisition cycle (primary and escalation each get
    /// their own budget of this size)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed backoff between attempts, in seconds
    #[serde(default = "default_backoff_seconds")]
    pub backoff_seconds: u64,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u32,
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in seconds
    #[serde(default = "default_cache_ttl_seconds")]
    pub ttl_seconds: u64,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the server listens on
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        .to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_seconds() -> u64 {
    1
}

fn default_timeout_seconds() -> u32 {
    30
}

fn default_cache_ttl_seconds() -> u64 {
    10
}

fn default_server_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_gemini_endpoint(),
            api_key: None,
            max_attempts: default_max_attempts(),
            backoff_seconds: default_backoff_seconds(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl_seconds(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for TripAiConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GeminiConfig {
    /// Backoff between attempts as a [`Duration`]
    #[must_use]
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_seconds)
    }
}

impl CacheConfig {
    /// Cache TTL as a [`Duration`]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl TripAiConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with TRIPAI_ prefix
        builder = builder.add_source(
            Environment::with_prefix("TRIPAI")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripAiConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripai").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.gemini.endpoint.is_empty() {
            self.gemini.endpoint = default_gemini_endpoint();
        }
        if self.gemini.max_attempts == 0 {
            self.gemini.max_attempts = default_max_attempts();
        }
        if self.gemini.timeout_seconds == 0 {
            self.gemini.timeout_seconds = default_timeout_seconds();
        }
        if self.cache.ttl_seconds == 0 {
            self.cache.ttl_seconds = default_cache_ttl_seconds();
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
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.gemini.api_key {
            if api_key.is_empty() {
                return Err(PlanError::invalid_request(
                    "Gemini API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(PlanError::invalid_request(
                    "Gemini API key appears to be invalid (too short). Please check your API key."
                ).into());
            }

            if api_key.len() > 100 {
                return Err(PlanError::invalid_request(
                    "Gemini API key appears to be invalid (too long). Please check your API key."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.gemini.max_attempts > 10 {
            return Err(PlanError::invalid_request(
                "Model endpoint max attempts cannot exceed 10",
            )
            .into());
        }

        if self.gemini.backoff_seconds > 60 {
            return Err(PlanError::invalid_request(
                "Retry backoff cannot exceed 60 seconds",
            )
            .into());
        }

        if self.gemini.timeout_seconds > 300 {
            return Err(PlanError::invalid_request(
                "Model endpoint timeout cannot exceed 300 seconds",
            )
            .into());
        }

        // The cache de-duplicates rapid repeats, it is not a store.
        if self.cache.ttl_seconds > 300 {
            return Err(PlanError::invalid_request(
                "Cache TTL cannot exceed 300 seconds",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlanError::invalid_request(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "compact"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlanError::invalid_request(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.gemini.endpoint.starts_with("http://")
            && !self.gemini.endpoint.starts_with("https://")
        {
            return Err(PlanError::invalid_request(
                "Model endpoint must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}
