//! Configuration management for `TempGraph`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TempGraphError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "TEMPGRAPH_CONFIG";

/// Root configuration structure for `TempGraph`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TempGraphConfig {
    /// Geocoding API configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Forecast API configuration
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Outgoing HTTP settings shared by both clients
    #[serde(default)]
    pub http: HttpConfig,
    /// Chart canvas settings
    #[serde(default)]
    pub chart: ChartConfig,
    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Geocoding API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL for the geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Locale requested for result names
    #[serde(default = "default_geocoding_language")]
    pub language: String,
}

/// Forecast API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Base URL for the forecast API
    #[serde(default = "default_forecast_base_url")]
    pub base_url: String,
}

/// Outgoing HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u32,
    /// User agent sent upstream
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Chart canvas settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Canvas width in pixels
    #[serde(default = "default_chart_width")]
    pub width: u32,
    /// Canvas height in pixels
    #[serde(default = "default_chart_height")]
    pub height: u32,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_server_port")]
    pub port: u16,
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
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_geocoding_language() -> String {
    "es".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_http_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    format!("TempGraph/{}", crate::VERSION)
}

fn default_chart_width() -> u32 {
    800
}

fn default_chart_height() -> u32 {
    400
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
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

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            language: default_geocoding_language(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_forecast_base_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
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

impl TempGraphConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from_path(explicit)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

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

        // TEMPGRAPH_SERVER__PORT=9000 overrides server.port
        builder = builder.add_source(
            Environment::with_prefix("TEMPGRAPH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TempGraphConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tempgraph").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.language.is_empty() {
            self.geocoding.language = default_geocoding_language();
        }
        if self.forecast.base_url.is_empty() {
            self.forecast.base_url = default_forecast_base_url();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_http_timeout();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
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
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 300 {
            return Err(TempGraphError::config("HTTP timeout cannot exceed 300 seconds").into());
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(TempGraphError::config("Chart width and height must be positive").into());
        }

        if self.chart.width > 4096 || self.chart.height > 4096 {
            return Err(TempGraphError::config("Chart dimensions cannot exceed 4096 pixels").into());
        }

        if self.server.port == 0 {
            return Err(TempGraphError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TempGraphError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TempGraphError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (label, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Forecast", &self.forecast.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TempGraphError::config(format!(
                    "{label} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Socket address string the web server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
