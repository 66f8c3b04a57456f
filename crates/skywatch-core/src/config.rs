use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Startup location (the store resets to this on restart)
    #[serde(default)]
    pub location: LocationConfig,

    /// Weather and forecast settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Seismic feed settings
    #[serde(default)]
    pub quakes: QuakesConfig,

    /// Messaging relay settings
    #[serde(default)]
    pub relay: RelayConfig,
}

/// The place the location store is seeded with at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            city: "Karnal".to_string(),
            // The state field starts empty; it is only filled by user input
            state: String::new(),
            country: "India".to_string(),
            latitude: 29.6857,
            longitude: 76.9905,
        }
    }
}

/// How the day-level rain indicator is computed from provider data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RainMode {
    /// Pass the provider's daily precipitation sum through (millimetres).
    #[default]
    DailySum,
    /// Average the 24 hourly precipitation probabilities (percent).
    HourlyProbability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Rain indicator mode
    pub rain_mode: RainMode,

    /// Number of forecast days to request
    pub forecast_days: u8,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            rain_mode: RainMode::default(),
            forecast_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuakesConfig {
    /// Feed poll interval in minutes (default: 10)
    #[serde(default = "default_quake_refresh")]
    pub refresh_minutes: u32,
    /// Drop events older than this many hours (default: 24)
    #[serde(default = "default_quake_max_age")]
    pub max_age_hours: u32,
    /// Maximum events requested per poll (default: 200)
    #[serde(default = "default_quake_limit")]
    pub fetch_limit: u32,
}

fn default_quake_refresh() -> u32 {
    10
}

fn default_quake_max_age() -> u32 {
    24
}

fn default_quake_limit() -> u32 {
    200
}

impl Default for QuakesConfig {
    fn default() -> Self {
        Self {
            refresh_minutes: default_quake_refresh(),
            max_age_hours: default_quake_max_age(),
            fetch_limit: default_quake_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Port the relay HTTP server listens on
    pub port: u16,

    /// Messaging gateway credentials
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            gateway: GatewayConfig::default(),
        }
    }
}

/// Third-party messaging gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway account identifier
    pub account_sid: String,
    /// Gateway auth token
    pub auth_token: String,
    /// Sender address, e.g. "whatsapp:+14155238886"
    pub from_number: String,
}

impl GatewayConfig {
    /// Check if credentials are configured (not placeholders)
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty()
            && !self.auth_token.is_empty()
            && !self.account_sid.starts_with("YOUR_")
            && !self.auth_token.starts_with("YOUR_")
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            account_sid: "YOUR_GATEWAY_ACCOUNT_SID".to_string(),
            auth_token: "YOUR_GATEWAY_AUTH_TOKEN".to_string(),
            from_number: "whatsapp:+14155238886".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skywatch");

        Self {
            config_dir,
            location: LocationConfig::default(),
            weather: WeatherConfig::default(),
            quakes: QuakesConfig::default(),
            relay: RelayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Startup coordinates: the store itself never bounds-checks, so the
        // config file is the one place an impossible pair gets flagged.
        if !(-90.0..=90.0).contains(&self.location.latitude) {
            result.add_warning(
                "location.latitude",
                format!("Latitude {} is outside [-90, 90]", self.location.latitude),
            );
        }
        if !(-180.0..=180.0).contains(&self.location.longitude) {
            result.add_warning(
                "location.longitude",
                format!("Longitude {} is outside [-180, 180]", self.location.longitude),
            );
        }
        if self.location.city.is_empty() {
            result.add_error("location.city", "Startup city cannot be empty");
        }

        // Forecast window: the provider caps requests at 16 days
        if self.weather.forecast_days == 0 {
            result.add_error("weather.forecast_days", "Must request at least one day");
        } else if self.weather.forecast_days > 16 {
            result.add_error(
                "weather.forecast_days",
                "Provider supports at most 16 forecast days",
            );
        }

        if self.quakes.refresh_minutes == 0 {
            result.add_warning(
                "quakes.refresh_minutes",
                "Seismic feed polling disabled (0 minutes)",
            );
        }
        if self.quakes.fetch_limit == 0 {
            result.add_error("quakes.fetch_limit", "Fetch limit must be greater than 0");
        }

        if self.relay.port == 0 {
            result.add_error("relay.port", "Relay port cannot be 0");
        }

        // Gateway credentials: just warn, the dashboard works without the relay
        if !self.relay.gateway.is_configured() {
            result.add_warning(
                "relay.gateway",
                "Messaging gateway not configured - the relay will reject requests",
            );
        }

        result
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skywatch");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Default config should be valid (only warnings, no errors)
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_default_location_is_karnal() {
        let config = Config::default();
        assert_eq!(config.location.city, "Karnal");
        assert_eq!(config.location.state, "");
        assert!((config.location.latitude - 29.6857).abs() < f64::EPSILON);
        assert!((config.location.longitude - 76.9905).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_relay_port() {
        let mut config = Config::default();
        config.relay.port = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "relay.port"));
    }

    #[test]
    fn test_forecast_days_out_of_range() {
        let mut config = Config::default();
        config.weather.forecast_days = 17;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.forecast_days"));
    }

    #[test]
    fn test_out_of_range_latitude_is_warning() {
        let mut config = Config::default();
        config.location.latitude = 120.0;
        let result = config.validate();
        // Out-of-range startup coordinates warn rather than refuse to start
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "location.latitude"));
    }

    #[test]
    fn test_gateway_not_configured_is_warning() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "relay.gateway"));
    }

    #[test]
    fn test_rain_mode_roundtrip() {
        let mut config = Config::default();
        config.weather.rain_mode = RainMode::HourlyProbability;
        let text = toml::to_string_pretty(&config).expect("serialize");
        assert!(text.contains("hourly_probability"));
        let parsed: Config = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.weather.rain_mode, RainMode::HourlyProbability);
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
