use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use skywatch_core::config::LocationConfig;
use skywatch_core::NetworkError;

/// The currently selected place: coordinates plus display fields.
///
/// Replaced wholesale through [`crate::store::LocationStore::set`]; callers
/// assembling a partial edit read the current value first, mutate a copy, and
/// set the whole record back. Coordinates are expected to describe the same
/// point as the place name once geocoding has resolved; `set` does not
/// re-check this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Present only when the record came from a geocoding lookup.
    pub full_address: Option<String>,
}

impl From<LocationConfig> for Location {
    fn from(cfg: LocationConfig) -> Self {
        Self {
            city: cfg.city,
            state: cfg.state,
            country: cfg.country,
            latitude: cfg.latitude,
            longitude: cfg.longitude,
            full_address: None,
        }
    }
}

/// Icon shown for a single hour slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourIcon {
    Clear,
    Rain,
}

impl HourIcon {
    /// OpenWeatherMap icon code used by the hourly strip.
    pub fn icon_code(&self) -> &'static str {
        match self {
            Self::Clear => "01d",
            Self::Rain => "09d",
        }
    }
}

/// One hour's slice of a day's forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourSlot {
    /// 12-hour clock display label, e.g. "1 AM".
    pub label: String,
    /// Missing source readings stay `None` and render as "N/A".
    pub temperature: Option<f64>,
    /// Amount (mm) or probability (%) depending on the rain mode;
    /// missing source values normalize to 0.
    pub precipitation: f64,
    pub icon: HourIcon,
}

impl HourSlot {
    /// Display string for the temperature; missing readings show "N/A".
    pub fn temperature_display(&self) -> String {
        match self.temperature {
            Some(t) => format!("{t}°C"),
            None => "N/A".to_string(),
        }
    }
}

/// One calendar day's aggregate stats plus its 24-hour breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub is_today: bool,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    /// Daily precipitation sum (mm) or averaged hourly probability (%),
    /// depending on the configured rain mode.
    pub rain_indicator: f64,
    pub cloud_cover_mean: f64,
    /// Always exactly 24 entries, hour 0 (midnight) through hour 23.
    pub hourly: Vec<HourSlot>,
}

/// Coarse sky state for the current-conditions views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyCondition {
    Clear,
    Cloudy,
}

impl SkyCondition {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Cloudy => "Cloudy",
        }
    }
}

/// Raw instantaneous observation as fetched from the provider.
///
/// All fields are optional at this stage; [`crate::snapshot::build_snapshot`]
/// decides which ones are required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub visibility: Option<f64>,
    pub pressure: Option<f64>,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
}

/// Classified point-in-time conditions for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub cloud_cover: f64,
    pub visibility: Option<f64>,
    pub pressure: Option<f64>,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    pub is_night: bool,
    pub condition: SkyCondition,
}

/// Raw forecast payload: parallel daily and hourly arrays, both indexed by
/// offset from "today". Hourly arrays carry `24 * daily_dates.len()` entries
/// when well-formed; the shaper verifies this before touching any of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastSeries {
    pub daily_dates: Vec<NaiveDate>,
    pub daily_temp_max: Vec<Option<f64>>,
    pub daily_temp_min: Vec<Option<f64>>,
    pub daily_cloud_cover_mean: Vec<Option<f64>>,
    /// Only populated in daily-sum mode.
    pub daily_precipitation_sum: Vec<Option<f64>>,
    pub hourly_temperature: Vec<Option<f64>>,
    /// Amount (mm) or probability (%) depending on the requested fields.
    pub hourly_precipitation: Vec<Option<f64>>,
}

/// Weather pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Malformed forecast data: {array} has {actual} entries, expected {expected}")]
    MalformedForecastData {
        array: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Incomplete snapshot: missing {0}")]
    IncompleteSnapshot(&'static str),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    /// User-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network(e) => e.user_message(),
            WeatherError::MalformedForecastData { .. } => {
                "Forecast data looks corrupted. Please try again."
            }
            WeatherError::IncompleteSnapshot(_) => {
                "Current conditions are incomplete. Please try again."
            }
            WeatherError::Parse(_) => "Weather service sent an unexpected response.",
        }
    }
}

/// Geocoding errors. These are the one class of failure the location-search
/// flow surfaces directly to the user.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("No match found for \"{0}\"")]
    NoMatchFound(String),
}

impl GeocodeError {
    pub fn user_message(&self) -> String {
        match self {
            GeocodeError::Network(e) => e.user_message().to_string(),
            GeocodeError::NoMatchFound(query) => {
                format!("Location \"{query}\" not found. Try again with just city and country.")
            }
        }
    }
}
