//! Forecast provider client for the Open-Meteo API.
//!
//! Two fetch shapes: an instantaneous current-conditions reading (plus the
//! day's sun times) and the daily+hourly parallel arrays the shaper consumes.
//! The daily fetch requests different precipitation fields depending on the
//! configured [`RainMode`].

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::{CurrentReading, ForecastSeries, WeatherError};
use skywatch_core::config::RainMode;
use skywatch_core::{NetworkError, ReqwestErrorExt};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT_SECS: u64 = 10;

const DAILY_DATE_FORMAT: &str = "%Y-%m-%d";
const DAILY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: Option<CurrentBlock>,
    daily: Option<SunBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    cloudcover: Option<f64>,
    visibility: Option<f64>,
    pressure_msl: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SunBlock {
    #[serde(default)]
    sunrise: Vec<String>,
    #[serde(default)]
    sunset: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyBlock>,
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    temperature_2m_max: Option<Vec<Option<f64>>>,
    temperature_2m_min: Option<Vec<Option<f64>>>,
    precipitation_sum: Option<Vec<Option<f64>>>,
    cloudcover_mean: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    temperature_2m: Option<Vec<Option<f64>>>,
    precipitation: Option<Vec<Option<f64>>>,
    precipitation_probability: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl ForecastClient {
    /// # Errors
    ///
    /// Returns [`NetworkError`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client,
            base_url: FORECAST_URL.to_string(),
        })
    }

    /// Point the client at an alternate endpoint. Tests use this with a
    /// local mock server.
    pub fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, WeatherError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        if !response.status().is_success() {
            return Err(WeatherError::Network(NetworkError::ServerError {
                status: response.status().as_u16(),
                message: format!("forecast provider returned {}", response.status()),
            }));
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::Network(NetworkError::InvalidResponse(e.to_string())))
    }

    /// Instantaneous conditions plus today's sunrise/sunset.
    ///
    /// # Errors
    ///
    /// [`WeatherError::Network`] on connectivity or non-2xx responses,
    /// [`WeatherError::Parse`] when the current block is absent.
    pub async fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentReading, WeatherError> {
        let url = format!(
            "{}?latitude={latitude}&longitude={longitude}\
             &current=temperature_2m,relative_humidity_2m,wind_speed_10m,cloudcover,visibility,pressure_msl\
             &daily=sunrise,sunset&timezone=auto",
            self.base_url
        );

        let body: CurrentResponse = self.fetch(&url).await?;
        let current = body
            .current
            .ok_or_else(|| WeatherError::Parse("response has no current block".to_string()))?;

        // Sun times are optional; the snapshot falls back to a clock heuristic
        let (sunrise, sunset) = match body.daily {
            Some(sun) => (
                sun.sunrise.first().and_then(|s| parse_daily_time(s)),
                sun.sunset.first().and_then(|s| parse_daily_time(s)),
            ),
            None => (None, None),
        };

        Ok(CurrentReading {
            temperature: current.temperature_2m,
            humidity: current.relative_humidity_2m,
            wind_speed: current.wind_speed_10m,
            cloud_cover: current.cloudcover,
            visibility: current.visibility,
            pressure: current.pressure_msl,
            sunrise,
            sunset,
        })
    }

    /// Daily + hourly parallel arrays for the forecast shaper.
    ///
    /// # Errors
    ///
    /// [`WeatherError::Network`] on connectivity or non-2xx responses,
    /// [`WeatherError::Parse`] when a block is absent or a date is unreadable.
    pub async fn daily(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
        mode: RainMode,
    ) -> Result<ForecastSeries, WeatherError> {
        let (daily_fields, hourly_fields) = match mode {
            RainMode::DailySum => (
                "temperature_2m_max,temperature_2m_min,precipitation_sum,cloudcover_mean",
                "temperature_2m,precipitation",
            ),
            RainMode::HourlyProbability => (
                "temperature_2m_max,temperature_2m_min,cloudcover_mean",
                "temperature_2m,precipitation_probability",
            ),
        };

        let url = format!(
            "{}?latitude={latitude}&longitude={longitude}\
             &daily={daily_fields}&hourly={hourly_fields}&timezone=auto&forecast_days={days}",
            self.base_url
        );

        let body: ForecastResponse = self.fetch(&url).await?;
        let daily = body
            .daily
            .ok_or_else(|| WeatherError::Parse("response has no daily block".to_string()))?;
        let hourly = body
            .hourly
            .ok_or_else(|| WeatherError::Parse("response has no hourly block".to_string()))?;

        let daily_dates = daily
            .time
            .iter()
            .map(|s| {
                NaiveDate::parse_from_str(s, DAILY_DATE_FORMAT)
                    .map_err(|e| WeatherError::Parse(format!("bad daily date {s:?}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let hourly_precipitation = match mode {
            RainMode::DailySum => hourly.precipitation,
            RainMode::HourlyProbability => hourly.precipitation_probability,
        };

        // Absent arrays stay empty; the shaper rejects the batch rather than
        // inventing zeros for fields the provider never sent.
        Ok(ForecastSeries {
            daily_dates,
            daily_temp_max: daily.temperature_2m_max.unwrap_or_default(),
            daily_temp_min: daily.temperature_2m_min.unwrap_or_default(),
            daily_cloud_cover_mean: daily.cloudcover_mean.unwrap_or_default(),
            daily_precipitation_sum: daily.precipitation_sum.unwrap_or_default(),
            hourly_temperature: hourly.temperature_2m.unwrap_or_default(),
            hourly_precipitation: hourly_precipitation.unwrap_or_default(),
        })
    }
}

fn parse_daily_time(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DAILY_TIME_FORMAT).ok()
}
