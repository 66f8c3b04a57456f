//! Point-in-time classification of a current-conditions reading.

use chrono::{NaiveDateTime, Timelike};

use crate::types::{CurrentReading, SkyCondition, WeatherError, WeatherSnapshot};

/// Cloud cover strictly above this percentage reads as cloudy.
pub const CLOUDY_THRESHOLD_PCT: f64 = 50.0;

/// Fallback night window when the reading carries no sun times.
const NIGHT_START_HOUR: u32 = 18;
const NIGHT_END_HOUR: u32 = 6;

fn require(value: Option<f64>, field: &'static str) -> Result<f64, WeatherError> {
    value.ok_or(WeatherError::IncompleteSnapshot(field))
}

/// Classify a raw reading against a reference instant.
///
/// Night is "outside [sunrise, sunset]" when the reading supplies both;
/// otherwise a fixed clock-hour heuristic (18:00 to 06:00) applies.
///
/// # Errors
///
/// [`WeatherError::IncompleteSnapshot`] when temperature, humidity, wind
/// speed, or cloud cover is missing.
pub fn build_snapshot(
    reading: &CurrentReading,
    reference: NaiveDateTime,
) -> Result<WeatherSnapshot, WeatherError> {
    let temperature = require(reading.temperature, "temperature")?;
    let humidity = require(reading.humidity, "humidity")?;
    let wind_speed = require(reading.wind_speed, "wind_speed")?;
    let cloud_cover = require(reading.cloud_cover, "cloud_cover")?;

    let is_night = match (reading.sunrise, reading.sunset) {
        (Some(sunrise), Some(sunset)) => reference < sunrise || reference > sunset,
        _ => {
            let hour = reference.hour();
            hour >= NIGHT_START_HOUR || hour < NIGHT_END_HOUR
        }
    };

    let condition = if cloud_cover > CLOUDY_THRESHOLD_PCT {
        SkyCondition::Cloudy
    } else {
        SkyCondition::Clear
    };

    Ok(WeatherSnapshot {
        temperature,
        humidity,
        wind_speed,
        cloud_cover,
        visibility: reading.visibility,
        pressure: reading.pressure,
        sunrise: reading.sunrise,
        sunset: reading.sunset,
        is_night,
        condition,
    })
}
