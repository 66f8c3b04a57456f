//! Forecast shaping: raw provider arrays into per-day view models.
//!
//! Pure transformation with no hidden state; shaping the same input twice
//! yields structurally equal output. The two upstream fetch variants (daily
//! precipitation sums vs. hourly probabilities) are covered by one
//! implementation, selected through [`RainMode`].

use chrono::NaiveDateTime;

use crate::types::{DailyForecast, ForecastSeries, HourIcon, HourSlot, WeatherError};
use skywatch_core::config::RainMode;

/// Hour slots per forecast day.
pub const HOURS_PER_DAY: usize = 24;

/// Daily-sum mode: any measurable amount above this (mm) shows the rain icon.
pub const RAIN_AMOUNT_THRESHOLD_MM: f64 = 0.0;

/// Probability mode: a chance above this (percent) shows the rain icon.
pub const RAIN_PROBABILITY_THRESHOLD_PCT: f64 = 20.0;

/// 12-hour clock label for an hour index, "12 AM" through "11 PM".
pub fn hour_label(hour: usize) -> String {
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    let suffix = if hour < 12 { "AM" } else { "PM" };
    format!("{display} {suffix}")
}

fn icon_for(precipitation: f64, mode: RainMode) -> HourIcon {
    let threshold = match mode {
        RainMode::DailySum => RAIN_AMOUNT_THRESHOLD_MM,
        RainMode::HourlyProbability => RAIN_PROBABILITY_THRESHOLD_PCT,
    };
    if precipitation > threshold {
        HourIcon::Rain
    } else {
        HourIcon::Clear
    }
}

fn check_len(
    array: &'static str,
    actual: usize,
    expected: usize,
) -> Result<(), WeatherError> {
    if actual == expected {
        Ok(())
    } else {
        Err(WeatherError::MalformedForecastData {
            array,
            expected,
            actual,
        })
    }
}

/// Normalize a raw forecast payload into one [`DailyForecast`] per source day.
///
/// `reference` is only consulted for the `is_today` flag, by calendar date.
/// Missing hourly entries normalize to `None` (temperature) and `0.0`
/// (precipitation); a structural length mismatch rejects the whole batch
/// instead; silent truncation would attribute hours to the wrong day.
///
/// # Errors
///
/// [`WeatherError::MalformedForecastData`] when any hourly array is not
/// exactly `24 * daily_dates.len()` entries long, or a daily array does not
/// match `daily_dates` (the daily sum array is only required in
/// [`RainMode::DailySum`]).
pub fn shape_forecast(
    series: &ForecastSeries,
    reference: NaiveDateTime,
    mode: RainMode,
) -> Result<Vec<DailyForecast>, WeatherError> {
    let days = series.daily_dates.len();
    let expected_hours = days * HOURS_PER_DAY;

    // Validate the whole batch up front; nothing is produced on mismatch.
    check_len("hourly_temperature", series.hourly_temperature.len(), expected_hours)?;
    check_len("hourly_precipitation", series.hourly_precipitation.len(), expected_hours)?;
    check_len("daily_temp_max", series.daily_temp_max.len(), days)?;
    check_len("daily_temp_min", series.daily_temp_min.len(), days)?;
    check_len("daily_cloud_cover_mean", series.daily_cloud_cover_mean.len(), days)?;
    if mode == RainMode::DailySum {
        check_len("daily_precipitation_sum", series.daily_precipitation_sum.len(), days)?;
    }

    let today = reference.date();

    let forecast = series
        .daily_dates
        .iter()
        .enumerate()
        .map(|(day, &date)| {
            let start = day * HOURS_PER_DAY;
            let hourly: Vec<HourSlot> = (0..HOURS_PER_DAY)
                .map(|hour| {
                    let precipitation =
                        series.hourly_precipitation[start + hour].unwrap_or(0.0);
                    HourSlot {
                        label: hour_label(hour),
                        temperature: series.hourly_temperature[start + hour],
                        precipitation,
                        icon: icon_for(precipitation, mode),
                    }
                })
                .collect();

            let rain_indicator = match mode {
                RainMode::DailySum => series.daily_precipitation_sum[day].unwrap_or(0.0),
                RainMode::HourlyProbability => {
                    let sum: f64 = hourly.iter().map(|h| h.precipitation).sum();
                    (sum / HOURS_PER_DAY as f64).round()
                }
            };

            DailyForecast {
                date,
                is_today: date == today,
                temp_max: series.daily_temp_max[day],
                temp_min: series.daily_temp_min[day],
                rain_indicator,
                cloud_cover_mean: series.daily_cloud_cover_mean[day].unwrap_or(0.0),
                hourly,
            }
        })
        .collect();

    Ok(forecast)
}
