//! Message body formatting.

use skywatch_weather::WeatherSnapshot;

/// WhatsApp-friendly weather report for a city.
pub fn weather_report(city: &str, snapshot: &WeatherSnapshot) -> String {
    let condition = snapshot.condition.description();

    format!(
        "🌍 *Weather Report for {city}*:\n\
         🌡 Temperature: {temp}°C\n\
         💨 Wind Speed: {wind} km/h\n\
         💧 Humidity: {humidity}%\n\
         🌦 Condition: {condition}",
        temp = snapshot.temperature,
        wind = snapshot.wind_speed,
        humidity = snapshot.humidity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use skywatch_weather::SkyCondition;

    fn snapshot(condition: SkyCondition) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: 29.5,
            humidity: 70.0,
            wind_speed: 2.2,
            cloud_cover: 60.0,
            visibility: None,
            pressure: None,
            sunrise: None,
            sunset: None,
            is_night: false,
            condition,
        }
    }

    #[test]
    fn test_report_includes_all_fields() {
        let report = weather_report("Karnal", &snapshot(SkyCondition::Cloudy));
        assert!(report.contains("Weather Report for Karnal"));
        assert!(report.contains("Temperature: 29.5°C"));
        assert!(report.contains("Wind Speed: 2.2 km/h"));
        assert!(report.contains("Humidity: 70%"));
        assert!(report.contains("Condition: Cloudy"));
    }

    #[test]
    fn test_report_clear_condition() {
        let report = weather_report("Paris", &snapshot(SkyCondition::Clear));
        assert!(report.contains("Condition: Clear"));
    }
}
