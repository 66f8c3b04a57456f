//! Ties the location store, geocoding, provider, and shaper together.
//!
//! Control flow mirrors the dashboard: a user action resolves a place,
//! the store is replaced, and forecast-consuming views re-request data for
//! whatever the store currently holds. Geocoding failures during a location
//! update surface to the caller with the store untouched; fetch failures in
//! `forecast`/`snapshot` propagate so the view can log them and keep showing
//! its previous data.

use chrono::NaiveDateTime;

use crate::geocode::GeocodeClient;
use crate::provider::ForecastClient;
use crate::shaper::shape_forecast;
use crate::snapshot::build_snapshot;
use crate::store::LocationStore;
use crate::types::{DailyForecast, GeocodeError, Location, WeatherError, WeatherSnapshot};
use skywatch_core::config::{RainMode, WeatherConfig};
use skywatch_core::NetworkError;

pub struct WeatherService {
    store: LocationStore,
    geocode: GeocodeClient,
    provider: ForecastClient,
    rain_mode: RainMode,
    forecast_days: u8,
}

impl WeatherService {
    /// # Errors
    ///
    /// Returns [`NetworkError`] if an HTTP client cannot be built.
    pub fn new(config: &WeatherConfig, store: LocationStore) -> Result<Self, NetworkError> {
        Ok(Self {
            store,
            geocode: GeocodeClient::new()?,
            provider: ForecastClient::new()?,
            rain_mode: config.rain_mode,
            forecast_days: config.forecast_days,
        })
    }

    /// Build a service around preconfigured clients. Tests point these at
    /// a local mock server.
    pub fn with_clients(
        config: &WeatherConfig,
        store: LocationStore,
        geocode: GeocodeClient,
        provider: ForecastClient,
    ) -> Self {
        Self {
            store,
            geocode,
            provider,
            rain_mode: config.rain_mode,
            forecast_days: config.forecast_days,
        }
    }

    pub fn store(&self) -> &LocationStore {
        &self.store
    }

    /// Resolve a manually entered place and replace the stored location.
    ///
    /// The user-entered state is preserved as typed; city and country come
    /// back from the geocoder so the coordinates always describe the stored
    /// place name.
    ///
    /// # Errors
    ///
    /// [`GeocodeError`] when the place cannot be resolved; the store is left
    /// unchanged and the message is suitable for display.
    pub async fn update_location(
        &self,
        city: &str,
        state: &str,
        country: &str,
    ) -> Result<Location, GeocodeError> {
        let place = self.geocode.search(city, country).await?;

        let resolved_country = place.country.unwrap_or_else(|| country.to_string());
        let full_address = match &place.admin1 {
            Some(admin1) => format!("{}, {}, {}", place.name, admin1, resolved_country),
            None => format!("{}, {}", place.name, resolved_country),
        };

        let location = Location {
            city: place.name,
            state: state.to_string(),
            country: resolved_country,
            latitude: place.latitude,
            longitude: place.longitude,
            full_address: Some(full_address),
        };

        self.store.set(location.clone());
        tracing::info!("Location updated to {}, {}", location.city, location.country);
        Ok(location)
    }

    /// Replace the stored location from a map click.
    ///
    /// Reverse geocoding is best-effort: when it fails the coordinates are
    /// kept with a coordinate-pair display name instead of aborting.
    pub async fn update_location_from_coords(&self, latitude: f64, longitude: f64) -> Location {
        let resolved = self.geocode.reverse(latitude, longitude).await;

        let previous = self.store.get();
        let location = match resolved {
            Some(ref name) => {
                // "Place, Region": the leading segment is the city display name
                let city = name.split(',').next().unwrap_or(name.as_str()).trim().to_string();
                Location {
                    city,
                    state: String::new(),
                    country: previous.country,
                    latitude,
                    longitude,
                    full_address: resolved.clone(),
                }
            }
            None => Location {
                city: format!("{latitude:.4}, {longitude:.4}"),
                state: String::new(),
                country: previous.country,
                latitude,
                longitude,
                full_address: None,
            },
        };

        self.store.set(location.clone());
        location
    }

    /// Fetch and shape the multi-day forecast for the stored location.
    ///
    /// # Errors
    ///
    /// [`WeatherError`] on fetch failure or malformed provider data.
    pub async fn forecast(
        &self,
        reference: NaiveDateTime,
    ) -> Result<Vec<DailyForecast>, WeatherError> {
        let location = self.store.get();
        let series = self
            .provider
            .daily(
                location.latitude,
                location.longitude,
                self.forecast_days,
                self.rain_mode,
            )
            .await?;
        shape_forecast(&series, reference, self.rain_mode)
    }

    /// Fetch and classify current conditions for the stored location.
    ///
    /// # Errors
    ///
    /// [`WeatherError`] on fetch failure or an incomplete reading.
    pub async fn snapshot(&self, reference: NaiveDateTime) -> Result<WeatherSnapshot, WeatherError> {
        let location = self.store.get();
        let reading = self
            .provider
            .current(location.latitude, location.longitude)
            .await?;
        build_snapshot(&reading, reference)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_against(mock_server: &MockServer) -> WeatherService {
        let geocode = GeocodeClient::new_with_base_urls(
            &format!("{}/v1/search", mock_server.uri()),
            &format!("{}/reverse", mock_server.uri()),
        );
        let provider = ForecastClient::new_with_base_url(&format!("{}/forecast", mock_server.uri()));
        WeatherService::with_clients(
            &WeatherConfig::default(),
            LocationStore::default(),
            geocode,
            provider,
        )
    }

    #[tokio::test]
    async fn test_update_location_replaces_store() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{
                    "name": "Paris",
                    "latitude": 48.8566,
                    "longitude": 2.3522,
                    "country": "France",
                    "admin1": "Ile-de-France"
                }]
            })))
            .mount(&mock_server)
            .await;

        let service = service_against(&mock_server);
        let location = service.update_location("Paris", "", "France").await.unwrap();

        assert_eq!(location.city, "Paris");
        assert_eq!(location.full_address.as_deref(), Some("Paris, Ile-de-France, France"));
        assert_eq!(service.store().get(), location);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_store_unchanged() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let service = service_against(&mock_server);
        let before = service.store().get();
        let err = service.update_location("Atlantis", "", "Ocean").await.unwrap_err();

        assert!(matches!(err, GeocodeError::NoMatchFound(_)));
        assert_eq!(service.store().get(), before);
    }

    #[tokio::test]
    async fn test_coords_update_with_reverse_name() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": {"city": "Seattle", "state": "Washington", "country": "United States"}
            })))
            .mount(&mock_server)
            .await;

        let service = service_against(&mock_server);
        let location = service.update_location_from_coords(47.6062, -122.3321).await;

        assert_eq!(location.city, "Seattle");
        assert_eq!(location.full_address.as_deref(), Some("Seattle, Washington"));
        assert!((service.store().get().latitude - 47.6062).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_coords_update_falls_back_to_coordinates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let service = service_against(&mock_server);
        let location = service.update_location_from_coords(12.3456, -65.4321).await;

        assert_eq!(location.city, "12.3456, -65.4321");
        assert!(location.full_address.is_none());
    }

    #[tokio::test]
    async fn test_forecast_uses_stored_coordinates() {
        let mock_server = MockServer::start().await;

        let hourly: Vec<f64> = vec![26.0; 24];
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("latitude", "29.6857"))
            .and(query_param("forecast_days", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "daily": {
                    "time": ["2026-08-31"],
                    "temperature_2m_max": [31.0],
                    "temperature_2m_min": [24.0],
                    "precipitation_sum": [1.2],
                    "cloudcover_mean": [45.0]
                },
                "hourly": {
                    "temperature_2m": hourly.clone(),
                    "precipitation": hourly.iter().map(|_| 0.0).collect::<Vec<f64>>()
                }
            })))
            .mount(&mock_server)
            .await;

        let service = service_against(&mock_server);
        let reference =
            NaiveDateTime::parse_from_str("2026-08-31 10:00", "%Y-%m-%d %H:%M").unwrap();
        let forecast = service.forecast(reference).await.unwrap();

        assert_eq!(forecast.len(), 1);
        assert!(forecast[0].is_today);
        assert!((forecast[0].rain_indicator - 1.2).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_snapshot_classifies_reading() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current": {
                    "temperature_2m": 29.0,
                    "relative_humidity_2m": 70.0,
                    "wind_speed_10m": 2.2,
                    "cloudcover": 90.0,
                    "visibility": 9000.0,
                    "pressure_msl": 1002.0
                },
                "daily": {
                    "sunrise": ["2026-08-31T06:00"],
                    "sunset": ["2026-08-31T18:30"]
                }
            })))
            .mount(&mock_server)
            .await;

        let service = service_against(&mock_server);
        let reference =
            NaiveDateTime::parse_from_str("2026-08-31 12:00", "%Y-%m-%d %H:%M").unwrap();
        let snapshot = service.snapshot(reference).await.unwrap();

        assert!(!snapshot.is_night);
        assert_eq!(snapshot.condition, crate::types::SkyCondition::Cloudy);
    }
}
