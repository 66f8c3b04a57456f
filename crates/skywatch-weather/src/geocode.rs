//! Geocoding: place names to coordinates and back.
//!
//! Forward lookup uses the Open-Meteo geocoding API, reverse lookup uses
//! Nominatim (OpenStreetMap) - both free, no API key required.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::GeocodeError;
use skywatch_core::{NetworkError, ReqwestErrorExt};

const SEARCH_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Skywatch/0.1.0 (https://github.com/skywatch)";

/// One resolved place from a forward lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodedPlace {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    /// First-level administrative area (state/province).
    pub admin1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Option<Vec<GeocodedPlace>>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
    #[allow(dead_code)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    #[serde(rename = "state_district")]
    state_district: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    search_url: String,
    reverse_url: String,
}

impl GeocodeClient {
    /// # Errors
    ///
    /// Returns [`NetworkError`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client,
            search_url: SEARCH_URL.to_string(),
            reverse_url: REVERSE_URL.to_string(),
        })
    }

    /// Point the client at alternate endpoints. Tests use this with a
    /// local mock server.
    pub fn new_with_base_urls(search_url: &str, reverse_url: &str) -> Self {
        Self {
            client: Client::new(),
            search_url: search_url.to_string(),
            reverse_url: reverse_url.to_string(),
        }
    }

    /// Forward lookup: resolve "city, country" to coordinates and address
    /// components. Only city and country go into the query - it matches
    /// better than a full address string.
    ///
    /// # Errors
    ///
    /// [`GeocodeError::NoMatchFound`] when the provider returns zero results,
    /// [`GeocodeError::Network`] on connectivity or non-2xx responses.
    pub async fn search(&self, city: &str, country: &str) -> Result<GeocodedPlace, GeocodeError> {
        let query = if country.is_empty() {
            city.to_string()
        } else {
            format!("{city}, {country}")
        };
        let url = format!(
            "{}?name={}&count=1&language=en&format=json",
            self.search_url,
            urlencoding::encode(&query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GeocodeError::Network(e.into_network_error()))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Network(NetworkError::ServerError {
                status: response.status().as_u16(),
                message: format!("geocoding search returned {}", response.status()),
            }));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Network(NetworkError::InvalidResponse(e.to_string())))?;

        let place = body
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(GeocodeError::NoMatchFound(query))?;

        tracing::info!(
            "Geocoded to: {} ({}, {})",
            place.name,
            place.latitude,
            place.longitude
        );
        Ok(place)
    }

    /// Reverse geocode coordinates to a human-readable place name
    /// (e.g. "Karnal, Haryana").
    ///
    /// Returns `None` on failure or timeout; the caller falls back to
    /// showing raw coordinates.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Option<String> {
        let url = format!(
            "{}?lat={}&lon={}&format=json&addressdetails=1&layer=address&zoom=10",
            self.reverse_url, latitude, longitude
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let addr = body.address?;

        // Capture state/country before the place chain consumes them
        let state = addr.state.clone();
        let country = addr.country.clone();

        // Prefer city > town > village > municipality for the primary place name
        let place = addr
            .city
            .or(addr.town)
            .or(addr.village)
            .or(addr.municipality)
            .or(addr.state_district)
            .or(addr.county)
            .or(addr.state)
            .or(addr.country)?;

        // Add state/country for disambiguation when different from place
        let suffix = state
            .as_ref()
            .filter(|s| !s.is_empty() && s.as_str() != &place)
            .map(String::as_str)
            .or_else(|| {
                country
                    .as_ref()
                    .filter(|c| !c.is_empty() && c.as_str() != &place)
                    .map(String::as_str)
            });

        let result = match suffix {
            Some(s) if !s.is_empty() && s != &place => format!("{}, {}", place, s),
            _ => place,
        };

        tracing::info!("Reverse geocoded to: {}", result);
        Some(result)
    }
}
