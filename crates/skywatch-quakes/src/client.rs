//! USGS FDSN event feed client.

use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::types::{AlertSeverity, EventKind, QuakeError, SeismicEvent};
use skywatch_core::{NetworkError, ReqwestErrorExt};

const FEED_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    id: String,
    properties: Properties,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    /// Milliseconds since the epoch.
    time: Option<i64>,
    alert: Option<String>,
    #[serde(default)]
    tsunami: i64,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// `[longitude, latitude, depth_km]`
    coordinates: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct QuakeClient {
    client: Client,
    base_url: String,
}

impl QuakeClient {
    /// # Errors
    ///
    /// Returns [`NetworkError`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client,
            base_url: FEED_URL.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Most recent events, newest first, dropping anything older than
    /// `max_age_hours` relative to `now`.
    ///
    /// Features without usable coordinates or a timestamp are skipped with
    /// a debug log rather than failing the batch - the globe can render the
    /// rest.
    ///
    /// # Errors
    ///
    /// [`QuakeError::Network`] on connectivity or non-2xx responses,
    /// [`QuakeError::Parse`] when the body is not the expected GeoJSON.
    pub async fn recent(
        &self,
        limit: u32,
        max_age_hours: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeismicEvent>, QuakeError> {
        let url = format!(
            "{}?format=geojson&limit={limit}&orderby=time",
            self.base_url
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| QuakeError::Network(e.into_network_error()))?;

        if !response.status().is_success() {
            return Err(QuakeError::Network(NetworkError::ServerError {
                status: response.status().as_u16(),
                message: format!("seismic feed returned {}", response.status()),
            }));
        }

        let body: FeedResponse = response
            .json()
            .await
            .map_err(|e| QuakeError::Parse(e.to_string()))?;

        let cutoff = now - Duration::hours(i64::from(max_age_hours));
        let events = body
            .features
            .into_iter()
            .filter_map(|feature| match into_event(feature) {
                Some(event) if event.time >= cutoff => Some(event),
                Some(_) => None,
                None => None,
            })
            .collect();

        Ok(events)
    }
}

fn into_event(feature: Feature) -> Option<SeismicEvent> {
    let geometry = match feature.geometry {
        Some(g) if g.coordinates.len() >= 2 => g,
        _ => {
            tracing::debug!("Skipping event {} without coordinates", feature.id);
            return None;
        }
    };

    let millis = feature.properties.time?;
    let time = Utc.timestamp_millis_opt(millis).single()?;

    let kind = if feature.properties.tsunami == 1 {
        EventKind::Tsunami
    } else {
        EventKind::Earthquake
    };

    Some(SeismicEvent {
        id: feature.id,
        place: feature
            .properties
            .place
            .unwrap_or_else(|| "Unknown".to_string()),
        magnitude: feature.properties.mag,
        time,
        kind,
        depth_km: geometry.coordinates.get(2).copied(),
        latitude: geometry.coordinates[1],
        longitude: geometry.coordinates[0],
        alert: AlertSeverity::from_tag(feature.properties.alert.as_deref()),
        url: feature.properties.url,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn feature(id: &str, time: DateTime<Utc>, alert: Option<&str>, tsunami: i64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "properties": {
                "mag": 5.4,
                "place": "120 km SSE of Somewhere",
                "time": time.timestamp_millis(),
                "alert": alert,
                "tsunami": tsunami,
                "url": "https://earthquake.usgs.gov/earthquakes/eventpage/test"
            },
            "geometry": {"coordinates": [142.3, 38.1, 29.0]}
        })
    }

    #[tokio::test]
    async fn test_recent_parses_events() {
        let mock_server = MockServer::start().await;
        let now = Utc::now();

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("format", "geojson"))
            .and(query_param("limit", "200"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "features": [
                    feature("q1", now - Duration::hours(1), Some("red"), 0),
                    feature("q2", now - Duration::hours(2), None, 1)
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = QuakeClient::new_with_base_url(&mock_server.uri());
        let events = client.recent(200, 24, now).await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].alert, AlertSeverity::Red);
        assert_eq!(events[0].kind, EventKind::Earthquake);
        assert_eq!(events[1].kind, EventKind::Tsunami);
        assert_eq!(events[1].alert, AlertSeverity::None);
        assert!((events[0].latitude - 38.1).abs() < f64::EPSILON);
        assert_eq!(events[0].depth_km, Some(29.0));
    }

    #[tokio::test]
    async fn test_recent_drops_stale_events() {
        let mock_server = MockServer::start().await;
        let now = Utc::now();

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "features": [
                    feature("fresh", now - Duration::hours(23), None, 0),
                    feature("stale", now - Duration::hours(25), None, 0)
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = QuakeClient::new_with_base_url(&mock_server.uri());
        let events = client.recent(200, 24, now).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "fresh");
    }

    #[tokio::test]
    async fn test_recent_skips_features_without_geometry() {
        let mock_server = MockServer::start().await;
        let now = Utc::now();

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "features": [
                    {"id": "broken", "properties": {"time": now.timestamp_millis(), "tsunami": 0}, "geometry": null},
                    feature("ok", now, None, 0)
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = QuakeClient::new_with_base_url(&mock_server.uri());
        let events = client.recent(200, 24, now).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "ok");
    }

    #[tokio::test]
    async fn test_feed_failure_is_network_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = QuakeClient::new_with_base_url(&mock_server.uri());
        let err = client.recent(200, 24, Utc::now()).await.unwrap_err();
        assert!(matches!(
            err,
            QuakeError::Network(NetworkError::ServerError { status: 503, .. })
        ));
    }
}
