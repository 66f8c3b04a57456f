//! HTTP API for the messaging relay.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::error::RelayError;
use crate::gateway::MessageGateway;
use crate::report::weather_report;
use skywatch_weather::{build_snapshot, ForecastClient, GeocodeClient, GeocodeError};

#[derive(Clone)]
pub struct AppState {
    pub geocode: GeocodeClient,
    pub provider: ForecastClient,
    pub gateway: MessageGateway,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendWeatherRequest {
    phone_number: String,
    city: String,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/send-weather", post(send_weather))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve the relay API until the process stops.
///
/// # Errors
///
/// Returns an error if the port cannot be bound.
pub async fn serve(port: u16, state: AppState) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Relay server running at http://localhost:{}", port);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn send_weather(
    State(state): State<AppState>,
    Json(request): Json<SendWeatherRequest>,
) -> (StatusCode, Json<Value>) {
    let place = match state.geocode.search(&request.city, "").await {
        Ok(place) => place,
        Err(e @ GeocodeError::NoMatchFound(_)) => {
            return (StatusCode::NOT_FOUND, Json(json!({"error": e.user_message()})));
        }
        Err(e) => {
            warn!("Geocoding failed for '{}': {}", request.city, e);
            return (StatusCode::BAD_GATEWAY, Json(json!({"error": e.user_message()})));
        }
    };

    let reading = match state.provider.current(place.latitude, place.longitude).await {
        Ok(reading) => reading,
        Err(e) => {
            warn!("Weather fetch failed for '{}': {}", request.city, e);
            return (StatusCode::BAD_GATEWAY, Json(json!({"error": e.user_message()})));
        }
    };

    let snapshot = match build_snapshot(&reading, chrono::Local::now().naive_local()) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Incomplete reading for '{}': {}", request.city, e);
            return (StatusCode::BAD_GATEWAY, Json(json!({"error": e.user_message()})));
        }
    };

    let body = weather_report(&request.city, &snapshot);
    match state.gateway.send(&request.phone_number, &body).await {
        Ok(sid) => {
            info!("Weather report for {} relayed, sid {}", request.city, sid);
            (
                StatusCode::OK,
                Json(json!({"message": "Weather report sent to WhatsApp!"})),
            )
        }
        Err(e @ RelayError::NotConfigured) => {
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": e.user_message()})))
        }
        Err(e) => {
            warn!("Gateway send failed: {}", e);
            (StatusCode::BAD_GATEWAY, Json(json!({"error": e.user_message()})))
        }
    }
}
