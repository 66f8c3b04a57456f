//! Weather core for Skywatch
//!
//! Location state, forecast shaping, and the geocoding/forecast provider
//! clients every dashboard view consumes.

pub mod geocode;
pub mod provider;
pub mod service;
pub mod shaper;
pub mod snapshot;
pub mod store;
pub mod types;

pub use geocode::{GeocodeClient, GeocodedPlace};
pub use provider::ForecastClient;
pub use service::WeatherService;
pub use shaper::shape_forecast;
pub use snapshot::build_snapshot;
pub use store::LocationStore;
pub use types::*;
