//! WhatsApp weather relay.
//!
//! A small HTTP service: POST a phone number and a city, it resolves the
//! city, fetches current conditions, and delivers a formatted report
//! through the messaging gateway.

pub mod error;
pub mod gateway;
pub mod report;
pub mod routes;

pub use error::RelayError;
pub use gateway::MessageGateway;
pub use report::weather_report;
pub use routes::{router, serve, AppState};
