//! Recent-earthquake feed for the globe view.
//!
//! [`QuakeClient`] talks to the USGS event service and [`QuakeMonitor`]
//! keeps a periodically refreshed snapshot for the UI to read.

pub mod client;
pub mod monitor;
pub mod types;

pub use client::QuakeClient;
pub use monitor::QuakeMonitor;
pub use types::{AlertSeverity, EventKind, QuakeError, SeismicEvent};
