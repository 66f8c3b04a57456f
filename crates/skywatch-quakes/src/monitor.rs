//! Background polling of the seismic feed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::QuakeClient;
use crate::types::SeismicEvent;
use skywatch_core::QuakesConfig;

/// Holds the latest batch of seismic events and refreshes it on an
/// interval. A failed poll keeps the previous batch.
#[derive(Clone)]
pub struct QuakeMonitor {
    client: QuakeClient,
    events: Arc<RwLock<Vec<SeismicEvent>>>,
    refresh_minutes: u32,
    max_age_hours: u32,
    fetch_limit: u32,
}

impl QuakeMonitor {
    pub fn new(client: QuakeClient, config: &QuakesConfig) -> Self {
        Self {
            client,
            events: Arc::new(RwLock::new(Vec::new())),
            refresh_minutes: config.refresh_minutes,
            max_age_hours: config.max_age_hours,
            fetch_limit: config.fetch_limit,
        }
    }

    /// Current snapshot of events, newest first.
    pub fn events(&self) -> Vec<SeismicEvent> {
        self.events.read().clone()
    }

    /// Fetch once and replace the snapshot. On failure the previous
    /// snapshot stays in place.
    pub async fn poll_once(&self) {
        match self
            .client
            .recent(self.fetch_limit, self.max_age_hours, Utc::now())
            .await
        {
            Ok(batch) => {
                debug!("Seismic feed returned {} events", batch.len());
                *self.events.write() = batch;
            }
            Err(e) => {
                warn!("Seismic feed poll failed, keeping previous events: {e}");
            }
        }
    }

    /// Poll immediately, then on the configured interval, until `cancel`
    /// fires.
    ///
    /// A zero refresh interval means polling is disabled: no fetches happen
    /// and the task just waits for cancellation.
    pub async fn run(&self, cancel: CancellationToken) {
        if self.refresh_minutes == 0 {
            debug!("Seismic feed polling disabled (0 minutes)");
            cancel.cancelled().await;
            return;
        }

        let period = Duration::from_secs(u64::from(self.refresh_minutes) * 60);
        let mut interval = tokio::time::interval(period);

        loop {
            tokio::select! {
                _ = interval.tick() => self.poll_once().await,
                () = cancel.cancelled() => {
                    debug!("Seismic monitor stopping");
                    return;
                }
            }
        }
    }
}
