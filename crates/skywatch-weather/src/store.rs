//! Process-wide location state.
//!
//! A cheap cloneable handle; every view holds a clone and observes the same
//! record. Mutation happens only through [`LocationStore::set`], which
//! replaces the whole record atomically; there are no merge semantics, so a
//! partial edit is assembled by the caller from a `get` copy.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::types::Location;
use skywatch_core::config::LocationConfig;

#[derive(Debug, Clone)]
pub struct LocationStore {
    inner: Arc<RwLock<Location>>,
}

impl LocationStore {
    pub fn new(initial: Location) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Current location. Never fails; returns a snapshot copy.
    pub fn get(&self) -> Location {
        self.inner.read().clone()
    }

    /// Atomically replace the stored location.
    ///
    /// No range validation is performed; callers supply a consistent record
    /// (coordinates matching the place name).
    pub fn set(&self, location: Location) {
        *self.inner.write() = location;
    }
}

impl Default for LocationStore {
    /// Store seeded with the built-in default place.
    fn default() -> Self {
        Self::new(Location::from(LocationConfig::default()))
    }
}
