use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::entry::Entry};

/// Content locations with a download or receive workflow in flight
///
/// Shared between the download step, which calls [`DownloadTracker::begin`], and the
/// receiver, which calls [`DownloadTracker::finish`] once the run is complete.
#[derive(Debug, Clone, Default)]
pub struct DownloadTracker {
    in_flight: Arc<DashMap<String, Instant>>,
}

impl DownloadTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `location` as in flight
    ///
    /// Returns `false` if it already was.
    pub fn begin(&self, location: &str) -> bool {
        match self.in_flight.entry(location.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                true
            }
        }
    }

    /// Mark `location` as done, returning how long it was in flight
    pub fn finish(&self, location: &str) -> Option<Duration> {
        self.in_flight
            .remove(location)
            .map(|(_, started)| started.elapsed())
    }

    #[must_use]
    pub fn is_in_progress(&self, location: &str) -> bool {
        self.in_flight.contains_key(location)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}
