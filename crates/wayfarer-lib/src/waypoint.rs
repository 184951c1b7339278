//! User-dropped waypoints and their lifecycle.
//!
//! Waypoints are route stops the user places directly on the map rather than
//! picking from the authored markers. Each may carry a release hook for the
//! external resource it shadows (typically a host-side map annotation); the
//! hook runs exactly once, whether the waypoint is deleted individually,
//! cleared in bulk, or dropped with the manager.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::map::{MapPoint, Marker, MarkerId};

/// Release hook for a waypoint's host-side resource.
pub type ReleaseHook = Box<dyn FnOnce() + Send>;

/// A placed waypoint. Owns the release hook; dropping the waypoint fires it.
pub struct Waypoint {
    marker: Marker,
    release: Option<ReleaseHook>,
}

impl Waypoint {
    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn id(&self) -> &str {
        &self.marker.id
    }

    pub fn position(&self) -> MapPoint {
        self.marker.position()
    }
}

impl fmt::Debug for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waypoint")
            .field("marker", &self.marker)
            .field("has_release", &self.release.is_some())
            .finish()
    }
}

impl Drop for Waypoint {
    fn drop(&mut self) {
        // The hook fires at most once.
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Creates, looks up and deletes waypoints, assigning sequential ids.
#[derive(Debug, Default)]
pub struct WaypointManager {
    waypoints: HashMap<MarkerId, Waypoint>,
    next_id: u64,
}

impl WaypointManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a waypoint at the given position.
    pub fn create(&mut self, x: f64, y: f64) -> Result<&Marker> {
        self.create_inner(x, y, None)
    }

    /// Places a waypoint carrying a release hook for its host-side resource.
    pub fn create_with_release(
        &mut self,
        x: f64,
        y: f64,
        release: impl FnOnce() + Send + 'static,
    ) -> Result<&Marker> {
        self.create_inner(x, y, Some(Box::new(release)))
    }

    fn create_inner(&mut self, x: f64, y: f64, release: Option<ReleaseHook>) -> Result<&Marker> {
        if !MapPoint::new(x, y).is_finite() {
            return Err(Error::NonFiniteCoordinates {
                what: "waypoint",
                id: format!("waypoint_{}", self.next_id + 1),
                x,
                y,
            });
        }

        self.next_id += 1;
        let id = format!("waypoint_{}", self.next_id);
        let marker = Marker::waypoint(id.clone(), format!("Waypoint {}", self.next_id), x, y);
        debug!(id = %id, x, y, "created waypoint");

        let entry = self
            .waypoints
            .entry(id)
            .or_insert(Waypoint { marker, release });
        Ok(&entry.marker)
    }

    pub fn get(&self, id: &str) -> Option<&Marker> {
        self.waypoints.get(id).map(Waypoint::marker)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.waypoints.contains_key(id)
    }

    /// Deletes a waypoint, firing its release hook. Returns whether the id
    /// named a live waypoint.
    pub fn delete(&mut self, id: &str) -> bool {
        match self.waypoints.remove(id) {
            Some(_waypoint) => {
                debug!(id, "deleted waypoint");
                true
            }
            None => false,
        }
    }

    /// Deletes every waypoint, firing each release hook.
    pub fn clear(&mut self) {
        let count = self.waypoints.len();
        self.waypoints.clear();
        if count > 0 {
            debug!(count, "cleared waypoints");
        }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.waypoints.values().map(Waypoint::marker)
    }
}
