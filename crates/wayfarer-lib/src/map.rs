//! Authored map data consumed by the routing core.
//!
//! The canonical dataset (points of interest, terrain polygons, road
//! polylines) is owned by the surrounding application; this module defines the
//! snapshot types the routing core reads. Geometry arrives as `geo` primitives
//! because parsing whatever wire format the host uses (GeoJSON or otherwise)
//! is the host's job, not ours.

use std::collections::HashMap;

use geo::{coord, Coord, CoordsIter, Geometry, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// String identifier for a marker (point of interest or waypoint).
pub type MarkerId = String;

/// Fallback land speed in km per day when a profile carries a bad value.
pub const DEFAULT_LAND_SPEED: f64 = 30.0;
/// Fallback sea speed in km per day when a profile carries a bad value.
pub const DEFAULT_SEA_SPEED: f64 = 120.0;
/// Default conversion factor from map units to kilometres.
pub const DEFAULT_KM_PER_UNIT: f64 = 100.0 / 115.0;

/// Planar coordinates in authored map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

impl MapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point, in map units.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub(crate) fn coord(&self) -> Coord<f64> {
        coord! { x: self.x, y: self.y }
    }
}

impl From<Coord<f64>> for MapPoint {
    fn from(c: Coord<f64>) -> Self {
        Self { x: c.x, y: c.y }
    }
}

/// A named point of interest or a user-placed waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: MarkerId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Ports may anchor sea legs when sea travel is enabled.
    #[serde(default)]
    pub is_port: bool,
    /// Waypoints are temporary, user-placed and never persisted.
    #[serde(default)]
    pub is_waypoint: bool,
}

impl Marker {
    /// Plain point of interest without port or waypoint flags.
    pub fn poi(id: impl Into<MarkerId>, name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            x,
            y,
            is_port: false,
            is_waypoint: false,
        }
    }

    /// Point of interest flagged as a port.
    pub fn port(id: impl Into<MarkerId>, name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            is_port: true,
            ..Self::poi(id, name, x, y)
        }
    }

    /// User-dropped waypoint.
    pub fn waypoint(id: impl Into<MarkerId>, name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            is_waypoint: true,
            ..Self::poi(id, name, x, y)
        }
    }

    pub fn position(&self) -> MapPoint {
        MapPoint::new(self.x, self.y)
    }

    /// Whether this marker may anchor a sea leg. Waypoints count: they are
    /// user-placed and may legitimately sit on open water.
    pub fn is_port_capable(&self) -> bool {
        self.is_port || self.is_waypoint
    }
}

/// Traversal-difficulty classification of a terrain feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    Road,
    Normal,
    Medium,
    Forest,
    Difficult,
    Unpassable,
    Blocked,
    Sea,
    Water,
}

/// A terrain polygon or polyline with a difficulty kind.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainFeature {
    pub id: String,
    pub kind: TerrainKind,
    pub geometry: Geometry<f64>,
}

impl TerrainFeature {
    pub fn polygon(id: impl Into<String>, kind: TerrainKind, polygon: Polygon<f64>) -> Self {
        Self {
            id: id.into(),
            kind,
            geometry: Geometry::Polygon(polygon),
        }
    }

    pub fn multi_polygon(
        id: impl Into<String>,
        kind: TerrainKind,
        polygons: MultiPolygon<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            geometry: Geometry::MultiPolygon(polygons),
        }
    }

    pub fn line(id: impl Into<String>, kind: TerrainKind, line: LineString<f64>) -> Self {
        Self {
            id: id.into(),
            kind,
            geometry: Geometry::LineString(line),
        }
    }

    pub fn is_polyline(&self) -> bool {
        matches!(self.geometry, Geometry::LineString(_))
    }
}

/// Axis-aligned bounding box of the authored map data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl MapBounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Named speed model used to turn path distance into travel time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelProfile {
    pub label: String,
    /// Overland speed in km per day, slowed further by terrain multipliers.
    pub land_speed: f64,
    /// Ship speed in km per day, independent of the traveller.
    pub sea_speed: f64,
}

impl TravelProfile {
    pub fn new(label: impl Into<String>, land_speed: f64, sea_speed: f64) -> Self {
        Self {
            label: label.into(),
            land_speed,
            sea_speed,
        }
    }

    /// Land speed with non-finite or non-positive values replaced by the
    /// walking default.
    pub fn effective_land_speed(&self) -> f64 {
        if self.land_speed.is_finite() && self.land_speed > 0.0 {
            self.land_speed
        } else {
            DEFAULT_LAND_SPEED
        }
    }

    /// Sea speed with non-finite or non-positive values replaced by the
    /// default ship speed.
    pub fn effective_sea_speed(&self) -> f64 {
        if self.sea_speed.is_finite() && self.sea_speed > 0.0 {
            self.sea_speed
        } else {
            DEFAULT_SEA_SPEED
        }
    }
}

impl Default for TravelProfile {
    fn default() -> Self {
        Self::new("Walking", DEFAULT_LAND_SPEED, DEFAULT_SEA_SPEED)
    }
}

/// Snapshot of the authored map consumed by graph construction.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    markers: HashMap<MarkerId, Marker>,
    features: Vec<TerrainFeature>,
}

impl MapData {
    pub fn new(markers: Vec<Marker>, features: Vec<TerrainFeature>) -> Self {
        let mut by_id = HashMap::with_capacity(markers.len());
        for marker in markers {
            if let Some(previous) = by_id.insert(marker.id.clone(), marker) {
                warn!(id = %previous.id, "duplicate marker id in map data, keeping the later one");
            }
        }
        Self {
            markers: by_id,
            features,
        }
    }

    pub fn marker(&self, id: &str) -> Option<&Marker> {
        self.markers.get(id)
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn features(&self) -> &[TerrainFeature] {
        &self.features
    }

    pub fn insert_marker(&mut self, marker: Marker) {
        self.markers.insert(marker.id.clone(), marker);
    }

    pub fn remove_marker(&mut self, id: &str) -> Option<Marker> {
        self.markers.remove(id)
    }

    pub fn set_features(&mut self, features: Vec<TerrainFeature>) {
        self.features = features;
    }

    /// Road polylines feeding the roads graph layer. Only line geometry
    /// counts; a road-kind polygon is not part of the road network.
    pub fn road_polylines(&self) -> impl Iterator<Item = &LineString<f64>> {
        self.features.iter().filter_map(|feature| {
            if feature.kind != TerrainKind::Road {
                return None;
            }
            match &feature.geometry {
                Geometry::LineString(line) => Some(line),
                _ => None,
            }
        })
    }

    /// Rejects markers and features carrying non-finite coordinates. Bad
    /// geometry deterministically produces unreachable legs later, so it is
    /// reported up front instead of being swallowed.
    pub fn validate(&self) -> Result<()> {
        for marker in self.markers.values() {
            if !marker.position().is_finite() {
                return Err(Error::NonFiniteCoordinates {
                    what: "marker",
                    id: marker.id.clone(),
                    x: marker.x,
                    y: marker.y,
                });
            }
        }
        for feature in &self.features {
            for coord in feature.geometry.coords_iter() {
                if !coord.x.is_finite() || !coord.y.is_finite() {
                    return Err(Error::NonFiniteCoordinates {
                        what: "terrain feature",
                        id: feature.id.clone(),
                        x: coord.x,
                        y: coord.y,
                    });
                }
            }
        }
        Ok(())
    }
}
