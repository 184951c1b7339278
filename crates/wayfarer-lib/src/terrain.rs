//! Terrain cost model: "cost at point", "cost between points" and "is this
//! point water" queries over the authored terrain features.
//!
//! Precedence when several features overlap a point or segment:
//!
//! - `blocked`/`unpassable` short-circuit to their configured cost;
//! - water kinds short-circuit to the unpassable cost (navigable-sea pricing
//!   is applied by the grid layer, so classification and traversal cost stay
//!   decoupled);
//! - `difficult` short-circuits to its configured cost;
//! - `medium`/`forest` take the maximum of all overlapping such kinds, a
//!   conservative rather than cumulative penalty.
//!
//! Feature order matters for the short-circuit kinds, exactly as it does in
//! the authored dataset.

use std::collections::HashSet;

use geo::{BoundingRect, Contains, Geometry, Intersects, Line, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::map::{MapBounds, MapPoint, TerrainFeature, TerrainKind};

/// Bounds used when the map has no markers or terrain at all.
const FALLBACK_BOUNDS: MapBounds = MapBounds {
    min_x: 0.0,
    min_y: 0.0,
    max_x: 2500.0,
    max_y: 2500.0,
};

/// Dimensionless traversal multipliers per terrain kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerrainCosts {
    pub road: f64,
    pub normal: f64,
    pub medium: f64,
    pub forest: f64,
    pub difficult: f64,
    pub unpassable: f64,
    pub blocked: f64,
    /// Applied to water grid cells only while sea travel is enabled.
    pub sea: f64,
}

impl Default for TerrainCosts {
    fn default() -> Self {
        Self {
            road: 0.7,
            normal: 1.0,
            medium: 1.5,
            forest: 1.5,
            difficult: 2.0,
            unpassable: 50.0,
            blocked: 50.0,
            sea: 0.25,
        }
    }
}

impl TerrainCosts {
    /// Multiplier for a kind. Water-classified kinds price as unpassable
    /// here; the grid layer substitutes the sea cost when sea travel is on.
    pub fn of(&self, kind: TerrainKind) -> f64 {
        match kind {
            TerrainKind::Road => self.road,
            TerrainKind::Normal => self.normal,
            TerrainKind::Medium => self.medium,
            TerrainKind::Forest => self.forest,
            TerrainKind::Difficult => self.difficult,
            TerrainKind::Unpassable => self.unpassable,
            TerrainKind::Blocked => self.blocked,
            TerrainKind::Sea => self.sea,
            TerrainKind::Water => self.unpassable,
        }
    }

    /// Cost of a port-to-sea link, comparable to road travel.
    pub fn port_link(&self) -> f64 {
        self.road.min(self.normal)
    }
}

/// Kinds classified as water for `is_water` and grid-cell marking.
pub fn default_water_kinds() -> HashSet<TerrainKind> {
    HashSet::from([TerrainKind::Sea, TerrainKind::Water])
}

/// A feature with its polygon rings flattened for containment tests.
///
/// The authored data means "inside any ring" rather than polygon-with-holes:
/// an interior ring is drawn as more of the same terrain, not a cut-out. Each
/// ring therefore becomes its own hole-free polygon, and containment or
/// intersection against the feature is the union over those rings.
#[derive(Debug, Clone)]
struct PreparedFeature {
    kind: TerrainKind,
    rings: Vec<Polygon<f64>>,
    lines: Vec<LineString<f64>>,
}

impl PreparedFeature {
    fn prepare(feature: &TerrainFeature) -> Self {
        let mut rings = Vec::new();
        let mut lines = Vec::new();
        match &feature.geometry {
            Geometry::Polygon(polygon) => flatten_rings(polygon, &mut rings),
            Geometry::MultiPolygon(multi) => {
                for polygon in &multi.0 {
                    flatten_rings(polygon, &mut rings);
                }
            }
            Geometry::LineString(line) => lines.push(line.clone()),
            Geometry::MultiLineString(multi) => lines.extend(multi.0.iter().cloned()),
            _ => {}
        }
        Self {
            kind: feature.kind,
            rings,
            lines,
        }
    }

    fn contains(&self, point: Point<f64>) -> bool {
        self.rings.iter().any(|ring| ring.contains(&point))
    }

    /// Whether the straight segment touches this feature. A segment wholly
    /// inside a ring counts: the path runs through the terrain even without
    /// crossing its boundary.
    fn crossed_by(&self, segment: &Line<f64>) -> bool {
        self.rings.iter().any(|ring| segment.intersects(ring))
            || self.lines.iter().any(|line| segment.intersects(line))
    }
}

fn flatten_rings(polygon: &Polygon<f64>, out: &mut Vec<Polygon<f64>>) {
    out.push(Polygon::new(polygon.exterior().clone(), Vec::new()));
    for interior in polygon.interiors() {
        out.push(Polygon::new(interior.clone(), Vec::new()));
    }
}

/// Answers terrain cost and water-classification queries for one snapshot of
/// the authored features. Cheap to construct; built fresh per graph build.
#[derive(Debug, Clone)]
pub struct CostModel {
    costs: TerrainCosts,
    water_kinds: HashSet<TerrainKind>,
    features: Vec<PreparedFeature>,
}

impl CostModel {
    pub fn new(
        features: &[TerrainFeature],
        costs: TerrainCosts,
        water_kinds: HashSet<TerrainKind>,
    ) -> Self {
        Self {
            costs,
            water_kinds,
            features: features.iter().map(PreparedFeature::prepare).collect(),
        }
    }

    pub fn costs(&self) -> &TerrainCosts {
        &self.costs
    }

    /// Traversal multiplier at a point.
    pub fn cost_at(&self, point: MapPoint) -> f64 {
        let target = Point::new(point.x, point.y);
        let mut cost = self.costs.normal;

        for feature in &self.features {
            if feature.rings.is_empty() || !feature.contains(target) {
                continue;
            }
            match self.classify(feature.kind) {
                CostClass::Hard => return self.costs.of(feature.kind),
                CostClass::Water => return self.costs.unpassable,
                CostClass::Difficult => return self.costs.difficult,
                CostClass::Accumulate => cost = cost.max(self.costs.of(feature.kind)),
                CostClass::Neutral => {}
            }
        }
        cost
    }

    /// Traversal multiplier along the straight segment between two points.
    /// Used to price bridge edges between graph layers.
    pub fn cost_between(&self, from: MapPoint, to: MapPoint) -> f64 {
        let segment = Line::new(from.coord(), to.coord());
        let mut cost = self.costs.normal;

        for feature in &self.features {
            if !feature.crossed_by(&segment) {
                continue;
            }
            match self.classify(feature.kind) {
                CostClass::Hard => return self.costs.of(feature.kind),
                CostClass::Water => return self.costs.unpassable,
                CostClass::Difficult => return self.costs.difficult,
                CostClass::Accumulate => cost = cost.max(self.costs.of(feature.kind)),
                CostClass::Neutral => {}
            }
        }
        cost
    }

    /// Geometric water classification, independent of traversal cost.
    pub fn is_water(&self, point: MapPoint) -> bool {
        let target = Point::new(point.x, point.y);
        self.features
            .iter()
            .filter(|feature| self.water_kinds.contains(&feature.kind))
            .any(|feature| feature.contains(target))
    }

    fn classify(&self, kind: TerrainKind) -> CostClass {
        if matches!(kind, TerrainKind::Blocked | TerrainKind::Unpassable) {
            return CostClass::Hard;
        }
        if self.water_kinds.contains(&kind) {
            return CostClass::Water;
        }
        match kind {
            TerrainKind::Difficult => CostClass::Difficult,
            TerrainKind::Medium | TerrainKind::Forest => CostClass::Accumulate,
            _ => CostClass::Neutral,
        }
    }
}

enum CostClass {
    Hard,
    Water,
    Difficult,
    Accumulate,
    Neutral,
}

/// Bounding box of the terrain features plus the given points, padded and
/// clamped at the origin. Falls back to a fixed box for an empty map.
pub fn data_bounds<I>(features: &[TerrainFeature], points: I, padding: f64) -> MapBounds
where
    I: IntoIterator<Item = MapPoint>,
{
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let mut update = |x: f64, y: f64| {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    };

    for point in points {
        if point.is_finite() {
            update(point.x, point.y);
        }
    }
    for feature in features {
        if let Some(rect) = feature.geometry.bounding_rect() {
            update(rect.min().x, rect.min().y);
            update(rect.max().x, rect.max().y);
        }
    }

    if !min_x.is_finite() || !min_y.is_finite() || !max_x.is_finite() || !max_y.is_finite() {
        return FALLBACK_BOUNDS;
    }

    MapBounds {
        min_x: (min_x - padding).max(0.0),
        min_y: (min_y - padding).max(0.0),
        max_x: max_x + padding,
        max_y: max_y + padding,
    }
}
