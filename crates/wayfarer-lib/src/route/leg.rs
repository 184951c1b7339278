//! Per-leg route results and traversal statistics.
//!
//! Displayed distances are always the unweighted planar length of the chosen
//! path, converted to kilometres. Terrain multipliers slow the traveller
//! down instead, so they show up in travel time (and in the separate
//! `weighted_cost_km` field used for diagnostics), never in distance.

use serde::Serialize;

use crate::graph::{EdgeCategory, Graph, NodeId};
use crate::map::{MapPoint, Marker, MarkerId, TravelProfile};
use crate::path;
use crate::visualize::PathSegment;

/// Stop identity recorded on a leg, detached from the live marker set so leg
/// results stay meaningful after the route changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegEndpoint {
    pub id: MarkerId,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl From<&Marker> for LegEndpoint {
    fn from(marker: &Marker) -> Self {
        Self {
            id: marker.id.clone(),
            name: marker.name.clone(),
            x: marker.x,
            y: marker.y,
        }
    }
}

impl LegEndpoint {
    pub fn position(&self) -> MapPoint {
        MapPoint::new(self.x, self.y)
    }
}

/// Leg distance split by the statistics bucket of each traversed edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceBreakdown {
    pub road_km: f64,
    pub terrain_km: f64,
    pub sea_km: f64,
    pub port_km: f64,
}

impl DistanceBreakdown {
    fn add(&mut self, category: EdgeCategory, km: f64) {
        match category {
            EdgeCategory::Road => self.road_km += km,
            EdgeCategory::Terrain => self.terrain_km += km,
            EdgeCategory::Sea => self.sea_km += km,
            EdgeCategory::Port => self.port_km += km,
        }
    }

    pub fn total(&self) -> f64 {
        self.road_km + self.terrain_km + self.sea_km + self.port_km
    }

    pub fn accumulate(&mut self, other: &DistanceBreakdown) {
        self.road_km += other.road_km;
        self.terrain_km += other.terrain_km;
        self.sea_km += other.sea_km;
        self.port_km += other.port_km;
    }
}

/// Why a leg could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreachableReason {
    MissingStart,
    MissingEnd,
    NoPath,
    Timeout,
}

/// Diagnostic payload of a failed leg: a human-readable message plus the raw
/// endpoint connectivity counts, which make "why" obvious in bug reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreachableInfo {
    pub reason: UnreachableReason,
    pub message: String,
    pub from_connections: usize,
    pub to_connections: usize,
}

/// Computed result for one consecutive pair of route stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub from: LegEndpoint,
    pub to: LegEndpoint,
    /// Physical path length in kilometres.
    pub distance_km: f64,
    /// Estimated travel time in days for the active profile.
    pub travel_days: f64,
    /// Terrain-weighted cost in kilometre units. Diagnostic only; never a
    /// substitute for `distance_km`.
    pub weighted_cost_km: f64,
    pub uses_sea: bool,
    pub breakdown: DistanceBreakdown,
    pub segments: Vec<PathSegment>,
    pub unreachable: Option<UnreachableInfo>,
}

impl RouteLeg {
    pub(crate) fn unreachable(from: &Marker, to: &Marker, info: UnreachableInfo) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            distance_km: 0.0,
            travel_days: 0.0,
            weighted_cost_km: 0.0,
            uses_sea: false,
            breakdown: DistanceBreakdown::default(),
            segments: Vec::new(),
            unreachable: Some(info),
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.unreachable.is_some()
    }

    pub fn travel_hours(&self) -> f64 {
        self.travel_days * 24.0
    }
}

/// Distance, time and breakdown for a found path.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct TraversalStats {
    pub distance_km: f64,
    pub travel_days: f64,
    pub weighted_cost_km: f64,
    pub breakdown: DistanceBreakdown,
}

/// Walks the path edge by edge. Zero-length helper edges (intersections,
/// snap links) contribute nothing; sea edges are timed at sea speed while
/// every other edge is timed at land speed slowed by its terrain multiplier.
pub(crate) fn traversal_stats(
    graph: &Graph,
    nodes: &[NodeId],
    km_per_unit: f64,
    profile: &TravelProfile,
) -> TraversalStats {
    let mut stats = TraversalStats::default();
    if nodes.len() < 2 {
        return stats;
    }

    let land_speed = profile.effective_land_speed();
    let sea_speed = profile.effective_sea_speed();

    for pair in nodes.windows(2) {
        let Some(edge) = graph.edge_between(&pair[0], &pair[1]) else {
            continue;
        };
        let segment_km = edge.distance * km_per_unit;
        if !segment_km.is_finite() || segment_km <= 0.0 {
            continue;
        }

        stats.distance_km += segment_km;
        let category = edge.edge_type.category();
        stats.breakdown.add(category, segment_km);

        stats.travel_days += if category == EdgeCategory::Sea {
            segment_km / sea_speed
        } else {
            let multiplier = if edge.cost > 0.0 { edge.cost } else { 1.0 };
            (segment_km / land_speed) * multiplier
        };
    }

    stats.weighted_cost_km = path::path_cost(graph, nodes) * km_per_unit;
    stats
}
