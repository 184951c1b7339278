//! Path presentation: segment classification, naturalization and day markers.
//!
//! The search returns node-id chains over the routing graph. This module
//! turns them into render-ready polylines: consecutive edges of the same
//! visual kind are grouped into segments, leg polylines are merged and
//! deduplicated, and the merged line is optionally "naturalized" into a
//! hand-drawn look. Stop positions are anchors: smoothing and waviness bend
//! everything between them but never displace them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, EdgeType, Graph, Node, NodeId, NodeKind};
use crate::map::MapPoint;

/// A polyline vertex. `is_marker` marks route-stop positions, which later
/// stages treat as immovable anchors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub is_marker: bool,
}

impl PathPoint {
    fn position(&self) -> MapPoint {
        MapPoint::new(self.x, self.y)
    }

    fn same_position(&self, other: &PathPoint) -> bool {
        self.x == other.x && self.y == other.y
    }
}

/// Visual class of a segment, driving stroke style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Road,
    Terrain,
    Sea,
    Bridge,
}

/// A run of consecutive path edges sharing one visual kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSegment {
    pub kind: SegmentKind,
    pub points: Vec<PathPoint>,
}

/// Splits a node path into typed segments. Adjacent segments share their
/// boundary point so the concatenation stays a connected polyline; segments
/// collapsing to fewer than two distinct points are dropped.
pub fn classify_segments(graph: &Graph, path: &[NodeId]) -> Vec<PathSegment> {
    let mut segments: Vec<PathSegment> = Vec::new();

    for pair in path.windows(2) {
        let (Some(from), Some(to)) = (graph.node(&pair[0]), graph.node(&pair[1])) else {
            continue;
        };
        let kind = match graph.edge_between(&pair[0], &pair[1]) {
            Some(edge) => segment_kind(edge, from, to),
            None => SegmentKind::Terrain,
        };
        let from_point = path_point(from);
        let to_point = path_point(to);

        match segments.last_mut() {
            Some(last) if last.kind == kind => last.points.push(to_point),
            _ => segments.push(PathSegment {
                kind,
                points: vec![from_point, to_point],
            }),
        }
    }

    segments
        .into_iter()
        .filter_map(|segment| {
            let points = dedupe_points(segment.points);
            (points.len() >= 2).then_some(PathSegment {
                kind: segment.kind,
                points,
            })
        })
        .collect()
}

fn path_point(node: &Node) -> PathPoint {
    PathPoint {
        x: node.x,
        y: node.y,
        is_marker: matches!(node.kind, NodeKind::Marker { .. }),
    }
}

/// Bridges take the look of the layer they land on; pure helper links with
/// neither a road nor a terrain endpoint stay `Bridge`.
fn segment_kind(edge: &Edge, from: &Node, to: &Node) -> SegmentKind {
    match edge.edge_type {
        EdgeType::Road | EdgeType::RoadIntersection => SegmentKind::Road,
        EdgeType::Sea | EdgeType::SeaPortLink => SegmentKind::Sea,
        EdgeType::Terrain => SegmentKind::Terrain,
        EdgeType::RoadBridge
        | EdgeType::RoadSnapLink
        | EdgeType::TerrainBridge
        | EdgeType::TerrainBridgeBackup
        | EdgeType::TerrainBridgeExtended => {
            let anchor = [to, from]
                .into_iter()
                .find(|node| matches!(node.kind, NodeKind::Road | NodeKind::Terrain { .. }));
            match anchor.map(|node| &node.kind) {
                Some(NodeKind::Road) => SegmentKind::Road,
                Some(NodeKind::Terrain { .. }) => SegmentKind::Terrain,
                _ => SegmentKind::Bridge,
            }
        }
    }
}

/// Concatenates segment polylines in order, collapsing duplicated junction
/// points. A marker flag survives deduplication: if either duplicate was an
/// anchor, the kept point is.
pub fn merge_points<'a, I>(segments: I) -> Vec<PathPoint>
where
    I: IntoIterator<Item = &'a PathSegment>,
{
    let mut merged: Vec<PathPoint> = Vec::new();
    for segment in segments {
        for point in &segment.points {
            match merged.last_mut() {
                Some(last) if last.same_position(point) => {
                    last.is_marker |= point.is_marker;
                }
                _ => merged.push(*point),
            }
        }
    }
    merged
}

fn dedupe_points(points: Vec<PathPoint>) -> Vec<PathPoint> {
    let mut out: Vec<PathPoint> = Vec::with_capacity(points.len());
    for point in points {
        match out.last_mut() {
            Some(last) if last.same_position(&point) => last.is_marker |= point.is_marker,
            _ => out.push(point),
        }
    }
    out
}

/// Tuning for the hand-drawn rendering of a route polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaturalizeOptions {
    pub enabled: bool,
    /// Slices this short get a single gentle smoothing pass.
    pub short_slice_points: usize,
    pub short_strength: f64,
    pub strength: f64,
    pub smooth_iterations: usize,
    pub smooth_ratio: f64,
    /// Distance over which the waviness completes one cycle, in map units.
    pub wave_length: f64,
    /// Maximum perpendicular displacement of the waviness, in map units.
    pub wave_amplitude: f64,
}

impl Default for NaturalizeOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            short_slice_points: 4,
            short_strength: 0.3,
            strength: 0.8,
            smooth_iterations: 2,
            smooth_ratio: 0.25,
            wave_length: 6.0,
            wave_amplitude: 3.0,
        }
    }
}

/// Smooths and gently waves a merged route polyline.
///
/// The line is cut at its anchors (stop positions plus both endpoints) and
/// each slice is smoothed independently, so no amount of smoothing can pull
/// the line off a stop. Smoothing densifies with midpoints and relaxes
/// interior points toward their neighbours; the waviness then adds a tapered
/// perpendicular sine offset, zero at the anchors.
pub fn naturalize(points: &[PathPoint], options: &NaturalizeOptions) -> Vec<PathPoint> {
    if !options.enabled || points.len() < 3 {
        return points.to_vec();
    }

    let mut anchors: Vec<usize> = points
        .iter()
        .enumerate()
        .filter_map(|(index, point)| point.is_marker.then_some(index))
        .collect();
    if anchors.first() != Some(&0) {
        anchors.insert(0, 0);
    }
    if anchors.last() != Some(&(points.len() - 1)) {
        anchors.push(points.len() - 1);
    }

    let mut combined: Vec<MapPoint> = Vec::new();
    let mut locked: HashSet<usize> = HashSet::new();
    for window in anchors.windows(2) {
        let (start, end) = (window[0], window[1]);
        if end <= start {
            continue;
        }
        let slice: Vec<MapPoint> = points[start..=end].iter().map(PathPoint::position).collect();
        let mut smoothed = smooth_slice(slice, options);
        if combined.is_empty() {
            locked.insert(0);
        } else {
            smoothed.remove(0);
        }
        combined.extend(smoothed);
        locked.insert(combined.len() - 1);
    }

    let waved = apply_waviness(
        &combined,
        options.wave_length,
        options.wave_amplitude,
        &locked,
    );

    waved
        .into_iter()
        .enumerate()
        .map(|(index, position)| PathPoint {
            x: position.x,
            y: position.y,
            is_marker: locked.contains(&index),
        })
        .collect()
}

fn smooth_slice(slice: Vec<MapPoint>, options: &NaturalizeOptions) -> Vec<MapPoint> {
    let (iterations, strength) = if slice.len() <= options.short_slice_points {
        (1, options.short_strength)
    } else {
        (options.smooth_iterations, options.strength)
    };
    let pull = (strength * options.smooth_ratio).clamp(0.0, 1.0);

    let mut points = slice;
    for _ in 0..iterations {
        points = subdivide(&points);
        points = relax(&points, pull);
    }
    points
}

/// Inserts the midpoint of every segment, keeping the endpoints.
fn subdivide(points: &[MapPoint]) -> Vec<MapPoint> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len() * 2 - 1);
    out.push(points[0]);
    for pair in points.windows(2) {
        out.push(midpoint(pair[0], pair[1]));
        out.push(pair[1]);
    }
    out
}

/// Pulls each interior point toward the midpoint of its neighbours.
fn relax(points: &[MapPoint], pull: f64) -> Vec<MapPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = points.to_vec();
    for i in 1..points.len() - 1 {
        let target = midpoint(points[i - 1], points[i + 1]);
        out[i] = MapPoint::new(
            points[i].x + (target.x - points[i].x) * pull,
            points[i].y + (target.y - points[i].y) * pull,
        );
    }
    out
}

fn midpoint(a: MapPoint, b: MapPoint) -> MapPoint {
    MapPoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Perpendicular sine offset along the polyline, amplitude tapered to zero at
/// the ends and skipped entirely at locked indices.
fn apply_waviness(
    points: &[MapPoint],
    wave_length: f64,
    amplitude: f64,
    locked: &HashSet<usize>,
) -> Vec<MapPoint> {
    if points.len() < 3 || wave_length <= 0.0 || amplitude <= 0.0 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    let mut travelled = 0.0;

    for i in 1..points.len() - 1 {
        let previous = points[i - 1];
        let current = points[i];
        let dx = current.x - previous.x;
        let dy = current.y - previous.y;
        let segment = (dx * dx + dy * dy).sqrt().max(1e-9);
        travelled += segment;

        if locked.contains(&i) {
            out.push(current);
            continue;
        }

        let (unit_x, unit_y) = (dx / segment, dy / segment);
        let (perp_x, perp_y) = (-unit_y, unit_x);
        let phase = std::f64::consts::TAU * (travelled / wave_length);
        let along = i as f64 / (points.len() - 1) as f64;
        let taper = (std::f64::consts::PI * along).sin();
        let offset = phase.sin() * amplitude * taper;
        out.push(MapPoint::new(
            current.x + perp_x * offset,
            current.y + perp_y * offset,
        ));
    }

    out.push(points[points.len() - 1]);
    out
}

/// Marker dropped at the end of each full travel day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayMarker {
    pub day: u32,
    pub x: f64,
    pub y: f64,
}

/// Places end-of-day markers proportionally along a rendered polyline.
///
/// Positions come from the fraction of total kilometres covered by each full
/// day, mapped onto the polyline's cumulative planar length. The polyline may
/// be a naturalized rendering whose length no longer equals the raw distance;
/// fractions keep the markers consistent with the displayed totals anyway.
pub fn day_markers(points: &[PathPoint], total_km: f64, km_per_day: f64) -> Vec<DayMarker> {
    if points.len() < 2 || total_km <= 0.0 || km_per_day <= 0.0 {
        return Vec::new();
    }

    let mut cumulative = Vec::with_capacity(points.len());
    cumulative.push(0.0);
    for pair in points.windows(2) {
        let length = pair[0].position().distance_to(&pair[1].position());
        cumulative.push(cumulative.last().copied().unwrap_or(0.0) + length);
    }
    let total_units = cumulative.last().copied().unwrap_or(0.0);
    if total_units <= 0.0 {
        return Vec::new();
    }

    let full_days = (total_km / km_per_day).floor() as u32;
    let mut markers = Vec::with_capacity(full_days as usize);
    for day in 1..=full_days {
        let fraction = (day as f64 * km_per_day) / total_km;
        let target = fraction * total_units;
        let index = cumulative
            .iter()
            .position(|&units| units >= target)
            .unwrap_or(cumulative.len() - 1)
            .max(1);
        let segment_start = cumulative[index - 1];
        let segment_units = (cumulative[index] - segment_start).max(1e-9);
        let t = ((target - segment_start) / segment_units).clamp(0.0, 1.0);
        let a = points[index - 1];
        let b = points[index];
        markers.push(DayMarker {
            day,
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        });
    }
    markers
}

/// Formats a duration in days as `3d 4h`, rounding to whole hours.
pub fn format_duration(days: f64) -> String {
    if !days.is_finite() || days <= 0.0 {
        return "<1h".to_owned();
    }
    let total_hours = (days * 24.0).round() as i64;
    let day_count = total_hours / 24;
    let hour_count = total_hours % 24;

    let mut parts = Vec::new();
    if day_count > 0 {
        parts.push(format!("{day_count}d"));
    }
    if hour_count > 0 {
        parts.push(format!("{hour_count}h"));
    }
    if parts.is_empty() {
        return "<1h".to_owned();
    }
    parts.join(" ")
}
