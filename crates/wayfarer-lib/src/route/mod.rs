//! Multi-stop route orchestration.
//!
//! The orchestrator owns the route state: the ordered stop list, the cached
//! routing graph, computed legs and the waypoint pins backing temporary
//! stops. Mutators keep that state consistent; whenever the stop set or the
//! map changes in a way that affects graph shape, the cached graph is dropped
//! and rebuilt on the next calculation.
//!
//! Calculation is all-or-nothing per run: legs are computed into a fresh
//! vector and only swapped in once every leg resolved, so a cancelled or
//! failed run leaves the previously displayed route intact.

mod leg;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use leg::{DistanceBreakdown, LegEndpoint, RouteLeg, UnreachableInfo, UnreachableReason};

use crate::builder::{GraphBuilder, GraphConfig};
use crate::error::{Error, Result};
use crate::graph::{marker_node_id, Graph};
use crate::map::{
    MapData, Marker, MarkerId, TerrainFeature, TravelProfile, DEFAULT_KM_PER_UNIT,
};
use crate::path::{self, SearchLimits, SearchOutcome};
use crate::visualize::{self, DayMarker, NaturalizeOptions, PathPoint};
use crate::waypoint::WaypointManager;

use leg::traversal_stats;

/// Shared flag for cancelling an in-flight calculation from another thread.
///
/// The orchestrator checks it between legs, so cancellation lands at the next
/// leg boundary and the previous route survives. Each new calculation resets
/// the flag; a cancel raised between runs is deliberately lost.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

/// Tuning knobs for route calculation and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteConfig {
    /// Conversion factor from map units to kilometres.
    pub km_per_unit: f64,
    /// Hard cap on the number of stops in one route.
    pub max_stops: usize,
    pub graph: GraphConfig,
    pub limits: SearchLimits,
    pub naturalize: NaturalizeOptions,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            km_per_unit: DEFAULT_KM_PER_UNIT,
            max_stops: 50,
            graph: GraphConfig::default(),
            limits: SearchLimits::default(),
            naturalize: NaturalizeOptions::default(),
        }
    }
}

/// Aggregated route totals plus the rendered polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub total_distance_km: f64,
    pub total_travel_days: f64,
    pub breakdown: DistanceBreakdown,
    pub has_unreachable: bool,
    pub uses_sea: bool,
    /// Human-readable travel time, e.g. `2d 6h`.
    pub duration_label: String,
    /// The full route polyline after merging, smoothing and waviness.
    pub points: Vec<PathPoint>,
    pub day_markers: Vec<DayMarker>,
}

/// Route state machine: stops, cached graph, legs and waypoints.
#[derive(Debug)]
pub struct RouteOrchestrator {
    map: MapData,
    waypoints: WaypointManager,
    stops: Vec<Marker>,
    legs: Vec<RouteLeg>,
    graph: Option<Graph>,
    sea_travel: bool,
    profile: TravelProfile,
    config: RouteConfig,
    calculating: bool,
    cancel: CancelToken,
}

impl RouteOrchestrator {
    pub fn new(map: MapData) -> Self {
        Self::with_config(map, RouteConfig::default())
    }

    pub fn with_config(map: MapData, config: RouteConfig) -> Self {
        Self {
            map,
            waypoints: WaypointManager::new(),
            stops: Vec::new(),
            legs: Vec::new(),
            graph: None,
            sea_travel: false,
            profile: TravelProfile::default(),
            config,
            calculating: false,
            cancel: CancelToken::new(),
        }
    }

    pub fn map(&self) -> &MapData {
        &self.map
    }

    pub fn stops(&self) -> &[Marker] {
        &self.stops
    }

    pub fn legs(&self) -> &[RouteLeg] {
        &self.legs
    }

    pub fn profile(&self) -> &TravelProfile {
        &self.profile
    }

    pub fn sea_travel(&self) -> bool {
        self.sea_travel
    }

    pub fn is_calculating(&self) -> bool {
        self.calculating
    }

    pub fn waypoints(&self) -> &WaypointManager {
        &self.waypoints
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    /// Handle for cancelling the current or next calculation from another
    /// thread.
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Drops the cached graph so the next calculation rebuilds it.
    pub fn invalidate_graph(&mut self) {
        self.graph = None;
    }

    /// Appends a stop by marker id and recalculates the route.
    pub fn add_stop(&mut self, id: &str) -> Result<()> {
        self.check_route_capacity()?;
        let marker = self
            .resolve_marker(id)
            .ok_or_else(|| Error::UnknownMarker { id: id.to_owned() })?;
        debug!(id = %marker.id, "added route stop");
        self.stops.push(marker);
        self.graph = None;
        self.recompute()
    }

    /// Removes the stop at `index` and recalculates the route.
    pub fn remove_stop(&mut self, index: usize) -> Result<()> {
        if index >= self.stops.len() {
            return Err(Error::StopIndexOutOfRange {
                index,
                len: self.stops.len(),
            });
        }
        let removed = self.stops.remove(index);
        debug!(id = %removed.id, index, "removed route stop");
        self.graph = None;
        self.recompute()
    }

    /// Moves the stop at `from` to position `to`. The stop set is unchanged,
    /// so the cached graph is reused.
    pub fn reorder_stop(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.stops.len();
        if from >= len {
            return Err(Error::StopIndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(Error::StopIndexOutOfRange { index: to, len });
        }
        if from == to {
            return Ok(());
        }
        let stop = self.stops.remove(from);
        self.stops.insert(to, stop);
        self.recompute()
    }

    /// Cancels any in-flight calculation and clears stops, legs, the cached
    /// graph and every waypoint (firing their release hooks).
    pub fn clear_route(&mut self) {
        self.cancel.cancel();
        self.stops.clear();
        self.legs.clear();
        self.graph = None;
        self.waypoints.clear();
        debug!("cleared route");
    }

    /// Drops a waypoint pin at the given position and appends it as a stop.
    ///
    /// On calculation failure the waypoint stays placed and the error reports
    /// the failed recalculation; its id remains discoverable through
    /// [`RouteOrchestrator::waypoints`].
    pub fn add_waypoint_stop(&mut self, x: f64, y: f64) -> Result<MarkerId> {
        self.check_route_capacity()?;
        let marker = self.waypoints.create(x, y)?.clone();
        self.push_waypoint_stop(marker)
    }

    /// Like [`RouteOrchestrator::add_waypoint_stop`], with a release hook
    /// fired exactly once when the waypoint is deleted or cleared.
    pub fn add_waypoint_stop_with_release(
        &mut self,
        x: f64,
        y: f64,
        release: impl FnOnce() + Send + 'static,
    ) -> Result<MarkerId> {
        self.check_route_capacity()?;
        let marker = self.waypoints.create_with_release(x, y, release)?.clone();
        self.push_waypoint_stop(marker)
    }

    /// Deletes a waypoint, firing its release hook, and removes every stop
    /// that referenced it. Returns whether the id named a live waypoint.
    pub fn delete_waypoint(&mut self, id: &str) -> Result<bool> {
        if !self.waypoints.delete(id) {
            return Ok(false);
        }
        let before = self.stops.len();
        self.stops.retain(|stop| stop.id != id);
        if self.stops.len() != before {
            self.graph = None;
            self.recompute()?;
        }
        Ok(true)
    }

    /// Switches the travel profile and refreshes travel times. Costs and the
    /// graph do not depend on the profile, so the cached graph is reused.
    pub fn set_profile(&mut self, profile: TravelProfile) -> Result<()> {
        debug!(label = %profile.label, "travel profile changed");
        self.profile = profile;
        if self.stops.len() >= 2 {
            self.recompute()?;
        }
        Ok(())
    }

    /// Enables or disables sea travel.
    ///
    /// The cached graph always becomes stale (sea edges and port links are
    /// baked in at build time), but recalculation is deferred unless a
    /// port-capable stop exists: without one, no leg can change.
    pub fn set_sea_travel(&mut self, enabled: bool) -> Result<()> {
        if self.sea_travel == enabled {
            return Ok(());
        }
        self.sea_travel = enabled;
        self.graph = None;
        if self.stops.len() >= 2 && self.stops.iter().any(Marker::is_port_capable) {
            self.recompute()?;
        } else {
            debug!(enabled, "sea travel toggled, rebuild deferred");
        }
        Ok(())
    }

    /// Replaces the terrain features and recalculates any active route.
    pub fn update_features(&mut self, features: Vec<TerrainFeature>) -> Result<()> {
        self.map.set_features(features);
        self.graph = None;
        if self.stops.len() >= 2 {
            self.recompute()?;
        }
        Ok(())
    }

    /// Recalculates every leg from the current stop list.
    ///
    /// Exactly one calculation may run at a time; a reentrant call is
    /// rejected with [`Error::CalculationInProgress`] instead of quietly
    /// racing the first one.
    pub fn recompute(&mut self) -> Result<()> {
        if self.calculating {
            return Err(Error::CalculationInProgress);
        }
        self.calculating = true;
        self.cancel.reset();
        let result = self.recompute_inner();
        self.calculating = false;
        result
    }

    /// Aggregated totals plus the rendered polyline for the current legs.
    pub fn route_summary(&self) -> RouteSummary {
        let mut breakdown = DistanceBreakdown::default();
        let mut total_distance_km = 0.0;
        let mut total_travel_days = 0.0;
        let mut has_unreachable = false;
        for leg in &self.legs {
            total_distance_km += leg.distance_km;
            total_travel_days += leg.travel_days;
            breakdown.accumulate(&leg.breakdown);
            has_unreachable |= leg.is_unreachable();
        }

        let merged = visualize::merge_points(self.legs.iter().flat_map(|leg| &leg.segments));
        let points = visualize::naturalize(&merged, &self.config.naturalize);
        // Day markers pace out land-speed days along the rendered line; sea
        // legs compress the spacing accordingly.
        let day_markers = visualize::day_markers(
            &points,
            total_distance_km,
            self.profile.effective_land_speed(),
        );

        RouteSummary {
            total_distance_km,
            total_travel_days,
            breakdown,
            has_unreachable,
            uses_sea: self.legs.iter().any(|leg| leg.uses_sea),
            duration_label: visualize::format_duration(total_travel_days),
            points,
            day_markers,
        }
    }

    fn check_route_capacity(&self) -> Result<()> {
        if self.stops.len() >= self.config.max_stops {
            return Err(Error::RouteTooLong {
                max: self.config.max_stops,
            });
        }
        Ok(())
    }

    fn resolve_marker(&self, id: &str) -> Option<Marker> {
        self.map
            .marker(id)
            .or_else(|| self.waypoints.get(id))
            .cloned()
    }

    fn push_waypoint_stop(&mut self, marker: Marker) -> Result<MarkerId> {
        let id = marker.id.clone();
        self.stops.push(marker);
        self.graph = None;
        self.recompute()?;
        Ok(id)
    }

    /// Drops stops that no longer resolve to a marker and duplicate ids
    /// (keeping the first occurrence). Any change invalidates the graph,
    /// which was built for the old stop set.
    fn repair_stops(&mut self) {
        let mut seen: HashSet<MarkerId> = HashSet::with_capacity(self.stops.len());
        let before = self.stops.len();
        let map = &self.map;
        let waypoints = &self.waypoints;
        self.stops.retain(|stop| {
            if map.marker(&stop.id).is_none() && !waypoints.contains(&stop.id) {
                warn!(id = %stop.id, "dropping route stop that no longer resolves");
                return false;
            }
            if !seen.insert(stop.id.clone()) {
                warn!(id = %stop.id, "dropping duplicate route stop");
                return false;
            }
            true
        });
        if self.stops.len() != before {
            self.graph = None;
        }
    }

    fn recompute_inner(&mut self) -> Result<()> {
        self.repair_stops();

        if self.stops.len() < 2 {
            self.legs.clear();
            return Ok(());
        }

        debug!(
            stops = self.stops.len(),
            sea = self.sea_travel,
            "recalculating route"
        );

        if self.graph.is_none() {
            let graph =
                GraphBuilder::new(&self.map, &self.stops, self.sea_travel, &self.config.graph)
                    .build()?;
            self.graph = Some(graph);
        }
        let Some(graph) = self.graph.as_ref() else {
            return Err(Error::GraphBuild {
                message: "route graph unavailable after construction".to_owned(),
            });
        };

        let mut legs = Vec::with_capacity(self.stops.len() - 1);
        for pair in self.stops.windows(2) {
            if self.cancel.is_cancelled() {
                debug!("route calculation cancelled, keeping previous legs");
                return Err(Error::Cancelled);
            }
            legs.push(self.compute_leg(graph, &pair[0], &pair[1])?);
        }

        let unreachable = legs.iter().filter(|leg| leg.is_unreachable()).count();
        info!(legs = legs.len(), unreachable, "route recalculated");
        self.legs = legs;
        Ok(())
    }

    /// Resolves one leg. Failures that are properties of the map (an
    /// unconnected stop, no path, a search that ran out of budget) produce an
    /// unreachable leg rather than an error, so one bad leg never hides the
    /// rest of the route.
    fn compute_leg(&self, graph: &Graph, from: &Marker, to: &Marker) -> Result<RouteLeg> {
        let from_node = marker_node_id(&from.id);
        let to_node = marker_node_id(&to.id);

        if !graph.contains_node(&from_node) {
            return Ok(RouteLeg::unreachable(
                from,
                to,
                UnreachableInfo {
                    reason: UnreachableReason::MissingStart,
                    message: format!("{} is not connected to the travel network", from.name),
                    from_connections: 0,
                    to_connections: graph.connection_count(&to_node),
                },
            ));
        }
        if !graph.contains_node(&to_node) {
            return Ok(RouteLeg::unreachable(
                from,
                to,
                UnreachableInfo {
                    reason: UnreachableReason::MissingEnd,
                    message: format!("{} is not connected to the travel network", to.name),
                    from_connections: graph.connection_count(&from_node),
                    to_connections: 0,
                },
            ));
        }

        match path::find_path(graph, &from_node, &to_node, &self.config.limits)? {
            SearchOutcome::Found { path } => {
                let stats = traversal_stats(graph, &path, self.config.km_per_unit, &self.profile);
                let segments = visualize::classify_segments(graph, &path);
                debug!(
                    from = %from.id,
                    to = %to.id,
                    distance_km = stats.distance_km,
                    "leg resolved"
                );
                Ok(RouteLeg {
                    from: from.into(),
                    to: to.into(),
                    distance_km: stats.distance_km,
                    travel_days: stats.travel_days,
                    weighted_cost_km: stats.weighted_cost_km,
                    uses_sea: stats.breakdown.sea_km > 0.0,
                    breakdown: stats.breakdown,
                    segments,
                    unreachable: None,
                })
            }
            SearchOutcome::NoPath => {
                let from_connections = graph.connection_count(&from_node);
                let to_connections = graph.connection_count(&to_node);
                warn!(
                    from = %from.id,
                    to = %to.id,
                    from_connections,
                    to_connections,
                    "no path between route stops"
                );
                Ok(RouteLeg::unreachable(
                    from,
                    to,
                    UnreachableInfo {
                        reason: UnreachableReason::NoPath,
                        message: format!(
                            "no travel route between {} ({} connections) and {} ({} connections)",
                            from.name, from_connections, to.name, to_connections
                        ),
                        from_connections,
                        to_connections,
                    },
                ))
            }
            SearchOutcome::Timeout {
                iterations,
                elapsed,
            } => {
                warn!(
                    from = %from.id,
                    to = %to.id,
                    iterations,
                    ?elapsed,
                    "leg search exceeded its budget"
                );
                Ok(RouteLeg::unreachable(
                    from,
                    to,
                    UnreachableInfo {
                        reason: UnreachableReason::Timeout,
                        message: format!(
                            "search between {} and {} gave up after {} iterations ({:?} elapsed)",
                            from.name, to.name, iterations, elapsed
                        ),
                        from_connections: graph.connection_count(&from_node),
                        to_connections: graph.connection_count(&to_node),
                    },
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TerrainKind;
    use geo::polygon;
    use std::sync::atomic::AtomicUsize;

    fn fixture_map() -> MapData {
        let ground = TerrainFeature::polygon(
            "ground",
            TerrainKind::Normal,
            polygon![
                (x: 60.0, y: 60.0),
                (x: 260.0, y: 60.0),
                (x: 260.0, y: 160.0),
                (x: 60.0, y: 160.0),
            ],
        );
        MapData::new(
            vec![
                Marker::poi("a", "Alpha", 80.0, 100.0),
                Marker::poi("b", "Bravo", 240.0, 100.0),
            ],
            vec![ground],
        )
    }

    fn two_stop_route() -> RouteOrchestrator {
        let mut orchestrator = RouteOrchestrator::new(fixture_map());
        orchestrator.add_stop("a").expect("first stop");
        orchestrator.add_stop("b").expect("second stop");
        orchestrator
    }

    #[test]
    fn two_stops_produce_one_reachable_leg() {
        let orchestrator = two_stop_route();
        assert_eq!(orchestrator.legs().len(), 1);
        let leg = &orchestrator.legs()[0];
        assert!(!leg.is_unreachable());
        assert_eq!(leg.from.id, "a");
        assert_eq!(leg.to.id, "b");
        assert!(leg.distance_km > 0.0);
        assert!(leg.travel_days > 0.0);
        assert!(!leg.segments.is_empty());
    }

    #[test]
    fn add_stop_rejects_unknown_marker() {
        let mut orchestrator = RouteOrchestrator::new(fixture_map());
        let err = orchestrator.add_stop("nope").expect_err("unknown id");
        assert!(matches!(err, Error::UnknownMarker { .. }));
        assert!(orchestrator.stops().is_empty());
    }

    #[test]
    fn capacity_is_checked_before_a_waypoint_is_created() {
        let config = RouteConfig {
            max_stops: 1,
            ..RouteConfig::default()
        };
        let mut orchestrator = RouteOrchestrator::with_config(fixture_map(), config);
        orchestrator.add_stop("a").expect("within capacity");

        let err = orchestrator.add_stop("b").expect_err("over capacity");
        assert!(matches!(err, Error::RouteTooLong { max: 1 }));

        let err = orchestrator
            .add_waypoint_stop(160.0, 100.0)
            .expect_err("over capacity");
        assert!(matches!(err, Error::RouteTooLong { max: 1 }));
        // The rejected waypoint must not leak a pin.
        assert!(orchestrator.waypoints().is_empty());
    }

    #[test]
    fn duplicate_stops_are_dropped_on_recalculation() {
        let mut orchestrator = two_stop_route();
        orchestrator.add_stop("a").expect("duplicate add succeeds");
        assert_eq!(orchestrator.stops().len(), 2);
        assert_eq!(orchestrator.legs().len(), 1);
    }

    #[test]
    fn stale_stops_are_dropped_on_recalculation() {
        let mut orchestrator = two_stop_route();
        orchestrator.map.remove_marker("b");
        orchestrator.recompute().expect("recalculation succeeds");
        assert_eq!(orchestrator.stops().len(), 1);
        assert!(orchestrator.legs().is_empty());
    }

    #[test]
    fn removing_a_stop_below_two_clears_legs() {
        let mut orchestrator = two_stop_route();
        orchestrator.remove_stop(1).expect("in bounds");
        assert_eq!(orchestrator.stops().len(), 1);
        assert!(orchestrator.legs().is_empty());

        let err = orchestrator.remove_stop(5).expect_err("out of bounds");
        assert!(matches!(
            err,
            Error::StopIndexOutOfRange { index: 5, len: 1 }
        ));
    }

    #[test]
    fn reorder_keeps_the_cached_graph_and_swaps_leg_direction() {
        let mut orchestrator = two_stop_route();
        assert!(orchestrator.graph.is_some());

        orchestrator.reorder_stop(0, 1).expect("in bounds");
        assert!(orchestrator.graph.is_some());
        assert_eq!(orchestrator.legs()[0].from.id, "b");
        assert_eq!(orchestrator.legs()[0].to.id, "a");

        let err = orchestrator.reorder_stop(0, 9).expect_err("out of bounds");
        assert!(matches!(err, Error::StopIndexOutOfRange { index: 9, .. }));
    }

    #[test]
    fn reentrant_recalculation_is_rejected() {
        let mut orchestrator = two_stop_route();
        orchestrator.calculating = true;
        let err = orchestrator.recompute().expect_err("single flight");
        assert!(matches!(err, Error::CalculationInProgress));

        orchestrator.calculating = false;
        orchestrator.recompute().expect("runs after the flag clears");
    }

    #[test]
    fn cancelled_run_keeps_previous_legs_and_next_run_resets_the_flag() {
        let mut orchestrator = two_stop_route();
        assert_eq!(orchestrator.legs().len(), 1);

        let handle = orchestrator.cancel_handle();
        handle.cancel();
        assert!(orchestrator.cancel.is_cancelled());

        let err = orchestrator.recompute_inner().expect_err("cancelled");
        assert!(matches!(err, Error::Cancelled));
        assert_eq!(orchestrator.legs().len(), 1);

        orchestrator.recompute().expect("fresh run resets the flag");
        assert!(!orchestrator.cancel.is_cancelled());
        assert_eq!(orchestrator.legs().len(), 1);
    }

    #[test]
    fn clear_route_fires_waypoint_releases() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut orchestrator = two_stop_route();

        let counter = Arc::clone(&released);
        orchestrator
            .add_waypoint_stop_with_release(160.0, 100.0, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .expect("waypoint stop");
        assert_eq!(orchestrator.stops().len(), 3);
        assert_eq!(orchestrator.legs().len(), 2);

        orchestrator.clear_route();
        assert!(orchestrator.stops().is_empty());
        assert!(orchestrator.legs().is_empty());
        assert!(orchestrator.waypoints().is_empty());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deleting_a_waypoint_removes_its_stop_and_recalculates() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut orchestrator = two_stop_route();

        let counter = Arc::clone(&released);
        let id = orchestrator
            .add_waypoint_stop_with_release(160.0, 100.0, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .expect("waypoint stop");
        assert_eq!(orchestrator.legs().len(), 2);

        assert!(orchestrator.delete_waypoint(&id).expect("deletes"));
        assert_eq!(orchestrator.stops().len(), 2);
        assert_eq!(orchestrator.legs().len(), 1);
        assert_eq!(released.load(Ordering::SeqCst), 1);

        assert!(!orchestrator.delete_waypoint("nope").expect("no-op"));
    }

    #[test]
    fn sea_toggle_defers_rebuild_without_port_capable_stops() {
        let mut orchestrator = two_stop_route();
        assert!(orchestrator.graph.is_some());
        let legs_before = orchestrator.legs().to_vec();

        orchestrator.set_sea_travel(true).expect("toggle on");
        // Cache invalidated, but no port-capable stop means no leg can
        // change, so the displayed route stays.
        assert!(orchestrator.graph.is_none());
        assert_eq!(orchestrator.legs(), legs_before.as_slice());

        // Toggling to the same value is a no-op.
        orchestrator.set_sea_travel(true).expect("no-op");
        assert!(orchestrator.graph.is_none());

        // A port-capable stop (any waypoint) makes the toggle recalculate.
        orchestrator
            .add_waypoint_stop(160.0, 100.0)
            .expect("waypoint stop");
        assert!(orchestrator.graph.is_some());
        orchestrator.set_sea_travel(false).expect("toggle off");
        assert!(orchestrator.graph.is_some());
        assert_eq!(orchestrator.legs().len(), 2);
    }

    #[test]
    fn profile_change_refreshes_times_without_invalidating_the_graph() {
        let mut orchestrator = two_stop_route();
        let slow_days = orchestrator.legs()[0].travel_days;

        orchestrator
            .set_profile(TravelProfile::new("Wagon", 15.0, 100.0))
            .expect("profile change");
        assert!(orchestrator.graph.is_some());
        let wagon_days = orchestrator.legs()[0].travel_days;
        assert!((wagon_days - slow_days * 2.0).abs() < 1e-9);
    }

    #[test]
    fn summary_aggregates_legs_and_renders_a_polyline() {
        let orchestrator = two_stop_route();
        let summary = orchestrator.route_summary();

        let leg = &orchestrator.legs()[0];
        assert!((summary.total_distance_km - leg.distance_km).abs() < 1e-9);
        assert!((summary.total_travel_days - leg.travel_days).abs() < 1e-9);
        assert!(!summary.has_unreachable);
        assert!(!summary.uses_sea);
        assert!(summary.points.len() >= 2);
        assert!(!summary.duration_label.is_empty());
        // Roughly 140 km at walking pace spans several day boundaries.
        assert!(!summary.day_markers.is_empty());
    }

    #[test]
    fn empty_route_summary_is_all_zeroes() {
        let orchestrator = RouteOrchestrator::new(fixture_map());
        let summary = orchestrator.route_summary();
        assert_eq!(summary.total_distance_km, 0.0);
        assert!(summary.points.is_empty());
        assert!(summary.day_markers.is_empty());
        assert_eq!(summary.duration_label, "<1h");
    }
}
