mod common;

use common::{island_map, plains_map, road_map, sealed_marker_map};
use wayfarer_lib::{
    Error, Marker, RouteOrchestrator, SegmentKind, TravelProfile, UnreachableReason,
};

#[test]
fn plains_route_end_to_end() {
    let mut orchestrator = RouteOrchestrator::new(plains_map());
    orchestrator.add_stop("a").expect("first stop");
    orchestrator.add_stop("b").expect("second stop");

    assert_eq!(orchestrator.legs().len(), 1);
    let leg = &orchestrator.legs()[0];
    assert!(!leg.is_unreachable());

    // Straight-line separation is 160 units, roughly 139 km; the grid path
    // may wander a little but never doubles it.
    assert!(leg.distance_km > 120.0 && leg.distance_km < 220.0);
    assert!(leg.travel_days > 3.0);
    assert!(!leg.uses_sea);
    assert!((leg.breakdown.total() - leg.distance_km).abs() < 1e-6);

    let summary = orchestrator.route_summary();
    assert_eq!(
        summary.day_markers.len() as f64,
        (summary.total_distance_km / 30.0).floor()
    );
    for (index, marker) in summary.day_markers.iter().enumerate() {
        assert_eq!(marker.day, index as u32 + 1);
    }
}

#[test]
fn roads_beat_open_ground() {
    let mut on_road = RouteOrchestrator::new(road_map());
    on_road.add_stop("a").expect("stop");
    on_road.add_stop("b").expect("stop");

    let mut off_road = RouteOrchestrator::new(plains_map());
    off_road.add_stop("a").expect("stop");
    off_road.add_stop("b").expect("stop");

    let road_leg = &on_road.legs()[0];
    let plains_leg = &off_road.legs()[0];

    assert!(road_leg.breakdown.road_km > 130.0);
    assert_eq!(road_leg.breakdown.terrain_km, 0.0);
    assert!(
        road_leg.travel_days < plains_leg.travel_days,
        "road multiplier shortens travel time"
    );
    assert!(road_leg
        .segments
        .iter()
        .all(|segment| segment.kind == SegmentKind::Road));
}

#[test]
fn sea_toggle_flips_reachability_across_the_strait() {
    let mut orchestrator = RouteOrchestrator::new(island_map());
    orchestrator.add_stop("port_west").expect("stop");
    orchestrator.add_stop("port_east").expect("stop");

    let leg = &orchestrator.legs()[0];
    assert!(leg.is_unreachable());
    let info = leg.unreachable.as_ref().expect("diagnostics present");
    assert_eq!(info.reason, UnreachableReason::NoPath);
    assert!(info.from_connections > 0);
    assert!(info.to_connections > 0);

    orchestrator.set_sea_travel(true).expect("toggle on");
    let leg = &orchestrator.legs()[0];
    assert!(!leg.is_unreachable());
    assert!(leg.uses_sea);
    assert!(leg.breakdown.sea_km > 0.0);
    assert!(leg
        .segments
        .iter()
        .any(|segment| segment.kind == SegmentKind::Sea));
    assert!(orchestrator.route_summary().uses_sea);

    orchestrator.set_sea_travel(false).expect("toggle off");
    assert!(orchestrator.legs()[0].is_unreachable());
}

#[test]
fn an_unreachable_leg_never_hides_the_others() {
    let mut map = sealed_marker_map();
    map.insert_marker(Marker::poi("camp", "East Camp", 270.0, 150.0));

    let mut orchestrator = RouteOrchestrator::new(map);
    orchestrator.add_stop("outside").expect("stop");
    orchestrator.add_stop("camp").expect("stop");
    orchestrator.add_stop("sealed").expect("stop");

    assert_eq!(orchestrator.legs().len(), 2);
    let reachable = &orchestrator.legs()[0];
    assert!(!reachable.is_unreachable());
    assert!(reachable.distance_km > 0.0);

    let blocked = &orchestrator.legs()[1];
    let info = blocked.unreachable.as_ref().expect("diagnostics present");
    assert_eq!(info.reason, UnreachableReason::NoPath);
    assert_eq!(info.to_connections, 0);
    assert!(info.message.contains("0 connections"));

    let summary = orchestrator.route_summary();
    assert!(summary.has_unreachable);
    assert!((summary.total_distance_km - reachable.distance_km).abs() < 1e-9);
}

#[test]
fn the_route_cap_holds_at_fifty_stops() {
    let mut orchestrator = RouteOrchestrator::new(plains_map());
    for index in 0..50 {
        orchestrator
            .add_waypoint_stop(60.0 + index as f64 * 4.0, 100.0)
            .expect("stop within the cap");
    }
    assert_eq!(orchestrator.stops().len(), 50);
    assert_eq!(orchestrator.legs().len(), 49);

    let err = orchestrator
        .add_waypoint_stop(120.0, 120.0)
        .expect_err("cap reached");
    assert!(matches!(err, Error::RouteTooLong { max: 50 }));
    assert_eq!(orchestrator.waypoints().len(), 50);
}

#[test]
fn recalculation_is_deterministic() {
    let mut orchestrator = RouteOrchestrator::new(plains_map());
    orchestrator.add_stop("a").expect("stop");
    orchestrator.add_stop("b").expect("stop");
    let first = orchestrator.legs().to_vec();

    orchestrator.recompute().expect("cached graph rerun");
    assert_eq!(orchestrator.legs(), first.as_slice());

    orchestrator.invalidate_graph();
    orchestrator.recompute().expect("full rebuild rerun");
    assert_eq!(orchestrator.legs(), first.as_slice());
}

#[test]
fn bad_profile_speeds_fall_back_to_defaults() {
    let mut orchestrator = RouteOrchestrator::new(plains_map());
    orchestrator.add_stop("a").expect("stop");
    orchestrator.add_stop("b").expect("stop");
    let walking_days = orchestrator.legs()[0].travel_days;

    orchestrator
        .set_profile(TravelProfile::new("Broken", -5.0, 0.0))
        .expect("profile change");
    let fallback_days = orchestrator.legs()[0].travel_days;
    assert!((fallback_days - walking_days).abs() < 1e-9);
}

#[test]
fn summary_and_legs_serialize_in_camel_case() {
    let mut orchestrator = RouteOrchestrator::new(plains_map());
    orchestrator.add_stop("a").expect("stop");
    orchestrator.add_stop("b").expect("stop");

    let summary = serde_json::to_value(orchestrator.route_summary()).expect("summary serializes");
    for key in [
        "totalDistanceKm",
        "totalTravelDays",
        "breakdown",
        "hasUnreachable",
        "usesSea",
        "durationLabel",
        "points",
        "dayMarkers",
    ] {
        assert!(summary.get(key).is_some(), "summary key {key}");
    }
    assert!(summary["breakdown"].get("roadKm").is_some());
    assert!(summary["points"][0].get("isMarker").is_some());

    let leg = serde_json::to_value(&orchestrator.legs()[0]).expect("leg serializes");
    for key in [
        "from",
        "to",
        "distanceKm",
        "travelDays",
        "weightedCostKm",
        "usesSea",
        "breakdown",
        "segments",
        "unreachable",
    ] {
        assert!(leg.get(key).is_some(), "leg key {key}");
    }
    assert!(leg["unreachable"].is_null());
    assert_eq!(leg["from"]["id"], "a");
}
