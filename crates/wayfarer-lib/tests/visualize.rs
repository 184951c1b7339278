mod common;

use common::{island_map, plains_map};
use wayfarer_lib::{merge_points, RouteOrchestrator, SegmentKind};

#[test]
fn rendered_polyline_is_anchored_at_the_stops() {
    let mut orchestrator = RouteOrchestrator::new(plains_map());
    orchestrator.add_stop("a").expect("stop");
    orchestrator.add_stop("b").expect("stop");

    let summary = orchestrator.route_summary();
    let first = summary.points.first().expect("polyline has points");
    let last = summary.points.last().expect("polyline has points");

    // Smoothing and waviness never move the stop anchors.
    assert!((first.x - 80.0).abs() < 1e-9 && (first.y - 100.0).abs() < 1e-9);
    assert!(first.is_marker);
    assert!((last.x - 240.0).abs() < 1e-9 && (last.y - 100.0).abs() < 1e-9);
    assert!(last.is_marker);
}

#[test]
fn naturalization_densifies_the_polyline_but_keeps_it_connected() {
    let mut orchestrator = RouteOrchestrator::new(plains_map());
    orchestrator.add_stop("a").expect("stop");
    orchestrator.add_stop("b").expect("stop");

    let raw = merge_points(
        orchestrator
            .legs()
            .iter()
            .flat_map(|leg| leg.segments.iter()),
    );
    let summary = orchestrator.route_summary();

    assert!(
        summary.points.len() > raw.len(),
        "subdivision adds points ({} rendered vs {} raw)",
        summary.points.len(),
        raw.len()
    );
    for pair in summary.points.windows(2) {
        let dx = pair[1].x - pair[0].x;
        let dy = pair[1].y - pair[0].y;
        let gap = (dx * dx + dy * dy).sqrt();
        assert!(gap < 40.0, "rendered polyline jumps {gap} units");
    }
}

#[test]
fn day_markers_progress_along_the_route() {
    let mut orchestrator = RouteOrchestrator::new(plains_map());
    orchestrator.add_stop("a").expect("stop");
    orchestrator.add_stop("b").expect("stop");

    let summary = orchestrator.route_summary();
    assert!(!summary.day_markers.is_empty());

    // West-to-east route: each day marker lands further east than the last.
    let mut previous_x = f64::NEG_INFINITY;
    for marker in &summary.day_markers {
        assert!(marker.x > previous_x, "day {} moved backwards", marker.day);
        assert!(marker.x >= 80.0 && marker.x <= 240.0);
        previous_x = marker.x;
    }
    assert!(summary.duration_label.contains('d'));
}

#[test]
fn sea_legs_render_as_sea_segments_between_the_harbours() {
    let mut orchestrator = RouteOrchestrator::new(island_map());
    orchestrator.add_stop("port_west").expect("stop");
    orchestrator.add_stop("port_east").expect("stop");
    orchestrator.set_sea_travel(true).expect("toggle on");

    let leg = &orchestrator.legs()[0];
    assert_eq!(leg.segments.len(), 1);
    let segment = &leg.segments[0];
    assert_eq!(segment.kind, SegmentKind::Sea);

    let first = segment.points.first().expect("segment has points");
    let last = segment.points.last().expect("segment has points");
    assert!((first.x - 230.0).abs() < 1e-9 && (first.y - 150.0).abs() < 1e-9);
    assert!((last.x - 350.0).abs() < 1e-9 && (last.y - 150.0).abs() < 1e-9);
    assert!(first.is_marker && last.is_marker);
}
