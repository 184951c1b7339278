//! Wayfarer routing core.
//!
//! This crate turns a hand-authored fantasy map (markers, terrain polygons,
//! road polylines) into a multilayer travel graph and computes interactive
//! multi-stop routes over it: terrain-aware pathfinding, optional sea travel
//! through ports, per-leg distance and travel-time statistics, and a
//! naturalized polyline ready for rendering. Hosts embed the
//! [`route::RouteOrchestrator`] and drive it through its mutators instead of
//! reimplementing graph or search plumbing.
//!

pub mod builder;
pub mod error;
pub mod graph;
pub mod map;
pub mod path;
pub mod route;
pub mod spatial;
pub mod terrain;
pub mod visualize;
pub mod waypoint;

pub use builder::{GraphBuilder, GraphConfig};
pub use error::{Error, Result};
pub use graph::{Edge, EdgeCategory, EdgeType, Graph, Node, NodeId, NodeKind};
pub use map::{
    MapBounds, MapData, MapPoint, Marker, MarkerId, TerrainFeature, TerrainKind, TravelProfile,
};
pub use path::{find_path, find_path_dijkstra, SearchLimits, SearchOutcome};
pub use route::{
    CancelToken, DistanceBreakdown, LegEndpoint, RouteConfig, RouteLeg, RouteOrchestrator,
    RouteSummary, UnreachableInfo, UnreachableReason,
};
pub use terrain::{CostModel, TerrainCosts};
pub use visualize::{
    classify_segments, day_markers, format_duration, merge_points, naturalize, DayMarker,
    NaturalizeOptions, PathPoint, PathSegment, SegmentKind,
};
pub use waypoint::{Waypoint, WaypointManager};
