//! Multilayer routing-graph construction.
//!
//! Layers, in build order:
//!
//! 1. **Roads** — every road polyline vertex becomes a node, consecutive
//!    vertices become cheap edges, and vertices sharing a rounded coordinate
//!    across polylines are merged with zero-cost intersection edges.
//! 2. **Terrain grid** — a uniform grid over the padded data bounds. Cell
//!    cost comes from the cost model; water cells are classified
//!    geometrically so the sea toggle can change pricing without changing
//!    what counts as water. Cells connect to their 8 neighbours at the mean
//!    of the endpoint costs; edges at or above the impassable cutoff are
//!    omitted entirely.
//! 3. **Markers** — only the markers of the active route. Connecting the
//!    whole authored set would pull routes magnetically through unrelated
//!    points of interest.
//! 4. **Bridges** — marker-to-road links (widened radius and a synthetic
//!    snap node for waypoints), marker-to-terrain links (nearest cell plus
//!    backups), and port-to-sea links when sea travel is enabled.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::{
    marker_node_id, road_node_id, snap_node_id, terrain_node_id, Edge, EdgeType, Graph,
    GraphDiagnostics, Node, NodeId, NodeKind,
};
use crate::map::{MapData, MapPoint, Marker, TerrainKind};
use crate::spatial::PointIndex;
use crate::terrain::{self, CostModel, TerrainCosts};

/// Tuning parameters for graph construction. Defaults reproduce the authored
/// map's empirically chosen scale; hosts with differently scaled maps
/// override individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Terrain grid spacing in map units.
    pub grid_spacing: f64,
    /// Padding added around the data bounding box before gridding.
    pub bounds_padding: f64,
    /// Maximum distance for a marker's road attachment.
    pub road_link_radius: f64,
    /// Road-radius multiplier for waypoints, which users drop near roads on
    /// purpose and expect to attach.
    pub waypoint_radius_scale: f64,
    /// Base cost penalty for entering the road network off-road.
    pub road_entry_penalty: f64,
    /// Terrain bridge candidates per marker beyond the nearest cell.
    pub max_terrain_links: usize,
    /// Preferred terrain-bridge search radius, in grid cells.
    pub preferred_terrain_radius_cells: f64,
    /// Extended fallback radius for sparse terrain, in grid cells.
    pub extended_terrain_radius_cells: f64,
    /// Port-to-sea search radius, in grid cells.
    pub sea_link_radius_cells: f64,
    /// Widening factor applied when no water lies in the preferred radius.
    pub sea_link_fallback_scale: f64,
    /// Cap on sea links per port.
    pub max_sea_links: usize,
    /// Multiplier on the terrain bridges of sea-connected markers, biasing
    /// them toward road and port routing. Never applied to markers without
    /// actual sea links.
    pub sea_road_bias: f64,
    /// Edges whose cost reaches this value are omitted from the graph.
    pub impassable_cutoff: f64,
    pub costs: TerrainCosts,
    /// Terrain kinds classified as water.
    pub water_kinds: HashSet<TerrainKind>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            grid_spacing: 25.0,
            bounds_padding: 50.0,
            road_link_radius: 300.0,
            waypoint_radius_scale: 1.5,
            road_entry_penalty: 0.35,
            max_terrain_links: 4,
            preferred_terrain_radius_cells: 6.0,
            extended_terrain_radius_cells: 12.0,
            sea_link_radius_cells: 3.0,
            sea_link_fallback_scale: 2.0,
            max_sea_links: 6,
            sea_road_bias: 2.5,
            impassable_cutoff: 25.0,
            costs: TerrainCosts::default(),
            water_kinds: terrain::default_water_kinds(),
        }
    }
}

/// Builds a [`Graph`] for one route-scoped marker set.
pub struct GraphBuilder<'a> {
    map: &'a MapData,
    route_markers: &'a [Marker],
    sea_travel: bool,
    config: &'a GraphConfig,
}

/// Grid bookkeeping shared between layer construction and bridging.
struct GridIndex {
    origin_x: f64,
    origin_y: f64,
    spacing: f64,
    cell_ids: HashMap<(i64, i64), NodeId>,
    land: PointIndex<NodeId>,
    water: PointIndex<NodeId>,
}

impl GridIndex {
    /// Cell id nearest to a point by coordinate rounding. The grid origin is
    /// aligned to a spacing multiple, so this is exact.
    fn nearest_cell_id(&self, point: MapPoint) -> Option<&NodeId> {
        let col = ((point.x - self.origin_x) / self.spacing).round() as i64;
        let row = ((point.y - self.origin_y) / self.spacing).round() as i64;
        self.cell_ids.get(&(col, row))
    }
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        map: &'a MapData,
        route_markers: &'a [Marker],
        sea_travel: bool,
        config: &'a GraphConfig,
    ) -> Self {
        Self {
            map,
            route_markers,
            sea_travel,
            config,
        }
    }

    pub fn build(&self) -> Result<Graph> {
        self.map.validate()?;
        for marker in self.route_markers {
            if !marker.position().is_finite() {
                return Err(Error::NonFiniteCoordinates {
                    what: "route marker",
                    id: marker.id.clone(),
                    x: marker.x,
                    y: marker.y,
                });
            }
        }

        let cost_model = CostModel::new(
            self.map.features(),
            self.config.costs,
            self.config.water_kinds.clone(),
        );

        let mut graph = Graph::new();
        let road_index = self.build_roads_layer(&mut graph);
        let grid = self.build_terrain_grid(&mut graph, &cost_model);
        self.build_marker_layer(&mut graph);
        let diagnostics = self.build_bridges(&mut graph, &cost_model, &road_index, &grid);
        graph.set_diagnostics(diagnostics);
        debug_assert!(graph.validate().is_ok());

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            markers = self.route_markers.len(),
            sea_travel = self.sea_travel,
            "built routing graph"
        );
        Ok(graph)
    }

    fn build_roads_layer(&self, graph: &mut Graph) -> PointIndex<NodeId> {
        let mut index = PointIndex::new();
        let mut merged: HashMap<(i64, i64), Vec<NodeId>> = HashMap::new();
        let road_cost = self.config.costs.road;

        for (road_idx, line) in self.map.road_polylines().enumerate() {
            let coords: Vec<MapPoint> = line.coords().map(|c| MapPoint::from(*c)).collect();

            for (vertex_idx, point) in coords.iter().enumerate() {
                let id = road_node_id(road_idx, vertex_idx);
                graph.insert_node(id.clone(), Node::new(point.x, point.y, NodeKind::Road));
                index.insert(id.clone(), *point);
                merged
                    .entry((point.x.round() as i64, point.y.round() as i64))
                    .or_default()
                    .push(id);
            }

            for (vertex_idx, pair) in coords.windows(2).enumerate() {
                let distance = pair[0].distance_to(&pair[1]);
                graph.add_edge_pair(
                    road_node_id(road_idx, vertex_idx),
                    road_node_id(road_idx, vertex_idx + 1),
                    road_cost,
                    distance,
                    EdgeType::Road,
                );
            }
        }

        // Vertices of different polylines at the same rounded coordinate form
        // an intersection; zero-cost edges let routes switch roads there.
        let mut intersections = 0usize;
        for ids in merged.values() {
            if ids.len() < 2 {
                continue;
            }
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    graph.add_edge_pair(
                        ids[i].clone(),
                        ids[j].clone(),
                        0.0,
                        0.0,
                        EdgeType::RoadIntersection,
                    );
                    intersections += 1;
                }
            }
        }

        debug!(
            road_nodes = index.len(),
            intersections, "built roads layer"
        );
        index
    }

    fn build_terrain_grid(&self, graph: &mut Graph, cost_model: &CostModel) -> GridIndex {
        let spacing = self.config.grid_spacing;
        let route_points = self.route_markers.iter().map(Marker::position);
        let bounds = terrain::data_bounds(
            self.map.features(),
            route_points,
            self.config.bounds_padding,
        );

        // Align the origin to a spacing multiple so a marker's nearest cell
        // can be found by rounding instead of searching.
        let origin_x = (bounds.min_x / spacing).floor() * spacing;
        let origin_y = (bounds.min_y / spacing).floor() * spacing;
        let cols = ((bounds.max_x - origin_x) / spacing).floor() as i64 + 1;
        let rows = ((bounds.max_y - origin_y) / spacing).floor() as i64 + 1;

        let mut grid = GridIndex {
            origin_x,
            origin_y,
            spacing,
            cell_ids: HashMap::with_capacity((cols * rows) as usize),
            land: PointIndex::new(),
            water: PointIndex::new(),
        };
        let mut costs: HashMap<(i64, i64), f64> = HashMap::with_capacity((cols * rows) as usize);

        for col in 0..cols {
            for row in 0..rows {
                let x = origin_x + col as f64 * spacing;
                let y = origin_y + row as f64 * spacing;
                let point = MapPoint::new(x, y);
                let is_water = cost_model.is_water(point);

                // Water keeps its geometric classification; only the price
                // changes when sea travel is enabled.
                let cost = if is_water && self.sea_travel {
                    self.config.costs.sea
                } else {
                    cost_model.cost_at(point)
                };

                let id = terrain_node_id(x, y);
                graph.insert_node(id.clone(), Node::new(x, y, NodeKind::Terrain { cost, is_water }));
                if is_water {
                    grid.water.insert(id.clone(), point);
                } else {
                    grid.land.insert(id.clone(), point);
                }
                grid.cell_ids.insert((col, row), id);
                costs.insert((col, row), cost);
            }
        }

        // 8-neighbour connectivity at the mean of the endpoint costs. Each
        // directed edge is emitted from its own cell's pass, covering both
        // directions without duplicates.
        let mut omitted = 0usize;
        for (&(col, row), id) in &grid.cell_ids {
            let cost = costs[&(col, row)];
            let here_water = graph.node(id).map(Node::is_water).unwrap_or(false);
            for (dc, dr) in NEIGHBOR_OFFSETS {
                let neighbor_key = (col + dc, row + dr);
                let Some(neighbor_id) = grid.cell_ids.get(&neighbor_key) else {
                    continue;
                };
                let average = (cost + costs[&neighbor_key]) / 2.0;
                if average >= self.config.impassable_cutoff {
                    omitted += 1;
                    continue;
                }
                let neighbor_water = graph
                    .node(neighbor_id)
                    .map(Node::is_water)
                    .unwrap_or(false);
                let edge_type = if self.sea_travel && here_water && neighbor_water {
                    EdgeType::Sea
                } else {
                    EdgeType::Terrain
                };
                let distance = spacing * ((dc * dc + dr * dr) as f64).sqrt();
                graph.add_edge(Edge {
                    from: id.clone(),
                    to: neighbor_id.clone(),
                    cost: average,
                    distance,
                    edge_type,
                });
            }
        }

        debug!(
            cells = grid.cell_ids.len(),
            water_cells = grid.water.len(),
            omitted_edges = omitted,
            "built terrain grid layer"
        );
        grid
    }

    fn build_marker_layer(&self, graph: &mut Graph) {
        let mut seen = HashSet::new();
        for marker in self.route_markers {
            if !seen.insert(marker.id.as_str()) {
                continue;
            }
            graph.insert_node(
                marker_node_id(&marker.id),
                Node::new(
                    marker.x,
                    marker.y,
                    NodeKind::Marker {
                        marker_id: marker.id.clone(),
                        is_port: marker.is_port,
                        is_waypoint: marker.is_waypoint,
                    },
                ),
            );
        }
        debug!(markers = seen.len(), "built markers layer");
    }

    fn build_bridges(
        &self,
        graph: &mut Graph,
        cost_model: &CostModel,
        road_index: &PointIndex<NodeId>,
        grid: &GridIndex,
    ) -> GraphDiagnostics {
        let mut diagnostics = GraphDiagnostics::default();
        let mut seen = HashSet::new();

        for marker in self.route_markers {
            if !seen.insert(marker.id.as_str()) {
                continue;
            }
            self.connect_marker_to_roads(graph, cost_model, road_index, marker);

            let sea_links = if self.sea_travel && marker.is_port_capable() {
                self.connect_marker_to_sea(graph, grid, marker)
            } else {
                0
            };

            let terrain_links =
                self.connect_marker_to_terrain(graph, cost_model, grid, marker, sea_links > 0);
            if terrain_links == 0 {
                warn!(
                    marker = %marker.id,
                    name = %marker.name,
                    "marker has no terrain connections; legs touching it will be unreachable"
                );
                diagnostics.isolated_markers.push(marker.id.clone());
            }
        }
        diagnostics
    }

    fn connect_marker_to_roads(
        &self,
        graph: &mut Graph,
        cost_model: &CostModel,
        road_index: &PointIndex<NodeId>,
        marker: &Marker,
    ) {
        let position = marker.position();
        let radius = if marker.is_waypoint {
            self.config.road_link_radius * self.config.waypoint_radius_scale
        } else {
            self.config.road_link_radius
        };

        let Some((road_id, distance)) = road_index.nearest_one(position) else {
            return;
        };
        if distance >= radius {
            return;
        }
        let Some(road_position) = graph.node(&road_id).map(Node::position) else {
            return;
        };

        let base = cost_model.cost_between(position, road_position);
        if base >= self.config.impassable_cutoff {
            return;
        }

        // Entry penalty grows with attachment distance: very close
        // attachments stay cheap, far ones are not free.
        let bridge_cost = base + self.config.road_entry_penalty * (1.0 + distance / radius);
        graph.add_edge_pair(
            marker_node_id(&marker.id),
            road_id.clone(),
            bridge_cost,
            distance,
            EdgeType::RoadBridge,
        );

        if marker.is_waypoint {
            // Synthetic snap point at the waypoint itself, linked to the road
            // at plain road cost, lets a route hug the road instead of
            // detouring to the nearest vertex.
            let snap_id = snap_node_id(&marker.id);
            graph.insert_node(
                snap_id.clone(),
                Node::new(marker.x, marker.y, NodeKind::Synthetic),
            );
            graph.add_edge_pair(
                marker_node_id(&marker.id),
                snap_id.clone(),
                0.0,
                0.0,
                EdgeType::RoadSnapLink,
            );
            graph.add_edge_pair(
                snap_id,
                road_id,
                self.config.costs.road,
                distance,
                EdgeType::RoadSnapLink,
            );
        }
    }

    fn connect_marker_to_sea(
        &self,
        graph: &mut Graph,
        grid: &GridIndex,
        marker: &Marker,
    ) -> usize {
        let position = marker.position();
        let preferred = self.config.sea_link_radius_cells * self.config.grid_spacing;

        let mut candidates = grid.water.within_radius(position, preferred);
        if candidates.is_empty() {
            candidates = grid
                .water
                .within_radius(position, preferred * self.config.sea_link_fallback_scale);
        }
        if candidates.is_empty() {
            warn!(marker = %marker.id, "no navigable water near port-capable marker");
            return 0;
        }

        let link_cost = self.config.costs.port_link();
        let mut links = 0usize;
        for (water_id, distance) in candidates.into_iter().take(self.config.max_sea_links) {
            graph.add_edge_pair(
                marker_node_id(&marker.id),
                water_id,
                link_cost,
                distance,
                EdgeType::SeaPortLink,
            );
            links += 1;
        }
        links
    }

    fn connect_marker_to_terrain(
        &self,
        graph: &mut Graph,
        cost_model: &CostModel,
        grid: &GridIndex,
        marker: &Marker,
        sea_connected: bool,
    ) -> usize {
        let position = marker.position();
        let preferred = self.config.preferred_terrain_radius_cells * self.config.grid_spacing;
        let extended = self.config.extended_terrain_radius_cells * self.config.grid_spacing;
        // Sea-connected markers get their overland bridges de-prioritized so
        // plausible sea legs are not undercut by a cross-country shortcut.
        let bias = if sea_connected {
            self.config.sea_road_bias
        } else {
            1.0
        };
        let mut connected: HashSet<NodeId> = HashSet::new();

        if let Some(cell_id) = grid.nearest_cell_id(position) {
            self.add_terrain_link(
                graph,
                cost_model,
                &mut connected,
                marker,
                cell_id.clone(),
                bias,
                extended,
                EdgeType::TerrainBridge,
            );
        }

        let mut candidates = grid.land.within_radius(position, preferred);
        if candidates.is_empty() {
            candidates = grid.land.within_radius(position, extended);
        }
        for (cell_id, distance) in candidates.into_iter().take(self.config.max_terrain_links) {
            let edge_type = if distance <= preferred {
                EdgeType::TerrainBridgeBackup
            } else {
                EdgeType::TerrainBridgeExtended
            };
            self.add_terrain_link(
                graph,
                cost_model,
                &mut connected,
                marker,
                cell_id,
                bias,
                extended,
                edge_type,
            );
        }

        connected.len()
    }

    #[allow(clippy::too_many_arguments)]
    fn add_terrain_link(
        &self,
        graph: &mut Graph,
        cost_model: &CostModel,
        connected: &mut HashSet<NodeId>,
        marker: &Marker,
        cell_id: NodeId,
        bias: f64,
        max_distance: f64,
        edge_type: EdgeType,
    ) -> bool {
        if connected.contains(&cell_id) {
            return false;
        }
        let Some(cell) = graph.node(&cell_id) else {
            return false;
        };
        // Water cells are never terrain bridge targets; ports reach water
        // through sea links only.
        if cell.is_water() {
            return false;
        }
        let cell_position = cell.position();
        let distance = marker.position().distance_to(&cell_position);
        if distance > max_distance {
            return false;
        }

        let cost = cost_model.cost_between(marker.position(), cell_position) * bias;
        if cost >= self.config.impassable_cutoff {
            return false;
        }

        graph.add_edge_pair(
            marker_node_id(&marker.id),
            cell_id.clone(),
            cost,
            distance,
            edge_type,
        );
        connected.insert(cell_id);
        true
    }
}

/// 8-neighbour offsets in grid cells.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];
