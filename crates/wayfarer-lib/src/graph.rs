//! Routing graph types: nodes, directed edges and the graph container.
//!
//! The graph spans four conceptual layers (roads, terrain grid, route
//! markers, navigable sea) and is immutable once built: terrain edits or
//! route changes rebuild it rather than patching it in place.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::map::{MapPoint, MarkerId};

/// String key identifying a graph node.
pub type NodeId = String;

/// Per-layer payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Vertex of a road polyline.
    Road,
    /// Terrain grid cell. `cost` already reflects sea pricing when sea travel
    /// is enabled; `is_water` is the geometric classification and never
    /// changes with the toggle.
    Terrain { cost: f64, is_water: bool },
    /// A route stop (point of interest or waypoint).
    Marker {
        marker_id: MarkerId,
        is_port: bool,
        is_waypoint: bool,
    },
    /// Helper node injected by the builder, e.g. a road snap point.
    Synthetic,
}

/// A graph vertex at a planar position.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(x: f64, y: f64, kind: NodeKind) -> Self {
        Self { x, y, kind }
    }

    pub fn position(&self) -> MapPoint {
        MapPoint::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &Node) -> f64 {
        self.position().distance_to(&other.position())
    }

    pub fn is_water(&self) -> bool {
        matches!(self.kind, NodeKind::Terrain { is_water: true, .. })
    }

    /// Whether this node satisfies the port-gating rule for land/water
    /// crossings. Waypoints count: they are user-placed and may sit on water.
    pub fn port_flagged(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Marker {
                is_port: true,
                ..
            } | NodeKind::Marker {
                is_waypoint: true,
                ..
            }
        )
    }

    pub fn terrain_cost(&self) -> Option<f64> {
        match self.kind {
            NodeKind::Terrain { cost, .. } => Some(cost),
            _ => None,
        }
    }

    pub fn marker_id(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Marker { marker_id, .. } => Some(marker_id),
            _ => None,
        }
    }
}

/// Layer/purpose tag of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Road,
    RoadIntersection,
    RoadBridge,
    RoadSnapLink,
    Terrain,
    /// Grid edge between two water cells while sea travel is enabled.
    Sea,
    TerrainBridge,
    TerrainBridgeBackup,
    TerrainBridgeExtended,
    SeaPortLink,
}

/// Statistics bucket an edge's distance contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCategory {
    Road,
    Terrain,
    Sea,
    Port,
}

impl EdgeType {
    pub fn category(self) -> EdgeCategory {
        match self {
            EdgeType::Road
            | EdgeType::RoadIntersection
            | EdgeType::RoadBridge
            | EdgeType::RoadSnapLink => EdgeCategory::Road,
            EdgeType::Sea => EdgeCategory::Sea,
            EdgeType::SeaPortLink => EdgeCategory::Port,
            EdgeType::Terrain
            | EdgeType::TerrainBridge
            | EdgeType::TerrainBridgeBackup
            | EdgeType::TerrainBridgeExtended => EdgeCategory::Terrain,
        }
    }
}

/// Directed connection between two nodes.
///
/// `cost` is the dimensionless terrain multiplier, `distance` the planar
/// length in map units; the search weighs an edge as `distance * cost` while
/// displayed distances sum `distance` alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub cost: f64,
    pub distance: f64,
    pub edge_type: EdgeType,
}

impl Edge {
    /// Weight used during search.
    pub fn traversal_cost(&self) -> f64 {
        self.distance * self.cost
    }
}

/// List of defects observed while building a graph. These deterministically
/// cause unreachable legs later, so they are kept for leg diagnostics instead
/// of being logged and forgotten.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphDiagnostics {
    /// Markers that could not be bridged to any terrain cell.
    pub isolated_markers: Vec<MarkerId>,
}

/// The built routing graph: node map, directed edge list, per-node adjacency
/// and a `"from|to"` pair lookup for O(1) edge retrieval.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    edges: Vec<Edge>,
    outgoing: HashMap<NodeId, Vec<usize>>,
    pair_lookup: HashMap<String, usize>,
    diagnostics: GraphDiagnostics,
}

impl Graph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_node(&mut self, id: NodeId, node: Node) {
        self.nodes.insert(id, node);
    }

    /// Adds one directed edge. The reverse direction is a separate edge.
    pub(crate) fn add_edge(&mut self, edge: Edge) {
        let index = self.edges.len();
        self.pair_lookup
            .insert(pair_key(&edge.from, &edge.to), index);
        self.outgoing
            .entry(edge.from.clone())
            .or_default()
            .push(index);
        self.edges.push(edge);
    }

    /// Adds a symmetric pair of directed edges.
    pub(crate) fn add_edge_pair(
        &mut self,
        from: NodeId,
        to: NodeId,
        cost: f64,
        distance: f64,
        edge_type: EdgeType,
    ) {
        self.add_edge(Edge {
            from: from.clone(),
            to: to.clone(),
            cost,
            distance,
            edge_type,
        });
        self.add_edge(Edge {
            from: to,
            to: from,
            cost,
            distance,
            edge_type,
        });
    }

    pub(crate) fn set_diagnostics(&mut self, diagnostics: GraphDiagnostics) {
        self.diagnostics = diagnostics;
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Directed edges leaving `id`.
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&index| &self.edges[index])
    }

    /// O(1) lookup of the directed edge between two nodes, if any.
    pub fn edge_between(&self, from: &str, to: &str) -> Option<&Edge> {
        self.pair_lookup
            .get(&pair_key(from, to))
            .map(|&index| &self.edges[index])
    }

    /// Out-degree of a node; used in unreachable-leg diagnostics.
    pub fn connection_count(&self, id: &str) -> usize {
        self.outgoing.get(id).map_or(0, Vec::len)
    }

    pub fn diagnostics(&self) -> &GraphDiagnostics {
        &self.diagnostics
    }

    /// Structural validity check: edge endpoints resolve, costs and distances
    /// are finite and non-negative, node coordinates are finite. Exercised by
    /// tests and debug paths rather than on every build.
    pub fn validate(&self) -> Result<()> {
        for (id, node) in &self.nodes {
            if !node.position().is_finite() {
                return Err(Error::GraphBuild {
                    message: format!("node {id} has non-finite coordinates"),
                });
            }
            if let Some(cost) = node.terrain_cost() {
                if !cost.is_finite() || cost < 0.0 {
                    return Err(Error::GraphBuild {
                        message: format!("node {id} has invalid terrain cost {cost}"),
                    });
                }
            }
        }
        for edge in &self.edges {
            if !self.nodes.contains_key(&edge.from) {
                return Err(Error::GraphBuild {
                    message: format!("edge references missing node {}", edge.from),
                });
            }
            if !self.nodes.contains_key(&edge.to) {
                return Err(Error::GraphBuild {
                    message: format!("edge references missing node {}", edge.to),
                });
            }
            if !edge.cost.is_finite() || edge.cost < 0.0 {
                return Err(Error::GraphBuild {
                    message: format!(
                        "edge {} -> {} has invalid cost {}",
                        edge.from, edge.to, edge.cost
                    ),
                });
            }
            if !edge.distance.is_finite() || edge.distance < 0.0 {
                return Err(Error::GraphBuild {
                    message: format!(
                        "edge {} -> {} has invalid distance {}",
                        edge.from, edge.to, edge.distance
                    ),
                });
            }
        }
        Ok(())
    }
}

fn pair_key(from: &str, to: &str) -> String {
    format!("{from}|{to}")
}

/// Node id for a road polyline vertex.
pub(crate) fn road_node_id(road_index: usize, vertex_index: usize) -> NodeId {
    format!("road_{road_index}_{vertex_index}")
}

/// Node id for a terrain grid cell at aligned coordinates.
pub(crate) fn terrain_node_id(x: f64, y: f64) -> NodeId {
    format!("terrain_{}_{}", x.round() as i64, y.round() as i64)
}

/// Node id for a route marker.
pub(crate) fn marker_node_id(marker_id: &str) -> NodeId {
    format!("marker_{marker_id}")
}

/// Node id for the synthetic road snap point of a waypoint.
pub(crate) fn snap_node_id(marker_id: &str) -> NodeId {
    format!("snap_{marker_id}")
}
