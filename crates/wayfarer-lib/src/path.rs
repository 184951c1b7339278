//! Weighted shortest-path search over the routing graph.
//!
//! Edges are weighed as `distance * cost`, so the cheapest path is the one a
//! traveller would plausibly take rather than the geometrically shortest. Two
//! variants share the same machinery: A* with a straight-line heuristic for
//! interactive latency, and Dijkstra as the exact reference.
//!
//! Water is gated per edge during relaxation: an edge whose endpoints differ
//! in water classification is traversable only when one endpoint is a
//! port-flagged marker. Gating at relaxation time rather than at build time
//! keeps one graph valid for every start/goal pair.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::graph::{Edge, Graph, Node, NodeId};

/// Caps on a single search, so a degenerate graph or an impossible leg
/// degrades into a diagnosable outcome instead of a frozen caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Maximum number of nodes taken off the frontier.
    pub max_iterations: usize,
    /// Wall-clock budget for one search.
    pub max_duration: Duration,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            max_duration: Duration::from_secs(5),
        }
    }
}

/// Result of a bounded search. `NoPath` means the frontier was exhausted and
/// no connection exists; `Timeout` means a cap fired first and says nothing
/// about connectivity.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found { path: Vec<NodeId> },
    NoPath,
    Timeout { iterations: usize, elapsed: Duration },
}

impl SearchOutcome {
    pub fn path(&self) -> Option<&[NodeId]> {
        match self {
            SearchOutcome::Found { path } => Some(path),
            _ => None,
        }
    }
}

/// A* search from `from` to `to`, using straight-line distance as the
/// heuristic. Sub-unit edge costs (sea, roads) can make the heuristic
/// overestimate, trading strict optimality for a large frontier reduction on
/// land-dominated legs; [`find_path_dijkstra`] is the exact variant.
pub fn find_path(
    graph: &Graph,
    from: &str,
    to: &str,
    limits: &SearchLimits,
) -> Result<SearchOutcome> {
    shortest_path(graph, from, to, limits, true)
}

/// Dijkstra search from `from` to `to`. Exact, and the baseline the A*
/// variant is tested against.
pub fn find_path_dijkstra(
    graph: &Graph,
    from: &str,
    to: &str,
    limits: &SearchLimits,
) -> Result<SearchOutcome> {
    shortest_path(graph, from, to, limits, false)
}

/// Whether an edge may be relaxed: land/water transitions require a
/// port-flagged marker on one end, everything else passes.
pub fn crossing_allowed(graph: &Graph, edge: &Edge) -> bool {
    let (Some(from), Some(to)) = (graph.node(&edge.from), graph.node(&edge.to)) else {
        return false;
    };
    if from.is_water() == to.is_water() {
        return true;
    }
    from.port_flagged() || to.port_flagged()
}

/// Sum of planar edge lengths along a node path. Pairs without a stored edge
/// fall back to straight-line distance.
pub fn path_distance(graph: &Graph, path: &[NodeId]) -> f64 {
    path.windows(2)
        .map(|pair| match graph.edge_between(&pair[0], &pair[1]) {
            Some(edge) => edge.distance,
            None => node_distance(graph, &pair[0], &pair[1]),
        })
        .sum()
}

/// Sum of weighted traversal costs along a node path.
pub fn path_cost(graph: &Graph, path: &[NodeId]) -> f64 {
    path.windows(2)
        .filter_map(|pair| graph.edge_between(&pair[0], &pair[1]))
        .map(Edge::traversal_cost)
        .sum()
}

fn node_distance(graph: &Graph, a: &str, b: &str) -> f64 {
    match (graph.node(a), graph.node(b)) {
        (Some(a), Some(b)) => a.distance_to(b),
        _ => 0.0,
    }
}

/// Frontier entry. `estimate` is the heap key (cost plus heuristic), `cost`
/// the cost actually accumulated so far.
#[derive(Debug, Clone, PartialEq, Eq)]
struct State {
    estimate: FloatOrd,
    cost: FloatOrd,
    node: NodeId,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by estimate.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total ordering for edge weights; NaN never occurs in a validated graph but
/// must not poison the heap if it does.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FloatOrd(f64);

impl Eq for FloatOrd {}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn shortest_path(
    graph: &Graph,
    from: &str,
    to: &str,
    limits: &SearchLimits,
    use_heuristic: bool,
) -> Result<SearchOutcome> {
    if !graph.contains_node(from) {
        return Err(Error::NodeNotFound { id: from.to_owned() });
    }
    let Some(goal) = graph.node(to) else {
        return Err(Error::NodeNotFound { id: to.to_owned() });
    };
    let goal_position = goal.position();
    let heuristic = |node: &Node| {
        if use_heuristic {
            node.position().distance_to(&goal_position)
        } else {
            0.0
        }
    };

    let started = Instant::now();
    let mut best: HashMap<NodeId, f64> = HashMap::new();
    let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
    let mut frontier = BinaryHeap::new();

    best.insert(from.to_owned(), 0.0);
    let start_estimate = graph.node(from).map(&heuristic).unwrap_or(0.0);
    frontier.push(State {
        estimate: FloatOrd(start_estimate),
        cost: FloatOrd(0.0),
        node: from.to_owned(),
    });

    let mut iterations = 0usize;
    while let Some(State { cost, node, .. }) = frontier.pop() {
        iterations += 1;
        if iterations > limits.max_iterations || started.elapsed() > limits.max_duration {
            let elapsed = started.elapsed();
            debug!(
                from,
                to,
                iterations,
                elapsed_ms = elapsed.as_millis() as u64,
                "search hit its limits"
            );
            return Ok(SearchOutcome::Timeout { iterations, elapsed });
        }

        if node == to {
            let path = reconstruct(&parents, &node);
            trace!(from, to, nodes = path.len(), iterations, "path found");
            return Ok(SearchOutcome::Found { path });
        }
        // Stale frontier entry: a cheaper cost for this node was settled
        // after it was pushed.
        if best.get(&node).is_some_and(|&known| cost.0 > known) {
            continue;
        }

        for edge in graph.outgoing(&node) {
            if !crossing_allowed(graph, edge) {
                continue;
            }
            let next_cost = cost.0 + edge.traversal_cost();
            if best
                .get(&edge.to)
                .is_some_and(|&known| next_cost >= known)
            {
                continue;
            }
            best.insert(edge.to.clone(), next_cost);
            parents.insert(edge.to.clone(), node.clone());
            let estimate = match graph.node(&edge.to) {
                Some(target) => next_cost + heuristic(target),
                None => next_cost,
            };
            frontier.push(State {
                estimate: FloatOrd(estimate),
                cost: FloatOrd(next_cost),
                node: edge.to.clone(),
            });
        }
    }

    debug!(from, to, iterations, "no path");
    Ok(SearchOutcome::NoPath)
}

fn reconstruct(parents: &HashMap<NodeId, NodeId>, goal: &str) -> Vec<NodeId> {
    let mut path = vec![goal.to_owned()];
    let mut current = goal;
    while let Some(previous) = parents.get(current) {
        path.push(previous.clone());
        current = previous;
    }
    path.reverse();
    path
}
