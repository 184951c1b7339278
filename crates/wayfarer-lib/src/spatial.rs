//! 2-D KD-tree point index over graph node positions.
//!
//! Graph construction repeatedly asks "nearest road node to this marker" and
//! "water cells within this radius"; a KD-tree answers those in O(log n)
//! instead of scanning every node per marker. Queries return `(key, distance)`
//! pairs sorted by distance ascending.

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;

use crate::map::MapPoint;

/// KD-tree bucket size. 32 keeps tree depth shallow for the node counts seen
/// here (hundreds of road vertices, low tens of thousands of grid cells).
const BUCKET_SIZE: usize = 32;

/// Spatial index mapping 2-D positions to arbitrary keys.
#[derive(Debug)]
pub struct PointIndex<K> {
    tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32>,
    keys: Vec<K>,
}

impl<K: Clone> PointIndex<K> {
    pub fn new() -> Self {
        Self {
            tree: KdTree::new(),
            keys: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn insert(&mut self, key: K, position: MapPoint) {
        let index = self.keys.len();
        self.tree.add(&[position.x, position.y], index);
        self.keys.push(key);
    }

    /// Nearest entry to `point`, with its distance in map units.
    pub fn nearest_one(&self, point: MapPoint) -> Option<(K, f64)> {
        if self.is_empty() {
            return None;
        }
        let neighbour = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[point.x, point.y]);
        let key = self.keys[neighbour.item].clone();
        Some((key, neighbour.distance.sqrt()))
    }

    /// Up to `k` nearest entries, sorted by distance ascending.
    pub fn nearest(&self, point: MapPoint, k: usize) -> Vec<(K, f64)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }
        let neighbours = self
            .tree
            .nearest_n::<SquaredEuclidean>(&[point.x, point.y], k);
        neighbours
            .into_iter()
            .map(|neighbour| (self.keys[neighbour.item].clone(), neighbour.distance.sqrt()))
            .collect()
    }

    /// All entries within `radius` map units, sorted by distance ascending.
    pub fn within_radius(&self, point: MapPoint, radius: f64) -> Vec<(K, f64)> {
        if radius <= 0.0 || self.is_empty() {
            return Vec::new();
        }
        let results = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&[point.x, point.y], radius * radius);

        let mut neighbours: Vec<(K, f64)> = results
            .into_iter()
            .map(|neighbour| (self.keys[neighbour.item].clone(), neighbour.distance.sqrt()))
            .collect();
        neighbours.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        neighbours
    }
}

impl<K: Clone> Default for PointIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> PointIndex<&'static str> {
        let mut index = PointIndex::new();
        index.insert("origin", MapPoint::new(0.0, 0.0));
        index.insert("east", MapPoint::new(10.0, 0.0));
        index.insert("north", MapPoint::new(0.0, 25.0));
        index.insert("far", MapPoint::new(100.0, 100.0));
        index
    }

    #[test]
    fn nearest_one_returns_closest_entry() {
        let index = sample_index();
        let (key, distance) = index
            .nearest_one(MapPoint::new(9.0, 1.0))
            .expect("index is not empty");
        assert_eq!(key, "east");
        assert!((distance - 2.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn within_radius_is_sorted_and_bounded() {
        let index = sample_index();
        let hits = index.within_radius(MapPoint::new(0.0, 0.0), 26.0);
        let keys: Vec<_> = hits.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec!["origin", "east", "north"]);
        assert!(hits.windows(2).all(|pair| pair[0].1 <= pair[1].1));
    }

    #[test]
    fn queries_on_empty_index_return_nothing() {
        let index: PointIndex<&str> = PointIndex::new();
        assert!(index.nearest_one(MapPoint::new(0.0, 0.0)).is_none());
        assert!(index.within_radius(MapPoint::new(0.0, 0.0), 10.0).is_empty());
        assert!(index.nearest(MapPoint::new(0.0, 0.0), 3).is_empty());
    }
}
