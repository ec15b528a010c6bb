//! Ordered set of obstacle edges crossing the current sweep ray.
//!
//! Edges are kept sorted by where the ray from the sweep origin meets
//! them, nearest first, so the front edge is the one that can block a
//! candidate vertex. Positions are found by binary search with a
//! comparator evaluated against the ray at insertion time.
//!
//! The comparator treats any edge the ray does not currently cross as
//! nearer than the edge being placed. Such edges are about to be
//! evicted, so this is not a true distance order, but the resulting
//! positions determine which edges a later delete finds and so which
//! vertices end up visible.

use crate::geometry::{angle_at, point_edge_distance, segments_intersect};
use crate::types::{Edge, Point};

/// Edges crossing the sweep ray, nearest first.
#[derive(Debug, Clone, Default)]
pub struct OpenEdges {
    edges: Vec<Edge>,
}

impl OpenEdges {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { edges: Vec::new() }
    }

    /// Insert `edge`, positioned against the ray `origin -> toward`.
    pub fn insert(&mut self, origin: Point, toward: Point, edge: Edge) {
        let index = self.index(origin, toward, &edge);
        self.edges.insert(index, edge);
    }

    /// Remove `edge` if it sits immediately before the position it
    /// would be inserted at. Otherwise nothing happens.
    ///
    /// An insertion position of zero checks the back slot.
    pub fn delete(&mut self, origin: Point, toward: Point, edge: &Edge) {
        if self.edges.is_empty() {
            return;
        }
        let index = self
            .index(origin, toward, edge)
            .checked_sub(1)
            .unwrap_or(self.edges.len() - 1);
        if self.edges[index] == *edge {
            self.edges.remove(index);
        }
    }

    /// The nearest edge, if any.
    #[must_use]
    pub fn smallest(&self) -> Option<&Edge> {
        self.edges.first()
    }

    /// Number of open edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if no edges are open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Open edges, nearest first.
    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Lower-bound position for `edge`.
    fn index(&self, origin: Point, toward: Point, edge: &Edge) -> usize {
        let mut low = 0;
        let mut high = self.edges.len();
        while low < high {
            let mid = usize::midpoint(low, high);
            if less_than(origin, toward, edge, &self.edges[mid]) {
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        low
    }
}

/// Whether `edge` belongs before `existing` along the ray
/// `origin -> toward`.
///
/// Equal distances are broken by the angle each edge makes at their
/// shared vertex, smaller first.
#[allow(clippy::float_cmp)]
fn less_than(origin: Point, toward: Point, edge: &Edge, existing: &Edge) -> bool {
    if edge == existing {
        return false;
    }
    if !segments_intersect(origin, toward, existing) {
        return true;
    }

    let edge_distance = point_edge_distance(origin, toward, edge);
    let existing_distance = point_edge_distance(origin, toward, existing);
    if edge_distance > existing_distance {
        return false;
    }
    if edge_distance < existing_distance {
        return true;
    }
    if edge_distance != existing_distance {
        // NaN distances never reorder.
        return false;
    }

    let shared = if existing.contains(edge.p1) {
        edge.p1
    } else {
        edge.p2
    };
    let edge_angle = angle_at(origin, toward, edge.adjacent(shared));
    let existing_angle = angle_at(origin, toward, existing.adjacent(shared));
    edge_angle < existing_angle
}
