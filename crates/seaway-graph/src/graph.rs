//! Vertex/edge/polygon-membership graph with adjacency.
//!
//! The same structure serves as the obstacle graph (polygon boundary
//! edges, tagged per polygon) and as the visibility graph (edges
//! between mutually visible vertices, no polygons).
//!
//! Storage is insertion-ordered: points, edges, and each vertex's
//! incident-edge list are vectors, with hash maps used only for
//! membership lookups. Iteration order is therefore identical across
//! runs, which keeps the sweep order (and so the built graph)
//! reproducible.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{Edge, Point, PolygonId};

/// A graph over [`Point`]s with undirected [`Edge`]s.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Vertices in insertion order.
    points: Vec<Point>,
    /// Vertex -> slot in `points` / `incident`.
    slots: HashMap<Point, usize>,
    /// Incident edges per vertex slot, in insertion order.
    incident: Vec<Vec<Edge>>,
    /// All edges in insertion order.
    edges: Vec<Edge>,
    /// Membership set for `edges`.
    edge_set: HashSet<Edge>,
    /// Boundary edges per polygon id.
    polygons: BTreeMap<PolygonId, Vec<Edge>>,
}

impl Graph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an obstacle graph from vertex rings.
    ///
    /// A closed ring (first vertex equal to last) has its closing
    /// duplicate dropped. Each vertex is joined to the next, cyclically.
    /// Rings with at least three vertices become polygons: their points
    /// are tagged with a fresh [`PolygonId`] and their edges recorded
    /// under it. Shorter rings contribute free-floating edges only.
    #[must_use]
    pub fn from_rings(rings: &[Vec<Point>]) -> Self {
        let mut graph = Self::new();
        let mut next_id: PolygonId = 0;

        for ring in rings {
            let mut ring: &[Point] = ring;
            if ring.len() > 1 && ring.first() == ring.last() {
                ring = &ring[..ring.len() - 1];
            }
            if ring.is_empty() {
                continue;
            }

            let is_polygon = ring.len() > 2;
            let tag = |p: Point| {
                if is_polygon {
                    Point::with_polygon(p.x, p.y, next_id)
                } else {
                    Point::new(p.x, p.y)
                }
            };

            let mut seen = HashSet::new();
            for (i, &point) in ring.iter().enumerate() {
                let sibling = ring[(i + 1) % ring.len()];
                let edge = Edge::new(tag(point), tag(sibling));
                if is_polygon && seen.insert(edge) {
                    graph.polygons.entry(next_id).or_default().push(edge);
                }
                graph.add_edge(edge);
            }

            if is_polygon {
                next_id += 1;
            }
        }

        graph
    }

    /// Insert a vertex if not already present, returning its slot.
    fn slot_for(&mut self, point: Point) -> usize {
        if let Some(&slot) = self.slots.get(&point) {
            return slot;
        }
        let slot = self.points.len();
        self.points.push(point);
        self.incident.push(Vec::new());
        self.slots.insert(point, slot);
        slot
    }

    /// Add an undirected edge. Adding an edge already present is a no-op.
    pub fn add_edge(&mut self, edge: Edge) {
        if self.edge_set.contains(&edge) {
            return;
        }
        let a = self.slot_for(edge.p1);
        let b = self.slot_for(edge.p2);
        self.incident[a].push(edge);
        if b != a {
            self.incident[b].push(edge);
        }
        self.edges.push(edge);
        self.edge_set.insert(edge);
    }

    /// Record `edges` as boundary edges of polygon `id`, skipping any
    /// already recorded there.
    pub(crate) fn extend_polygon(&mut self, id: PolygonId, edges: &[Edge]) {
        let entry = self.polygons.entry(id).or_default();
        let mut present: HashSet<Edge> = entry.iter().copied().collect();
        for &edge in edges {
            if present.insert(edge) {
                entry.push(edge);
            }
        }
    }

    /// All vertices, in insertion order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// All edges, in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges incident to `point`. Empty if `point` is not a vertex.
    #[must_use]
    pub fn incident_edges(&self, point: Point) -> &[Edge] {
        self.slots
            .get(&point)
            .map_or(&[], |&slot| self.incident[slot].as_slice())
    }

    /// Vertices joined to `point` by an edge.
    pub fn adjacent_points(&self, point: Point) -> impl Iterator<Item = Point> + '_ {
        self.incident_edges(point)
            .iter()
            .map(move |edge| edge.adjacent(point))
    }

    /// Whether `other` shares an edge with `point`.
    #[must_use]
    pub fn is_adjacent(&self, point: Point, other: Point) -> bool {
        self.adjacent_points(point).any(|p| p == other)
    }

    /// Whether `point` is a vertex.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        self.slots.contains_key(&point)
    }

    /// Whether `edge` is present (in either direction).
    #[must_use]
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.edge_set.contains(edge)
    }

    /// Boundary edges of every polygon, keyed by ascending id.
    #[must_use]
    pub const fn polygons(&self) -> &BTreeMap<PolygonId, Vec<Edge>> {
        &self.polygons
    }

    /// Boundary edges of one polygon. Empty if the id is unknown.
    #[must_use]
    pub fn polygon_edges(&self, id: PolygonId) -> &[Edge] {
        self.polygons.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Number of vertices.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of polygons.
    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Returns `true` if the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Set equality: same edge set and same polygon-id -> edge-set map.
/// Insertion order is ignored.
impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        if self.edge_set != other.edge_set || self.polygons.len() != other.polygons.len() {
            return false;
        }
        self.polygons.iter().all(|(id, edges)| {
            other.polygons.get(id).is_some_and(|theirs| {
                let mine: HashSet<&Edge> = edges.iter().collect();
                let theirs: HashSet<&Edge> = theirs.iter().collect();
                mine == theirs
            })
        })
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Index-based serde proxy for [`Graph`].
///
/// Edges refer to vertices by position in `points`, and polygons refer
/// to edges by position in `edges`, so each coordinate is stored once.
#[derive(Serialize, Deserialize)]
struct GraphRecord {
    points: Vec<Point>,
    edges: Vec<(usize, usize)>,
    polygons: Vec<(PolygonId, Vec<usize>)>,
}

impl From<&Graph> for GraphRecord {
    fn from(graph: &Graph) -> Self {
        let slot = |p: Point| graph.slots.get(&p).copied().unwrap_or_default();
        let edge_index: HashMap<&Edge, usize> = graph
            .edges
            .iter()
            .enumerate()
            .map(|(i, e)| (e, i))
            .collect();

        Self {
            points: graph.points.clone(),
            edges: graph
                .edges
                .iter()
                .map(|e| (slot(e.p1), slot(e.p2)))
                .collect(),
            polygons: graph
                .polygons
                .iter()
                .map(|(&id, edges)| {
                    let indices = edges.iter().filter_map(|e| edge_index.get(e).copied());
                    (id, indices.collect())
                })
                .collect(),
        }
    }
}

impl From<GraphRecord> for Graph {
    fn from(record: GraphRecord) -> Self {
        let mut graph = Self::new();
        for &point in &record.points {
            graph.slot_for(point);
        }

        let resolve = |i: usize| record.points.get(i).copied();
        let edges: Vec<Option<Edge>> = record
            .edges
            .iter()
            .map(|&(a, b)| Some(Edge::new(resolve(a)?, resolve(b)?)))
            .collect();
        for edge in edges.iter().flatten() {
            graph.add_edge(*edge);
        }

        for (id, indices) in record.polygons {
            let boundary: Vec<Edge> = indices
                .iter()
                .filter_map(|&i| edges.get(i).copied().flatten())
                .collect();
            graph.extend_polygon(id, &boundary);
        }

        graph
    }
}

impl Serialize for Graph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GraphRecord::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Graph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        GraphRecord::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ring(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn triangle_becomes_polygon_zero() {
        let graph = Graph::from_rings(&[ring(&[(0.0, 0.0), (4.0, 0.0), (2.0, 4.0)])]);
        assert_eq!(graph.point_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.polygon_count(), 1);
        assert_eq!(graph.polygon_edges(0).len(), 3);
        assert!(graph.points().iter().all(|p| p.polygon_id == Some(0)));
    }

    #[test]
    fn closed_ring_drops_duplicate_last_vertex() {
        let graph = Graph::from_rings(&[ring(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (2.0, 4.0),
            (0.0, 0.0),
        ])]);
        assert_eq!(graph.point_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn short_rings_are_not_polygons() {
        let graph = Graph::from_rings(&[
            ring(&[(0.0, 0.0), (1.0, 0.0)]),
            ring(&[(5.0, 5.0)]),
            ring(&[(2.0, 2.0), (3.0, 2.0), (3.0, 3.0)]),
        ]);
        assert_eq!(graph.polygon_count(), 1);
        // The only polygon takes id 0 even though it is the third ring.
        assert_eq!(graph.polygon_edges(0).len(), 3);
        assert!(graph.contains_point(Point::new(5.0, 5.0)));
        assert_eq!(
            graph
                .points()
                .iter()
                .filter(|p| p.polygon_id.is_none())
                .count(),
            3
        );
    }

    #[test]
    fn polygon_ids_increase_in_ring_order() {
        let graph = Graph::from_rings(&[
            ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]),
            ring(&[(5.0, 5.0), (6.0, 5.0), (5.0, 6.0)]),
        ]);
        let ids: Vec<_> = graph.polygons().keys().copied().collect();
        assert_eq!(ids, vec![0, 1]);
        assert!(
            graph
                .incident_edges(Point::new(5.0, 5.0))
                .iter()
                .all(|e| e.p1.polygon_id == Some(1))
        );
    }

    #[test]
    fn add_edge_is_idempotent_and_undirected() {
        let mut graph = Graph::new();
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        graph.add_edge(Edge::new(a, b));
        graph.add_edge(Edge::new(b, a));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.incident_edges(a).len(), 1);
        assert_eq!(graph.incident_edges(b).len(), 1);
        assert!(graph.is_adjacent(a, b));
        assert!(graph.contains_edge(&Edge::new(b, a)));
    }

    #[test]
    fn incident_edges_of_unknown_point_is_empty() {
        let graph = Graph::from_rings(&[ring(&[(0.0, 0.0), (4.0, 0.0), (2.0, 4.0)])]);
        assert!(graph.incident_edges(Point::new(9.0, 9.0)).is_empty());
        assert_eq!(graph.adjacent_points(Point::new(9.0, 9.0)).count(), 0);
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        let c = Point::new(1.0, 1.0);

        let mut first = Graph::new();
        first.add_edge(Edge::new(a, b));
        first.add_edge(Edge::new(b, c));

        let mut second = Graph::new();
        second.add_edge(Edge::new(c, b));
        second.add_edge(Edge::new(b, a));

        assert_eq!(first, second);

        second.add_edge(Edge::new(a, c));
        assert_ne!(first, second);
    }

    #[test]
    fn serde_round_trip_preserves_edges_and_polygons() {
        let graph = Graph::from_rings(&[
            ring(&[(0.0, 0.0), (4.0, 0.0), (2.0, 4.0)]),
            ring(&[(10.0, 10.0), (11.0, 10.0)]),
        ]);
        let json = serde_json::to_string(&graph).unwrap();
        let back: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(graph, back);
        assert_eq!(back.points(), graph.points());
        assert_eq!(back.polygon_edges(0).len(), 3);
    }
}
