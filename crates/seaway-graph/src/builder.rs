//! Visibility-graph construction and queries.
//!
//! [`VisGraph`] pairs the obstacle graph built from the input rings
//! with the visibility graph swept from it. The only ways to obtain one
//! are [`VisGraph::build`], [`VisGraph::build_shuffled_range`],
//! [`merge_graphs`](crate::merge::merge_graphs) and decoding a saved
//! file, so every value is ready to query.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry;
use crate::graph::Graph;
use crate::search;
use crate::types::{BuildConfig, Edge, GraphError, Point, PolygonId, RouteError, Scan, SearchOptions};
use crate::visibility::visible_vertices;

/// A half-open slice `[start, end)` of a graph's (shuffled) vertex list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexRange {
    /// First vertex index, inclusive.
    pub start: usize,
    /// Last vertex index, exclusive.
    pub end: usize,
}

impl VertexRange {
    /// The `split_index`-th of `num_splits` near-equal splits of
    /// `num_vertices` vertices. The last split takes the remainder.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidRange`] if `num_splits` is zero or
    /// `split_index` is not below it.
    pub fn for_split(
        num_vertices: usize,
        split_index: usize,
        num_splits: usize,
    ) -> Result<Self, GraphError> {
        if num_splits == 0 {
            return Err(GraphError::InvalidRange("split count must be positive".into()));
        }
        if split_index >= num_splits {
            return Err(GraphError::InvalidRange(format!(
                "split {split_index} out of {num_splits}"
            )));
        }
        let split_size = num_vertices / num_splits;
        let start = split_index * split_size;
        let end = if split_index + 1 == num_splits {
            num_vertices
        } else {
            start + split_size
        };
        Ok(Self { start, end })
    }

    /// Number of vertices in the range.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the range selects no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An obstacle graph together with its visibility graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisGraph {
    graph: Graph,
    visgraph: Graph,
}

impl VisGraph {
    /// Build the full visibility graph of `rings`.
    ///
    /// Each ring is an ordered polygon boundary; a closing vertex equal
    /// to the first is dropped. Rings of one or two vertices become
    /// free obstacles without a polygon id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::WorkerPool`] if `config.worker_count > 1`
    /// and the thread pool cannot be started.
    pub fn build(rings: &[Vec<Point>], config: &BuildConfig) -> Result<Self, GraphError> {
        let graph = Graph::from_rings(rings);
        let points = graph.points().to_vec();
        tracing::info!(
            vertices = points.len(),
            obstacle_edges = graph.edge_count(),
            polygons = graph.polygon_count(),
            "building visibility graph"
        );
        let visgraph = sweep(&graph, &points, config)?;
        tracing::info!(visibility_edges = visgraph.edge_count(), "visibility graph built");
        Ok(Self { graph, visgraph })
    }

    /// Build the part of the visibility graph swept from the vertices in
    /// `range` of a seeded shuffle of the graph's vertex list.
    ///
    /// Shards built with the same rings and seed over ranges that cover
    /// every vertex merge into the graph [`build`](Self::build) returns.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidRange`] if `range` does not fit the
    /// vertex count, or [`GraphError::WorkerPool`] as for `build`.
    pub fn build_shuffled_range(
        rings: &[Vec<Point>],
        range: VertexRange,
        seed: u64,
        config: &BuildConfig,
    ) -> Result<Self, GraphError> {
        let graph = Graph::from_rings(rings);
        let vertex_count = graph.point_count();
        if range.start > range.end || range.end > vertex_count {
            return Err(GraphError::InvalidRange(format!(
                "[{}, {}) over {vertex_count} vertices",
                range.start, range.end
            )));
        }

        let mut order = graph.points().to_vec();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        tracing::info!(
            vertices = vertex_count,
            start = range.start,
            end = range.end,
            seed,
            "building visibility graph shard"
        );
        let visgraph = sweep(&graph, &order[range.start..range.end], config)?;
        tracing::info!(visibility_edges = visgraph.edge_count(), "visibility graph shard built");
        Ok(Self { graph, visgraph })
    }

    /// Reassemble a graph from its two halves.
    #[must_use]
    pub const fn from_parts(graph: Graph, visgraph: Graph) -> Self {
        Self { graph, visgraph }
    }

    /// Split into the obstacle graph and the visibility graph.
    #[must_use]
    pub fn into_parts(self) -> (Graph, Graph) {
        (self.graph, self.visgraph)
    }

    /// The obstacle graph.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The visibility graph.
    #[must_use]
    pub const fn visgraph(&self) -> &Graph {
        &self.visgraph
    }

    /// Vertices of the obstacle graph visible from `point`.
    #[must_use]
    pub fn find_visible(&self, point: Point) -> Vec<Point> {
        visible_vertices(point, &self.graph, None, None, Scan::Full)
    }

    /// Add the visibility edges of each of `points` to the visibility
    /// graph. `origin` and `destination` are tested as extra candidates.
    pub fn update(&mut self, points: &[Point], origin: Option<Point>, destination: Option<Point>) {
        for &point in points {
            for visible in visible_vertices(point, &self.graph, origin, destination, Scan::Full) {
                self.visgraph.add_edge(Edge::new(point, visible));
            }
        }
    }

    /// Shortest obstacle-avoiding path from `origin` to `destination`.
    ///
    /// Endpoints that are not vertices of the visibility graph are
    /// connected through temporary edges that are discarded afterwards.
    ///
    /// # Errors
    ///
    /// See [`search::shortest_path`].
    pub fn shortest_path(
        &self,
        origin: Point,
        destination: Point,
        options: &SearchOptions,
    ) -> Result<Vec<Point>, RouteError> {
        let origin_known = self.visgraph.contains_point(origin);
        let destination_known = self.visgraph.contains_point(destination);
        if origin_known && destination_known {
            return search::shortest_path(&self.visgraph, origin, destination, None, options);
        }

        let mut augmentation = Graph::new();
        if !origin_known {
            let extra = (!destination_known).then_some(destination);
            for visible in visible_vertices(origin, &self.graph, None, extra, Scan::Full) {
                augmentation.add_edge(Edge::new(origin, visible));
            }
        }
        if !destination_known {
            let extra = (!origin_known).then_some(origin);
            for visible in visible_vertices(destination, &self.graph, extra, None, Scan::Full) {
                augmentation.add_edge(Edge::new(destination, visible));
            }
        }
        search::shortest_path(&self.visgraph, origin, destination, Some(&augmentation), options)
    }

    /// [`shortest_path`](Self::shortest_path) for each pair, in parallel.
    /// Results are in input order.
    #[must_use]
    pub fn shortest_paths(
        &self,
        pairs: &[(Point, Point)],
        options: &SearchOptions,
    ) -> Vec<Result<Vec<Point>, RouteError>> {
        pairs
            .par_iter()
            .map(|&(origin, destination)| self.shortest_path(origin, destination, options))
            .collect()
    }

    /// The first polygon, by ascending id, whose interior contains
    /// `point`.
    #[must_use]
    pub fn point_in_polygon(&self, point: Point) -> Option<PolygonId> {
        geometry::point_in_polygon(point, &self.graph)
    }

    /// Nearest point just outside polygon `polygon_id` from `point`,
    /// which is assumed to lie inside it.
    ///
    /// # Errors
    ///
    /// See [`geometry::closest_point`].
    pub fn closest_point(
        &self,
        point: Point,
        polygon_id: PolygonId,
        length: f64,
    ) -> Result<Point, GraphError> {
        geometry::closest_point(point, &self.graph, polygon_id, length)
    }
}

/// Half-scan every point in `points` against `graph` and collect the
/// resulting edges into a fresh visibility graph.
///
/// Batches are swept on a rayon pool when `worker_count > 1`, but the
/// edges are always merged on the calling thread in batch order.
fn sweep(graph: &Graph, points: &[Point], config: &BuildConfig) -> Result<Graph, GraphError> {
    let batch_size = config.batch_size.max(1);
    let sweep_batch = |batch: &[Point]| -> Vec<Edge> {
        let edges: Vec<Edge> = batch
            .iter()
            .flat_map(|&point| {
                visible_vertices(point, graph, None, None, Scan::Half)
                    .into_iter()
                    .map(move |visible| Edge::new(point, visible))
            })
            .collect();
        tracing::debug!(vertices = batch.len(), edges = edges.len(), "batch swept");
        edges
    };

    let batches: Vec<Vec<Edge>> = if config.worker_count <= 1 {
        points.chunks(batch_size).map(sweep_batch).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_count)
            .build()?;
        pool.install(|| points.par_chunks(batch_size).map(sweep_batch).collect())
    };

    let mut visgraph = Graph::new();
    for edge in batches.into_iter().flatten() {
        visgraph.add_edge(edge);
    }
    Ok(visgraph)
}
