//! Merging separately built graphs.
//!
//! Shards from [`VisGraph::build_shuffled_range`] share their obstacle
//! graph and differ only in which visibility edges they swept, so the
//! union of the shards is the full visibility graph.

use std::collections::HashSet;

use crate::builder::VisGraph;
use crate::graph::Graph;
use crate::types::Edge;

/// Union of the obstacle and visibility edges of `graphs`.
///
/// Polygon boundaries are unioned by id. A polygon id that appears in
/// more than one input with different boundaries is logged and its
/// boundaries are unioned as well.
#[must_use]
pub fn merge_graphs(graphs: &[VisGraph]) -> VisGraph {
    let mut graph = Graph::new();
    let mut visgraph = Graph::new();

    for (shard, input) in graphs.iter().enumerate() {
        for edge in input.graph().edges() {
            graph.add_edge(*edge);
        }
        for (&id, edges) in input.graph().polygons() {
            let existing = graph.polygon_edges(id);
            if !existing.is_empty() && !same_edges(existing, edges) {
                tracing::warn!(polygon = id, shard, "conflicting polygon id while merging");
            }
            graph.extend_polygon(id, edges);
        }
        for edge in input.visgraph().edges() {
            visgraph.add_edge(*edge);
        }
    }

    tracing::info!(
        inputs = graphs.len(),
        vertices = graph.point_count(),
        visibility_edges = visgraph.edge_count(),
        "graphs merged"
    );
    VisGraph::from_parts(graph, visgraph)
}

fn same_edges(a: &[Edge], b: &[Edge]) -> bool {
    a.len() == b.len() && {
        let a: HashSet<&Edge> = a.iter().collect();
        b.iter().all(|edge| a.contains(edge))
    }
}
