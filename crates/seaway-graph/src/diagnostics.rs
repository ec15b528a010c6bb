//! Build diagnostics: timing and size metrics for a visibility graph.
//!
//! The library has no clock of its own. Callers pass a [`Clock`], so
//! the same code times builds natively and stays deterministic in
//! tests.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::collections::HashMap;
use std::time::Duration;

use petgraph::graph::UnGraph;
use serde::{Deserialize, Serialize};

use crate::builder::VisGraph;
use crate::graph::Graph;
use crate::types::{BuildConfig, GraphError, Point};

/// Source of timestamps for diagnostics.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Metrics describing one built graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildDiagnostics {
    /// Wall-clock build time (seconds). Zero when the graph was not
    /// built in this process.
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Vertices in the obstacle graph.
    pub vertex_count: usize,
    /// Polygon boundary and free edges in the obstacle graph.
    pub obstacle_edge_count: usize,
    /// Edges in the visibility graph.
    pub visibility_edge_count: usize,
    /// Rings with at least three vertices.
    pub polygon_count: usize,
    /// Sweep batches the build was split into.
    pub batch_count: usize,
    /// Connected components of the visibility graph, counting obstacle
    /// vertices that see nothing as singletons.
    pub component_count: usize,
}

impl BuildDiagnostics {
    /// Measure an existing graph.
    #[must_use]
    pub fn measure(graph: &VisGraph, duration: Duration, batch_count: usize) -> Self {
        Self {
            duration,
            vertex_count: graph.graph().point_count(),
            obstacle_edge_count: graph.graph().edge_count(),
            visibility_edge_count: graph.visgraph().edge_count(),
            polygon_count: graph.graph().polygon_count(),
            batch_count,
            component_count: component_count(graph.graph(), graph.visgraph()),
        }
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let rows = [
            ("Vertices", self.vertex_count),
            ("Polygons", self.polygon_count),
            ("Obstacle edges", self.obstacle_edge_count),
            ("Visibility edges", self.visibility_edge_count),
            ("Batches", self.batch_count),
            ("Components", self.component_count),
        ];

        let mut lines = Vec::new();
        lines.push(format!("Build Diagnostics Report\n{}", "=".repeat(40)));
        lines.push(format!(
            "Duration: {:.3}ms",
            self.duration.as_secs_f64() * 1000.0
        ));
        lines.push("-".repeat(40));
        for (name, value) in rows {
            lines.push(format!("{name:<24} {value:>12}"));
        }
        lines.join("\n")
    }
}

/// Build `rings` and measure the result.
///
/// # Errors
///
/// See [`VisGraph::build`].
pub fn build_with_diagnostics<C: Clock>(
    rings: &[Vec<Point>],
    config: &BuildConfig,
    clock: &C,
) -> Result<(VisGraph, BuildDiagnostics), GraphError> {
    let start = clock.now();
    let graph = VisGraph::build(rings, config)?;
    let duration = clock.elapsed(&start);
    let batch_count = graph
        .graph()
        .point_count()
        .div_ceil(config.batch_size.max(1));
    let diagnostics = BuildDiagnostics::measure(&graph, duration, batch_count);
    Ok((graph, diagnostics))
}

/// Components of the visibility graph over every obstacle vertex.
fn component_count(obstacles: &Graph, visgraph: &Graph) -> usize {
    let mut ungraph: UnGraph<(), ()> = UnGraph::new_undirected();
    let mut nodes = HashMap::new();
    for &point in obstacles.points().iter().chain(visgraph.points()) {
        nodes
            .entry(point)
            .or_insert_with(|| ungraph.add_node(()));
    }
    for edge in visgraph.edges() {
        if let (Some(&a), Some(&b)) = (nodes.get(&edge.p1), nodes.get(&edge.p2)) {
            ungraph.add_edge(a, b, ());
        }
    }
    petgraph::algo::connected_components(&ungraph)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Clock that advances a fixed step on every reading.
    struct StepClock {
        ticks: Cell<u64>,
        step: Duration,
    }

    impl Clock for StepClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            let now = self.now();
            self.step * u32::try_from(now - since).unwrap()
        }
    }

    fn squares() -> Vec<Vec<Point>> {
        let square = |x: f64| {
            vec![
                Point::new(x, 0.0),
                Point::new(x + 1.0, 0.0),
                Point::new(x + 1.0, 1.0),
                Point::new(x, 1.0),
            ]
        };
        vec![square(0.0), square(3.0)]
    }

    #[test]
    fn counts_match_the_graph() {
        let clock = StepClock {
            ticks: Cell::new(0),
            step: Duration::from_millis(5),
        };
        let config = BuildConfig {
            worker_count: 1,
            batch_size: 3,
        };
        let (graph, diagnostics) = build_with_diagnostics(&squares(), &config, &clock).unwrap();

        assert_eq!(diagnostics.duration, Duration::from_millis(5));
        assert_eq!(diagnostics.vertex_count, 8);
        assert_eq!(diagnostics.polygon_count, 2);
        assert_eq!(diagnostics.obstacle_edge_count, 8);
        assert_eq!(diagnostics.batch_count, 3);
        assert_eq!(
            diagnostics.visibility_edge_count,
            graph.visgraph().edge_count()
        );
        assert_eq!(diagnostics.component_count, 1);
    }

    #[test]
    fn isolated_vertices_are_separate_components() {
        // Without visibility edges every vertex stands alone.
        let rings = squares();
        let graph = VisGraph::from_parts(Graph::from_rings(&rings), Graph::new());
        let diagnostics = BuildDiagnostics::measure(&graph, Duration::ZERO, 0);
        assert_eq!(diagnostics.component_count, 8);
    }

    #[test]
    fn report_lists_counts() {
        let diagnostics = BuildDiagnostics {
            duration: Duration::from_millis(12),
            vertex_count: 8,
            obstacle_edge_count: 8,
            visibility_edge_count: 20,
            polygon_count: 2,
            batch_count: 1,
            component_count: 1,
        };
        let report = diagnostics.report();
        assert!(report.contains("Duration: 12.000ms"), "{report}");
        assert!(report.contains("Visibility edges"));
        assert!(report.contains("20"));
    }

    #[test]
    fn duration_serializes_as_seconds() {
        let diagnostics = BuildDiagnostics {
            duration: Duration::from_millis(1500),
            vertex_count: 0,
            obstacle_edge_count: 0,
            visibility_edge_count: 0,
            polygon_count: 0,
            batch_count: 0,
            component_count: 0,
        };
        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json["duration"], 1.5);
        let back: BuildDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back, diagnostics);
    }
}
