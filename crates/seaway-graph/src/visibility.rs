//! Rotational-sweep visibility.
//!
//! For a query point, sort every vertex by angle (then distance)
//! around it and sweep a ray through them in order, maintaining the
//! obstacle edges the ray currently crosses in an [`OpenEdges`]. A
//! vertex is visible when the nearest open edge does not block the
//! segment to it.
//!
//! Runs of vertices collinear with the query point inherit visibility
//! from the previous vertex in the run: once one is hidden, the rest
//! are, and a visible one only passes visibility on if nothing crosses
//! the gap between them.

use std::cmp::Ordering;
use std::f64::consts::PI;

use crate::geometry::{
    INF, angle, edge_in_polygon, euclidean_distance, on_segment, orientation, segments_intersect,
};
use crate::graph::Graph;
use crate::open_edges::OpenEdges;
use crate::types::{Orientation, Point, Scan};

/// Vertices of `graph` visible from `point`, in sweep order.
///
/// `origin` and `destination` are extra candidates tested alongside
/// the graph's vertices without being added to it, so a query point
/// can learn whether it sees the other endpoint directly.
#[must_use]
pub fn visible_vertices(
    point: Point,
    graph: &Graph,
    origin: Option<Point>,
    destination: Option<Point>,
    scan: Scan,
) -> Vec<Point> {
    let mut candidates: Vec<(f64, f64, Point)> = graph
        .points()
        .iter()
        .copied()
        .chain(origin)
        .chain(destination)
        .map(|p| (angle(point, p), euclidean_distance(point, p), p))
        .collect();
    candidates.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
    });

    // Seed with the edges crossing the initial ray toward +x.
    let mut open_edges = OpenEdges::new();
    let ray_end = Point::new(INF, point.y);
    for edge in graph.edges() {
        if edge.contains(point) || !segments_intersect(point, ray_end, edge) {
            continue;
        }
        if on_segment(point, edge.p1, ray_end) || on_segment(point, edge.p2, ray_end) {
            continue;
        }
        open_edges.insert(point, ray_end, *edge);
    }

    let mut visible = Vec::new();
    let mut prev: Option<(Point, bool)> = None;

    for &(sweep_angle, _, candidate) in &candidates {
        if candidate == point {
            continue;
        }
        if scan == Scan::Half && sweep_angle > PI {
            break;
        }

        // Edges rotating behind the ray leave the open set.
        if !open_edges.is_empty() {
            for edge in graph.incident_edges(candidate) {
                if orientation(point, candidate, edge.adjacent(candidate)) == Orientation::Clockwise {
                    open_edges.delete(point, candidate, edge);
                }
            }
        }

        let mut is_visible = match prev {
            Some((prev_point, prev_visible))
                if orientation(point, prev_point, candidate) == Orientation::Collinear
                    && on_segment(point, prev_point, candidate) =>
            {
                prev_visible
                    && !open_edges.iter().any(|edge| {
                        !edge.contains(prev_point) && segments_intersect(prev_point, candidate, edge)
                    })
                    && !edge_in_polygon(prev_point, candidate, graph)
            }
            _ => open_edges
                .smallest()
                .is_none_or(|nearest| !segments_intersect(point, candidate, nearest)),
        };

        // A chord through the interior of its own polygon is hidden,
        // unless it is one of the polygon's sides.
        if is_visible && !graph.is_adjacent(point, candidate) {
            is_visible = !edge_in_polygon(point, candidate, graph);
        }

        if is_visible {
            visible.push(candidate);
        }

        // Edges rotating into view join the open set.
        for edge in graph.incident_edges(candidate) {
            if !edge.contains(point)
                && orientation(point, candidate, edge.adjacent(candidate))
                    == Orientation::CounterClockwise
            {
                open_edges.insert(point, candidate, *edge);
            }
        }

        prev = Some((candidate, is_visible));
    }

    visible
}
