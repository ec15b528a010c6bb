//! A* over a visibility graph.
//!
//! The frontier is a binary heap with lazy invalidation: relaxing a
//! node pushes a fresh entry and records its priority, and a popped
//! entry whose priority no longer matches the recorded one is skipped.
//! Entries with equal priority pop in order of the node's
//! [`tie_break_key`](Point::tie_break_key), so results are stable
//! across runs.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::geometry::euclidean_distance;
use crate::graph::Graph;
use crate::types::{Point, RouteError, SearchOptions};

/// Frontier entry, ordered so the heap pops the lowest priority first.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    priority: f64,
    key: u64,
    point: Point,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.key.cmp(&self.key))
    }
}

/// Shortest path from `origin` to `destination` through `visgraph`,
/// optionally extended by the temporary edges in `augmentation`.
///
/// Returns the path as an ordered list of points starting at `origin`
/// and ending at `destination`.
///
/// # Errors
///
/// Returns [`RouteError::DistanceLimitExceeded`] if the frontier
/// emptied after nodes beyond `options.distance_limit` were pruned,
/// and [`RouteError::PathNotFound`] if it emptied otherwise.
pub fn shortest_path(
    visgraph: &Graph,
    origin: Point,
    destination: Point,
    augmentation: Option<&Graph>,
    options: &SearchOptions,
) -> Result<Vec<Point>, RouteError> {
    if origin == destination {
        return Ok(vec![origin]);
    }

    let mut frontier = BinaryHeap::new();
    let mut best_priority: HashMap<Point, f64> = HashMap::new();
    let mut cost_so_far: HashMap<Point, f64> = HashMap::new();
    let mut came_from: HashMap<Point, Point> = HashMap::new();
    let mut pruned = false;
    let mut expanded = 0usize;

    frontier.push(Frontier {
        priority: 0.0,
        key: origin.tie_break_key(),
        point: origin,
    });
    best_priority.insert(origin, 0.0);
    cost_so_far.insert(origin, 0.0);

    while let Some(entry) = frontier.pop() {
        // Stale entries were superseded by a later relaxation.
        match best_priority.get(&entry.point) {
            Some(&recorded) if recorded.total_cmp(&entry.priority) == Ordering::Equal => {
                best_priority.remove(&entry.point);
            }
            _ => continue,
        }

        let current = entry.point;
        if current == destination {
            tracing::debug!(expanded, "path found");
            return Ok(reconstruct(&came_from, origin, destination));
        }

        let current_cost = cost_so_far.get(&current).copied().unwrap_or(f64::INFINITY);
        if current_cost > options.distance_limit {
            pruned = true;
            continue;
        }
        expanded += 1;

        let neighbours = visgraph
            .incident_edges(current)
            .iter()
            .chain(augmentation.map_or(&[][..], |graph| graph.incident_edges(current)));
        for edge in neighbours {
            let next = edge.adjacent(current);
            let new_cost = current_cost + euclidean_distance(current, next);
            let improves = cost_so_far.get(&next).is_none_or(|&known| new_cost < known);
            if !improves {
                continue;
            }
            cost_so_far.insert(next, new_cost);
            came_from.insert(next, current);
            let priority = new_cost + options.greediness * euclidean_distance(next, destination);
            best_priority.insert(next, priority);
            frontier.push(Frontier {
                priority,
                key: next.tie_break_key(),
                point: next,
            });
        }
    }

    tracing::debug!(expanded, pruned, "frontier exhausted");
    if pruned {
        Err(RouteError::DistanceLimitExceeded {
            origin,
            destination,
            limit: options.distance_limit,
        })
    } else {
        Err(RouteError::PathNotFound {
            origin,
            destination,
        })
    }
}

/// Walk back-pointers from `destination` to `origin`.
fn reconstruct(came_from: &HashMap<Point, Point>, origin: Point, destination: Point) -> Vec<Point> {
    let mut path = vec![destination];
    let mut current = destination;
    while current != origin {
        match came_from.get(&current) {
            Some(&previous) => {
                path.push(previous);
                current = previous;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Edge;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn graph_of(edges: &[((f64, f64), (f64, f64))]) -> Graph {
        let mut graph = Graph::new();
        for &((x1, y1), (x2, y2)) in edges {
            graph.add_edge(Edge::new(pt(x1, y1), pt(x2, y2)));
        }
        graph
    }

    #[test]
    fn prefers_the_shorter_branch() {
        // Two routes from (0,0) to (4,0): via (2,1) or via (2,5).
        let graph = graph_of(&[
            ((0.0, 0.0), (2.0, 1.0)),
            ((2.0, 1.0), (4.0, 0.0)),
            ((0.0, 0.0), (2.0, 5.0)),
            ((2.0, 5.0), (4.0, 0.0)),
        ]);
        let path = shortest_path(&graph, pt(0.0, 0.0), pt(4.0, 0.0), None, &SearchOptions::default())
            .unwrap();
        assert_eq!(path, vec![pt(0.0, 0.0), pt(2.0, 1.0), pt(4.0, 0.0)]);
    }

    #[test]
    fn origin_equal_to_destination() {
        let graph = graph_of(&[((0.0, 0.0), (1.0, 0.0))]);
        let path = shortest_path(&graph, pt(1.0, 0.0), pt(1.0, 0.0), None, &SearchOptions::default())
            .unwrap();
        assert_eq!(path, vec![pt(1.0, 0.0)]);
    }

    #[test]
    fn uses_augmentation_edges() {
        let visgraph = graph_of(&[((1.0, 0.0), (2.0, 0.0))]);
        let augmentation = graph_of(&[((0.0, 0.0), (1.0, 0.0)), ((2.0, 0.0), (3.0, 0.0))]);
        let path = shortest_path(
            &visgraph,
            pt(0.0, 0.0),
            pt(3.0, 0.0),
            Some(&augmentation),
            &SearchOptions::default(),
        )
        .unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.first(), Some(&pt(0.0, 0.0)));
        assert_eq!(path.last(), Some(&pt(3.0, 0.0)));
    }

    #[test]
    fn disconnected_destination_is_not_found() {
        let graph = graph_of(&[((0.0, 0.0), (1.0, 0.0)), ((5.0, 5.0), (6.0, 5.0))]);
        let err = shortest_path(&graph, pt(0.0, 0.0), pt(6.0, 5.0), None, &SearchOptions::default())
            .unwrap_err();
        assert!(matches!(err, RouteError::PathNotFound { .. }), "{err}");
    }

    #[test]
    fn distance_limit_prunes() {
        let graph = graph_of(&[
            ((0.0, 0.0), (1.0, 0.0)),
            ((1.0, 0.0), (2.0, 0.0)),
            ((2.0, 0.0), (3.0, 0.0)),
        ]);
        let options = SearchOptions {
            distance_limit: 1.5,
            ..SearchOptions::default()
        };
        let err = shortest_path(&graph, pt(0.0, 0.0), pt(3.0, 0.0), None, &options).unwrap_err();
        assert!(
            matches!(err, RouteError::DistanceLimitExceeded { limit, .. } if (limit - 1.5).abs() < f64::EPSILON),
            "{err}"
        );
    }

    #[test]
    fn limit_beyond_path_length_still_finds_it() {
        let graph = graph_of(&[((0.0, 0.0), (1.0, 0.0)), ((1.0, 0.0), (2.0, 0.0))]);
        let options = SearchOptions {
            distance_limit: 5.0,
            ..SearchOptions::default()
        };
        let path = shortest_path(&graph, pt(0.0, 0.0), pt(2.0, 0.0), None, &options).unwrap();
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn greedy_search_still_reaches_destination() {
        let graph = graph_of(&[
            ((0.0, 0.0), (1.0, 3.0)),
            ((1.0, 3.0), (4.0, 0.0)),
            ((0.0, 0.0), (2.0, -1.0)),
            ((2.0, -1.0), (4.0, 0.0)),
        ]);
        let options = SearchOptions {
            greediness: 3.0,
            ..SearchOptions::default()
        };
        let path = shortest_path(&graph, pt(0.0, 0.0), pt(4.0, 0.0), None, &options).unwrap();
        assert_eq!(path.first(), Some(&pt(0.0, 0.0)));
        assert_eq!(path.last(), Some(&pt(4.0, 0.0)));
    }

    #[test]
    fn frontier_pops_lowest_priority_first() {
        let mut heap = BinaryHeap::new();
        for (priority, x) in [(3.0, 3.0), (1.0, 1.0), (2.0, 2.0)] {
            heap.push(Frontier {
                priority,
                key: pt(x, 0.0).tie_break_key(),
                point: pt(x, 0.0),
            });
        }
        let order: Vec<f64> = std::iter::from_fn(|| heap.pop()).map(|f| f.priority).collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0]);
    }
}
