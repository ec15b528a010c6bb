//! Integration test: build graphs from coastline rings and route across them.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use seaway_graph::{
    BuildConfig, Coordinate, Edge, GraphVariant, InterpolateOptions, PathInterpolator, Point,
    SearchOptions, VertexRange, VisGraph, build_from_coordinates, geometry, merge_graphs, persist,
};

fn ring(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

/// Two islands and a reef (a free two-vertex obstacle).
fn archipelago() -> Vec<Vec<Point>> {
    vec![
        ring(&[(1.0, -2.0), (3.0, -2.0), (3.0, 2.0), (1.0, 2.0)]),
        ring(&[(5.0, -1.0), (7.0, 0.0), (5.0, 1.0)]),
        ring(&[(2.0, 4.0), (6.0, 4.5)]),
    ]
}

/// Whether `a -> b` is an obstacle edge, a visibility edge, or a
/// query edge from `origin` or `destination` to a vertex it sees.
fn is_known_edge(graph: &VisGraph, a: Point, b: Point, origin: Point, destination: Point) -> bool {
    let edge = Edge::new(a, b);
    if graph.visgraph().contains_edge(&edge) || graph.graph().contains_edge(&edge) {
        return true;
    }
    [origin, destination].into_iter().any(|endpoint| {
        edge.contains(endpoint) && graph.find_visible(endpoint).contains(&edge.adjacent(endpoint))
    })
}

#[test]
fn route_detours_through_obstacle_vertices() {
    let graph = VisGraph::build(&archipelago(), &BuildConfig::default()).unwrap();
    let origin = Point::new(0.0, 0.0);
    let destination = Point::new(8.0, 0.0);

    let path = graph
        .shortest_path(origin, destination, &SearchOptions::default())
        .expect("open water around the islands");

    assert_eq!(path.first(), Some(&origin));
    assert_eq!(path.last(), Some(&destination));
    assert!(path.len() > 2, "path cut through an island: {path:?}");
    for hop in &path[1..path.len() - 1] {
        assert!(graph.graph().contains_point(*hop), "{hop} is not a coastline vertex");
    }
    for pair in path.windows(2) {
        assert!(
            is_known_edge(&graph, pair[0], pair[1], origin, destination),
            "hop {} -> {} is neither an obstacle nor a visibility edge",
            pair[0],
            pair[1]
        );
        if !graph.graph().contains_edge(&Edge::new(pair[0], pair[1])) {
            assert!(!geometry::edge_in_polygon(pair[0], pair[1], graph.graph()));
        }
    }

    let length: f64 = path.windows(2).map(|w| w[0].distance(w[1])).sum();
    assert!(length > origin.distance(destination));
}

#[test]
fn endpoint_on_land_is_detected_and_moved_off() {
    let rings = vec![ring(&[(0.0, 0.0), (4.0, 0.0), (2.0, 4.0)])];
    let graph = VisGraph::build(&rings, &BuildConfig::default()).unwrap();
    let inland = Point::new(1.0, 0.5);

    let id = graph.point_in_polygon(inland).expect("inside the triangle");
    let moved = graph.closest_point(inland, id, 0.001).unwrap();

    assert_eq!(graph.point_in_polygon(moved), None);
    assert!((moved.x - 1.0).abs() < 1e-9);
    assert!(moved.y < 0.0 && moved.y > -0.01);
}

#[test]
fn sharded_build_merges_into_the_full_build() {
    let rings = archipelago();
    let config = BuildConfig {
        worker_count: 2,
        batch_size: 2,
    };
    let full = VisGraph::build(&rings, &config).unwrap();
    let vertices = full.graph().point_count();

    let shards: Vec<VisGraph> = (0..4)
        .map(|split| {
            let range = VertexRange::for_split(vertices, split, 4).unwrap();
            VisGraph::build_shuffled_range(&rings, range, 7, &config).unwrap()
        })
        .collect();

    assert_eq!(merge_graphs(&shards), full);
}

#[test]
fn decoded_graph_routes_like_the_encoded_one() {
    let graph = VisGraph::build(&archipelago(), &BuildConfig::default()).unwrap();
    let decoded = persist::from_bytes(&persist::to_bytes(&graph).unwrap()).unwrap();

    let options = SearchOptions::default();
    let a = Point::new(0.0, 0.0);
    let b = Point::new(8.0, 3.0);
    assert_eq!(
        decoded.shortest_path(a, b, &options).unwrap(),
        graph.shortest_path(a, b, &options).unwrap()
    );
}

#[test]
fn interpolator_crosses_the_antimeridian() {
    // An island straddling the antimeridian. In the default frame it
    // spans the whole plane, in the rotated frame it is two degrees wide.
    let island = vec![vec![
        Coordinate::new(179.0, -1.0),
        Coordinate::new(-179.0, -1.0),
        Coordinate::new(-179.0, 1.0),
        Coordinate::new(179.0, 1.0),
    ]];
    let config = BuildConfig::default();
    let default_graph = build_from_coordinates(&island, GraphVariant::Default, &config).unwrap();
    let meridian_graph = build_from_coordinates(&island, GraphVariant::Meridian, &config).unwrap();
    let interpolator = PathInterpolator::new(default_graph).with_meridian_graph(meridian_graph);

    let from = Coordinate::new(178.0, 0.0);
    let to = Coordinate::new(-178.0, 0.0);
    let path = interpolator
        .interpolate(from, to, &InterpolateOptions::default())
        .unwrap();

    assert_eq!(path.first(), Some(&from));
    assert_eq!(path.last(), Some(&to));
    // Over one corner pair of the island, not around the globe.
    assert_eq!(path.len(), 4);
    assert!(seaway_graph::types::path_length(&path) < 1_000_000.0);
    assert!(path.iter().all(|c| c.longitude.abs() > 170.0));
}
