//! Shared types for visibility-graph construction and routing.
//!
//! [`Point`] is the planar type the graph and the geometry kernel work
//! in (x = longitude, y = latitude, possibly shifted past ±180 by the
//! antimeridian transformer). [`Coordinate`] is the geographic type
//! callers hand in and get back.

use std::hash::{Hash, Hasher};

use geo::line_measures::Distance;
use geo::Haversine;
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;

/// Tolerance for [`Point`] equality, per component.
pub const POINT_EPSILON: f64 = 1e-8;

/// Identifier of a polygon ring inside a [`Graph`](crate::graph::Graph).
///
/// Ids are assigned in input order, counting only rings with at least
/// three vertices.
pub type PolygonId = usize;

/// A vertex in the planar routing space.
///
/// Equality is tolerance-based (each component within
/// [`POINT_EPSILON`]) and ignores `polygon_id`. Hashing quantizes both
/// components onto a grid of the same pitch, so two points that compare
/// equal hash equally except when they straddle a grid boundary. That
/// residual mismatch is accepted; graph vertices come from the same
/// input rings and are bit-identical in practice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (longitude, possibly wrapped).
    pub x: f64,
    /// Vertical position (latitude).
    pub y: f64,
    /// The polygon ring this vertex belongs to, if that ring has at
    /// least three vertices.
    pub polygon_id: Option<PolygonId>,
}

impl Point {
    /// Create a free point that belongs to no polygon.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            polygon_id: None,
        }
    }

    /// Create a point tagged with the polygon it belongs to.
    #[must_use]
    pub const fn with_polygon(x: f64, y: f64, polygon_id: PolygonId) -> Self {
        Self {
            x,
            y,
            polygon_id: Some(polygon_id),
        }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }

    /// Grid cell used for hashing.
    #[allow(clippy::cast_possible_truncation)]
    fn grid_key(self) -> (i64, i64) {
        (
            (self.x / POINT_EPSILON).round() as i64,
            (self.y / POINT_EPSILON).round() as i64,
        )
    }

    /// Stable 64-bit key used to break ties between points whose
    /// priorities are equal.
    ///
    /// Uses SipHash-1-3 with fixed keys so the value is identical
    /// across runs and platforms.
    #[must_use]
    pub fn tie_break_key(self) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(0, 0);
        self.grid_key().hash(&mut hasher);
        hasher.finish()
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < POINT_EPSILON && (self.y - other.y).abs() < POINT_EPSILON
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.grid_key().hash(state);
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.8}, {:.8})", self.x, self.y)
    }
}

/// An undirected edge between two points.
///
/// `Edge::new(a, b) == Edge::new(b, a)`, and both hash the same.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edge {
    /// First endpoint.
    pub p1: Point,
    /// Second endpoint.
    pub p2: Point,
}

impl Edge {
    /// Create an edge between two points.
    #[must_use]
    pub const fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// The endpoint opposite `point`.
    ///
    /// If `point` is not an endpoint, `p1` is returned.
    #[must_use]
    pub fn adjacent(&self, point: Point) -> Point {
        if point == self.p1 { self.p2 } else { self.p1 }
    }

    /// Whether `point` is one of the two endpoints.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.p1 == point || self.p2 == point
    }

    /// Euclidean length of the edge.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.p1 == other.p1 && self.p2 == other.p2) || (self.p1 == other.p2 && self.p2 == other.p1)
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let a = self.p1.grid_key();
        let b = self.p2.grid_key();
        if a <= b {
            (a, b).hash(state);
        } else {
            (b, a).hash(state);
        }
    }
}

/// Result of the signed-area orientation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Counter-clockwise turn.
    CounterClockwise,
    /// Clockwise turn.
    Clockwise,
    /// The three points lie on one line (after truncation).
    Collinear,
}

/// How far around the query point the visibility sweep travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scan {
    /// Sweep the full circle.
    #[default]
    Full,
    /// Stop once the sweep angle passes π.
    ///
    /// Only valid when every vertex is swept, because each undirected
    /// edge is then discovered from one of its two endpoints.
    Half,
}

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
}

impl Coordinate {
    /// Create a coordinate without range normalization.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Create a coordinate folded into longitude `[-180, 180)` and
    /// latitude `[-90, 90)` by modular wrap.
    #[must_use]
    pub fn normalized(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude: (longitude + 180.0).rem_euclid(360.0) - 180.0,
            latitude: (latitude + 90.0).rem_euclid(180.0) - 90.0,
        }
    }

    /// Great-circle distance in meters on a spherical Earth.
    #[must_use]
    pub fn haversine_distance(self, other: Self) -> f64 {
        Haversine.distance(
            geo::Point::new(self.longitude, self.latitude),
            geo::Point::new(other.longitude, other.latitude),
        )
    }

    /// Planar point with x = longitude and y = latitude.
    #[must_use]
    pub const fn to_point(self) -> Point {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<Point> for Coordinate {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

impl From<Coordinate> for Point {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.to_point()
    }
}

/// Sum of haversine hop lengths along a coordinate path, in meters.
#[must_use]
pub fn path_length(path: &[Coordinate]) -> f64 {
    path.windows(2)
        .map(|pair| pair[0].haversine_distance(pair[1]))
        .sum()
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for visibility-graph construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Number of worker threads that sweep vertex batches. `1` runs
    /// the sweep on the calling thread.
    pub worker_count: usize,

    /// Number of vertices each batch sweeps. Affects parallel
    /// granularity only, never the resulting graph.
    pub batch_size: usize,
}

impl BuildConfig {
    /// Default for [`worker_count`](Self::worker_count).
    pub const DEFAULT_WORKER_COUNT: usize = 1;
    /// Default for [`batch_size`](Self::batch_size).
    pub const DEFAULT_BATCH_SIZE: usize = 10;
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            worker_count: Self::DEFAULT_WORKER_COUNT,
            batch_size: Self::DEFAULT_BATCH_SIZE,
        }
    }
}

/// Settings for a single shortest-path query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Nodes whose accumulated cost from the origin exceeds this value
    /// are not expanded.
    pub distance_limit: f64,

    /// Heuristic weighting. Values above `1.0` trade optimality for
    /// fewer expansions.
    pub greediness: f64,
}

impl SearchOptions {
    /// Default for [`distance_limit`](Self::distance_limit): unbounded.
    pub const DEFAULT_DISTANCE_LIMIT: f64 = f64::INFINITY;
    /// Default for [`greediness`](Self::greediness): plain A*.
    pub const DEFAULT_GREEDINESS: f64 = 1.0;
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            distance_limit: Self::DEFAULT_DISTANCE_LIMIT,
            greediness: Self::DEFAULT_GREEDINESS,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Internal invariant violations and build failures.
///
/// These indicate a defect or invalid input and are not worth
/// retrying.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The requested polygon has no boundary edges in the graph.
    #[error("polygon {0} has no edges")]
    NoPolygonEdges(PolygonId),

    /// A boundary vertex had fewer than two incident edges, so no
    /// outward bisector exists.
    #[error("vertex {0} has fewer than two incident edges")]
    MissingBisector(Point),

    /// A sharded build was asked for an invalid range or split.
    #[error("invalid vertex range: {0}")]
    InvalidRange(String),

    /// The worker thread pool could not be created.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Recoverable routing failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    /// Every reachable vertex was expanded without reaching the
    /// destination.
    #[error("no path from {origin} to {destination}")]
    PathNotFound {
        /// Query origin.
        origin: Point,
        /// Query destination.
        destination: Point,
    },

    /// The search frontier emptied after pruning nodes beyond the
    /// distance limit.
    #[error("no path from {origin} to {destination} within distance {limit}")]
    DistanceLimitExceeded {
        /// Query origin.
        origin: Point,
        /// Query destination.
        destination: Point,
        /// The limit that pruned the search.
        limit: f64,
    },

    /// Snapping an endpoint off land failed.
    #[error("could not move {0} off land: {1}")]
    LandCorrection(Point, String),
}

/// Geometry validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// A polygon was given fewer than three vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),
}
