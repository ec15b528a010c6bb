//! seaway-graph: Visibility graphs and sea routes (sans-IO).
//!
//! Builds a visibility graph over polygon obstacles (coastlines) with a
//! rotational plane sweep, then answers shortest-path queries with A*
//! over that graph plus the query endpoints. Routes near the
//! antimeridian are handled by a second graph built in a frame rotated
//! by 90° of longitude.
//!
//! Also included: merging of sharded builds, a compact binary encoding,
//! and a polygon clipper for cropping coastlines to a bounding box.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! rings and graphs. Reading coastline files and writing graph files
//! lives in `seaway-io`.

pub mod bbox;
pub mod builder;
pub mod clip;
pub mod diagnostics;
pub mod geometry;
pub mod graph;
pub mod interpolate;
pub mod merge;
pub mod meridian;
pub mod open_edges;
pub mod persist;
pub mod polygon;
pub mod search;
pub mod spatial_index;
pub mod types;
pub mod visibility;

pub use bbox::AxisAlignedBox;
pub use builder::{VertexRange, VisGraph};
pub use clip::PolygonClipper;
pub use diagnostics::{BuildDiagnostics, Clock};
pub use graph::Graph;
pub use interpolate::{InterpolateOptions, PathInterpolator};
pub use merge::merge_graphs;
pub use meridian::{CoordinateTransform, GraphVariant, MeridianWrap};
pub use persist::PersistError;
pub use polygon::Polygon;
pub use spatial_index::{IntersectionPrechecker, PolygonSpatialIndex, RTreePolygonIndex};
pub use types::{
    BuildConfig, Coordinate, Edge, GeometryError, GraphError, Point, PolygonId, RouteError,
    SearchOptions,
};

/// Build a visibility graph from geographic rings.
///
/// Each ring is projected into `variant`'s frame and the result is
/// built with [`VisGraph::build`]. Rings should not repeat their first
/// vertex at the end.
///
/// # Errors
///
/// See [`VisGraph::build`].
pub fn build_from_coordinates(
    rings: &[Vec<Coordinate>],
    variant: GraphVariant,
    config: &BuildConfig,
) -> Result<VisGraph, GraphError> {
    VisGraph::build(&variant.project_rings(rings), config)
}
