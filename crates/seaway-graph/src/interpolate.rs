//! Sea routes between geographic coordinates.
//!
//! [`PathInterpolator`] routes on a default graph and, when one is
//! supplied, also on a meridian graph built in a frame rotated by 90°
//! of longitude. Routes that would wrap the antimeridian in the default
//! frame are ordinary routes in the rotated one.
//!
//! The two candidates are compared by the planar length each search
//! minimised. The rotation is a translation of the plane, so those
//! lengths are comparable. Great-circle length is not: a default-frame
//! hop from 178° to -178° is a 356° line in the plane but a 4° arc on
//! the sphere, and that arc is exactly the stretch the default graph
//! never checked for land.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::builder::VisGraph;
use crate::meridian::GraphVariant;
use crate::types::{Coordinate, Point, RouteError, SearchOptions};

/// Settings for [`PathInterpolator::interpolate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolateOptions {
    /// Search settings passed to every shortest-path query.
    pub search: SearchOptions,

    /// Move an endpoint that lies inside a polygon to just outside it
    /// before routing.
    pub correct_vertices_on_land: bool,

    /// How far outside the polygon a corrected endpoint is placed.
    pub closest_point_length: f64,
}

impl InterpolateOptions {
    /// Default for [`closest_point_length`](Self::closest_point_length).
    pub const DEFAULT_CLOSEST_POINT_LENGTH: f64 = 0.001;
}

impl Default for InterpolateOptions {
    fn default() -> Self {
        Self {
            search: SearchOptions::default(),
            correct_vertices_on_land: false,
            closest_point_length: Self::DEFAULT_CLOSEST_POINT_LENGTH,
        }
    }
}

/// Routes coordinate pairs over one or two prebuilt graphs.
#[derive(Debug, Clone)]
pub struct PathInterpolator {
    graph: VisGraph,
    meridian: Option<VisGraph>,
}

impl PathInterpolator {
    /// Interpolator over the default graph only.
    #[must_use]
    pub const fn new(graph: VisGraph) -> Self {
        Self {
            graph,
            meridian: None,
        }
    }

    /// Also route on `meridian`, a graph built from input shifted with
    /// [`shift`](crate::meridian::shift).
    #[must_use]
    pub fn with_meridian_graph(mut self, meridian: VisGraph) -> Self {
        self.meridian = Some(meridian);
        self
    }

    /// The default-frame graph.
    #[must_use]
    pub const fn graph(&self) -> &VisGraph {
        &self.graph
    }

    /// The rotated-frame graph, if one was supplied.
    #[must_use]
    pub const fn meridian_graph(&self) -> Option<&VisGraph> {
        self.meridian.as_ref()
    }

    /// Route from `from` to `to`.
    ///
    /// The returned path always starts at exactly `from` and ends at
    /// exactly `to`, even when an endpoint was moved off land for the
    /// search.
    ///
    /// # Errors
    ///
    /// Returns the default graph's [`RouteError`] if no graph yields a
    /// route.
    pub fn interpolate(
        &self,
        from: Coordinate,
        to: Coordinate,
        options: &InterpolateOptions,
    ) -> Result<Vec<Coordinate>, RouteError> {
        let direct = route_on(&self.graph, GraphVariant::Default, from, to, options);

        let best = match &self.meridian {
            None => direct?,
            Some(meridian_graph) => {
                let rotated = route_on(meridian_graph, GraphVariant::Meridian, from, to, options);
                match (direct, rotated) {
                    (Ok(a), Ok(b)) => {
                        if b.planar_length < a.planar_length {
                            b
                        } else {
                            a
                        }
                    }
                    (Ok(a), Err(_)) => a,
                    (Err(_), Ok(b)) => b,
                    (Err(e), Err(_)) => return Err(e),
                }
            }
        };

        Ok(pin_endpoints(best.path, from, to))
    }

    /// [`interpolate`](Self::interpolate) for each pair, in parallel.
    ///
    /// A pair that cannot be routed is logged and yields `None`.
    #[must_use]
    pub fn batch_interpolate(
        &self,
        pairs: &[(Coordinate, Coordinate)],
        options: &InterpolateOptions,
    ) -> Vec<Option<Vec<Coordinate>>> {
        pairs
            .par_iter()
            .map(|&(from, to)| match self.interpolate(from, to, options) {
                Ok(path) => Some(path),
                Err(err) => {
                    tracing::warn!(%err, "pair not routed");
                    None
                }
            })
            .collect()
    }
}

/// A route found in one graph's frame.
struct Route {
    /// The route in geographic coordinates.
    path: Vec<Coordinate>,
    /// Length of the route in the frame it was searched in.
    planar_length: f64,
}

fn route_on(
    graph: &VisGraph,
    variant: GraphVariant,
    from: Coordinate,
    to: Coordinate,
    options: &InterpolateOptions,
) -> Result<Route, RouteError> {
    let origin = variant.project(from);
    let destination = variant.project(to);
    let (origin, destination) = if options.correct_vertices_on_land {
        (
            off_land(graph, origin, options.closest_point_length)?,
            off_land(graph, destination, options.closest_point_length)?,
        )
    } else {
        (origin, destination)
    };
    let path = graph.shortest_path(origin, destination, &options.search)?;
    let planar_length = path.windows(2).map(|hop| hop[0].distance(hop[1])).sum();
    Ok(Route {
        path: path.into_iter().map(|p| variant.unproject(p)).collect(),
        planar_length,
    })
}

fn off_land(graph: &VisGraph, point: Point, length: f64) -> Result<Point, RouteError> {
    match graph.point_in_polygon(point) {
        None => Ok(point),
        Some(polygon_id) => {
            let corrected = graph
                .closest_point(point, polygon_id, length)
                .map_err(|err| RouteError::LandCorrection(point, err.to_string()))?;
            tracing::debug!(%point, %corrected, polygon_id, "moved endpoint off land");
            Ok(corrected)
        }
    }
}

/// Replace the path's ends with the caller's exact coordinates.
fn pin_endpoints(mut path: Vec<Coordinate>, from: Coordinate, to: Coordinate) -> Vec<Coordinate> {
    match path.len() {
        0 => vec![from, to],
        1 if from == to => vec![from],
        1 => vec![from, to],
        n => {
            path[0] = from;
            path[n - 1] = to;
            path
        }
    }
}
