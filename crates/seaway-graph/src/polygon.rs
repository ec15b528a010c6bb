//! Coordinate polygons used by the clipper and the spatial index.

use geo::Intersects;
use serde::{Deserialize, Serialize};

use crate::bbox::{AxisAlignedBox, to_geo};
use crate::meridian::{CoordinateTransform, MeridianWrap};
use crate::types::{Coordinate, GeometryError};

/// A simple polygon ring of at least three geographic vertices.
///
/// The ring is implicitly closed; the first vertex is not repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Coordinate>,
}

impl Polygon {
    /// Polygon from its ring of vertices.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegeneratePolygon`] for fewer than three
    /// vertices.
    pub fn new(vertices: Vec<Coordinate>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::DegeneratePolygon(vertices.len()));
        }
        Ok(Self { vertices })
    }

    /// Ring vertices in the order given.
    #[must_use]
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Consume the polygon, returning its vertices.
    #[must_use]
    pub fn into_vertices(self) -> Vec<Coordinate> {
        self.vertices
    }

    /// Whether the segment `a -> b` crosses or touches any edge of the
    /// ring. The polygon and the segment are wrapped jointly.
    #[must_use]
    pub fn line_intersects(&self, a: Coordinate, b: Coordinate) -> bool {
        let mut operands = self.vertices.clone();
        operands.push(a);
        operands.push(b);
        let wrapped = MeridianWrap.wrap(&operands);
        let (ring, ends) = wrapped.split_at(self.vertices.len());
        let segment = geo::Line::new(to_geo(ends[0]), to_geo(ends[1]));

        ring.iter()
            .zip(ring.iter().cycle().skip(1))
            .any(|(&p, &q)| geo::Line::new(to_geo(p), to_geo(q)).intersects(&segment))
    }

    /// Tightest box around the vertices, without antimeridian handling.
    #[must_use]
    pub fn bounding_box(&self) -> AxisAlignedBox {
        let (min_lon, max_lon, min_lat, max_lat) = self.vertices.iter().fold(
            (
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
            ),
            |(min_lon, max_lon, min_lat, max_lat), v| {
                (
                    min_lon.min(v.longitude),
                    max_lon.max(v.longitude),
                    min_lat.min(v.latitude),
                    max_lat.max(v.latitude),
                )
            },
        );
        AxisAlignedBox::new(
            Coordinate::new(min_lon, max_lat),
            Coordinate::new(max_lon, min_lat),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn c(lon: f64, lat: f64) -> Coordinate {
        Coordinate::new(lon, lat)
    }

    fn diamond() -> Polygon {
        Polygon::new(vec![c(0.0, 1.0), c(1.0, 0.0), c(0.0, -1.0), c(-1.0, 0.0)]).unwrap()
    }

    #[test]
    fn rejects_fewer_than_three_vertices() {
        assert_eq!(
            Polygon::new(vec![c(0.0, 0.0), c(1.0, 1.0)]),
            Err(GeometryError::DegeneratePolygon(2))
        );
        assert_eq!(Polygon::new(Vec::new()), Err(GeometryError::DegeneratePolygon(0)));
    }

    #[test]
    fn segment_crossing_an_edge() {
        assert!(diamond().line_intersects(c(-2.0, 0.5), c(2.0, 0.5)));
    }

    #[test]
    fn segment_touching_a_vertex() {
        assert!(diamond().line_intersects(c(1.0, 0.0), c(3.0, 0.0)));
    }

    #[test]
    fn segment_clear_of_the_ring() {
        assert!(!diamond().line_intersects(c(2.0, 2.0), c(3.0, -2.0)));
    }

    #[test]
    fn segment_wholly_inside_does_not_cross() {
        assert!(!diamond().line_intersects(c(-0.1, 0.0), c(0.1, 0.0)));
    }

    #[test]
    fn segment_across_antimeridian() {
        let island = Polygon::new(vec![c(179.5, 1.0), c(-179.5, 1.0), c(-179.5, -1.0), c(179.5, -1.0)])
            .unwrap();
        assert!(island.line_intersects(c(179.0, 0.0), c(-179.0, 0.0)));
        assert!(!island.line_intersects(c(179.0, 5.0), c(-179.0, 5.0)));
    }

    #[test]
    fn bounding_box_of_diamond() {
        let bx = diamond().bounding_box();
        assert_eq!(bx.upper_left(), c(-1.0, 1.0));
        assert_eq!(bx.lower_right(), c(1.0, -1.0));
    }
}
