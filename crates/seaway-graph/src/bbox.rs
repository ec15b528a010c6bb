//! Longitude/latitude axis-aligned boxes.

use geo::Intersects;
use serde::{Deserialize, Serialize};

use crate::meridian::{CoordinateTransform, MeridianWrap};
use crate::types::Coordinate;

/// A box given by its upper-left and lower-right corners.
///
/// The other two corners are derived: upper-right takes the lower-right
/// longitude and the upper-left latitude, lower-left the reverse. A box
/// whose upper-left longitude exceeds its lower-right longitude spans
/// the antimeridian; queries wrap it together with their operands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisAlignedBox {
    upper_left: Coordinate,
    lower_right: Coordinate,
}

impl AxisAlignedBox {
    /// Box from its upper-left and lower-right corners.
    #[must_use]
    pub const fn new(top_left: Coordinate, bottom_right: Coordinate) -> Self {
        Self {
            upper_left: top_left,
            lower_right: bottom_right,
        }
    }

    /// Box spanned by two diagonally opposite corners, in either order.
    #[must_use]
    pub fn from_corners(a: Coordinate, b: Coordinate) -> Self {
        Self::new(
            Coordinate::new(a.longitude.min(b.longitude), a.latitude.max(b.latitude)),
            Coordinate::new(a.longitude.max(b.longitude), a.latitude.min(b.latitude)),
        )
    }

    /// Smallest box containing both endpoints of a segment, grown by
    /// `margin` degrees on every side. No antimeridian handling.
    #[must_use]
    pub fn around_segment(a: Coordinate, b: Coordinate, margin: f64) -> Self {
        Self::new(
            Coordinate::new(
                a.longitude.min(b.longitude) - margin,
                a.latitude.max(b.latitude) + margin,
            ),
            Coordinate::new(
                a.longitude.max(b.longitude) + margin,
                a.latitude.min(b.latitude) - margin,
            ),
        )
    }

    /// North-west corner.
    #[must_use]
    pub const fn upper_left(&self) -> Coordinate {
        self.upper_left
    }

    /// North-east corner.
    #[must_use]
    pub const fn upper_right(&self) -> Coordinate {
        Coordinate::new(self.lower_right.longitude, self.upper_left.latitude)
    }

    /// South-east corner.
    #[must_use]
    pub const fn lower_right(&self) -> Coordinate {
        self.lower_right
    }

    /// South-west corner.
    #[must_use]
    pub const fn lower_left(&self) -> Coordinate {
        Coordinate::new(self.upper_left.longitude, self.lower_right.latitude)
    }

    /// Corners in ring order: upper-left, upper-right, lower-right,
    /// lower-left.
    #[must_use]
    pub const fn vertices(&self) -> [Coordinate; 4] {
        [
            self.upper_left(),
            self.upper_right(),
            self.lower_right(),
            self.lower_left(),
        ]
    }

    /// Whether `point` lies strictly inside the box.
    #[must_use]
    pub fn is_point_inside(&self, point: Coordinate) -> bool {
        let wrapped = MeridianWrap.wrap(&[self.upper_left, self.lower_right, point]);
        let [upper_left, lower_right, point] = [wrapped[0], wrapped[1], wrapped[2]];
        upper_left.longitude < point.longitude
            && point.longitude < lower_right.longitude
            && lower_right.latitude < point.latitude
            && point.latitude < upper_left.latitude
    }

    /// Whether the segment `a -> b` touches or enters the box.
    #[must_use]
    pub fn line_intersects(&self, a: Coordinate, b: Coordinate) -> bool {
        let mut operands = self.vertices().to_vec();
        operands.push(a);
        operands.push(b);
        let wrapped = MeridianWrap.wrap(&operands);
        let (corners, ends) = wrapped.split_at(4);
        to_geo_polygon(corners).intersects(&geo::Line::new(to_geo(ends[0]), to_geo(ends[1])))
    }
}

pub(crate) fn to_geo(c: Coordinate) -> geo::Coord<f64> {
    geo::coord! { x: c.longitude, y: c.latitude }
}

pub(crate) fn to_geo_polygon(ring: &[Coordinate]) -> geo::Polygon<f64> {
    geo::Polygon::new(
        geo::LineString::new(ring.iter().copied().map(to_geo).collect()),
        Vec::new(),
    )
}
