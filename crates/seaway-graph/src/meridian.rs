//! Antimeridian handling.
//!
//! Geometry that straddles ±180° longitude is split in two in the flat
//! plane the kernel works in. [`wrap`] moves the negative-longitude
//! cluster up by 360° so a set of coordinates becomes contiguous, and
//! [`reverse_wrap`] undoes it. Operands of one geometric operation must
//! be wrapped together, so that cluster membership is decided jointly,
//! and the results reverse-wrapped together.
//!
//! The meridian graph variant is built in a frame rotated by 90° of
//! longitude, which moves the antimeridian into the interior of the
//! plane. [`shift_longitude`] and [`unshift_longitude`] map between the
//! two frames.

use serde::{Deserialize, Serialize};

use crate::types::{Coordinate, Point};

/// Longitude span at or above which a coordinate set is treated as
/// straddling the antimeridian.
pub const WRAP_SPAN: f64 = 180.0;

/// Full turn of longitude.
const PERIOD: f64 = 360.0;

/// A reversible coordinate transformation applied around flat-plane
/// geometry operations.
pub trait CoordinateTransform {
    /// Make `coords` contiguous in the plane.
    fn wrap(&self, coords: &[Coordinate]) -> Vec<Coordinate>;

    /// Map coordinates produced in the wrapped frame back.
    fn reverse_wrap(&self, coords: &[Coordinate]) -> Vec<Coordinate>;
}

/// The standard ±360° antimeridian wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeridianWrap;

impl CoordinateTransform for MeridianWrap {
    fn wrap(&self, coords: &[Coordinate]) -> Vec<Coordinate> {
        wrap(coords)
    }

    fn reverse_wrap(&self, coords: &[Coordinate]) -> Vec<Coordinate> {
        reverse_wrap(coords)
    }
}

/// Shift negative longitudes by +360° when `coords` span at least
/// 180° and contain both negative and non-negative longitudes.
/// Otherwise returns the input unchanged.
#[must_use]
pub fn wrap(coords: &[Coordinate]) -> Vec<Coordinate> {
    let (min, max) = coords.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(min, max), c| (min.min(c.longitude), max.max(c.longitude)),
    );
    if coords.is_empty() || max - min < WRAP_SPAN {
        return coords.to_vec();
    }

    let has_negative = coords.iter().any(|c| c.longitude < 0.0);
    let has_non_negative = coords.iter().any(|c| c.longitude >= 0.0);
    if !(has_negative && has_non_negative) {
        return coords.to_vec();
    }

    coords
        .iter()
        .map(|c| {
            if c.longitude < 0.0 {
                Coordinate::new(c.longitude + PERIOD, c.latitude)
            } else {
                *c
            }
        })
        .collect()
}

/// Shift longitudes at or above 180° by -360°, but only when some
/// longitudes lie below 180°. A set lying entirely at or above 180° is
/// returned unchanged.
#[must_use]
pub fn reverse_wrap(coords: &[Coordinate]) -> Vec<Coordinate> {
    let has_high = coords.iter().any(|c| c.longitude >= WRAP_SPAN);
    let has_low = coords.iter().any(|c| c.longitude < WRAP_SPAN);
    if !(has_high && has_low) {
        return coords.to_vec();
    }

    coords
        .iter()
        .map(|c| {
            if c.longitude >= WRAP_SPAN {
                Coordinate::new(c.longitude - PERIOD, c.latitude)
            } else {
                *c
            }
        })
        .collect()
}

/// Longitude in the meridian graph's frame: rotated by +90° and
/// normalized into [-180, 180).
#[must_use]
pub fn shift_longitude(longitude: f64) -> f64 {
    (longitude + 270.0).rem_euclid(PERIOD) - 180.0
}

/// Inverse of [`shift_longitude`].
#[must_use]
pub fn unshift_longitude(longitude: f64) -> f64 {
    (longitude + 90.0).rem_euclid(PERIOD) - 180.0
}

/// [`shift_longitude`] applied to a coordinate.
#[must_use]
pub fn shift(coord: Coordinate) -> Coordinate {
    Coordinate::new(shift_longitude(coord.longitude), coord.latitude)
}

/// [`unshift_longitude`] applied to a coordinate.
#[must_use]
pub fn unshift(coord: Coordinate) -> Coordinate {
    Coordinate::new(unshift_longitude(coord.longitude), coord.latitude)
}

/// Which frame a graph was built in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GraphVariant {
    /// Longitudes as given.
    #[default]
    Default,
    /// Longitudes rotated with [`shift_longitude`].
    Meridian,
}

impl GraphVariant {
    /// Planar point for `coord` in this frame.
    #[must_use]
    pub fn project(self, coord: Coordinate) -> Point {
        match self {
            Self::Default => coord.to_point(),
            Self::Meridian => shift(coord).to_point(),
        }
    }

    /// Geographic coordinate of a point in this frame.
    #[must_use]
    pub fn unproject(self, point: Point) -> Coordinate {
        match self {
            Self::Default => Coordinate::from(point),
            Self::Meridian => unshift(Coordinate::from(point)),
        }
    }

    /// Project every vertex of every ring.
    #[must_use]
    pub fn project_rings(self, rings: &[Vec<Coordinate>]) -> Vec<Vec<Point>> {
        rings
            .iter()
            .map(|ring| ring.iter().map(|&c| self.project(c)).collect())
            .collect()
    }
}
