//! Clipping polygons to an axis-aligned box.
//!
//! Each polygon edge is clipped with Cohen-Sutherland and the clipped
//! endpoints are concatenated into a new ring. Edges lying wholly
//! outside the box collapse onto its boundary, which leaves runs of
//! repeated vertices and straight-through vertices; these are filtered
//! out afterwards.

use crate::bbox::AxisAlignedBox;
use crate::meridian::{CoordinateTransform, MeridianWrap};
use crate::polygon::Polygon;
use crate::types::Coordinate;

/// Default tolerance for merging vertices and comparing gradients.
pub const DEFAULT_EPSILON: f64 = 1e-8;

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 1 << 1;
const BOTTOM: u8 = 1 << 2;
const TOP: u8 = 1 << 3;

/// Clips polygons against boxes, wrapping operands across the
/// antimeridian with `T`.
#[derive(Debug, Clone)]
pub struct PolygonClipper<T = MeridianWrap> {
    transform: T,
    epsilon: f64,
}

impl Default for PolygonClipper {
    fn default() -> Self {
        Self::new(MeridianWrap, DEFAULT_EPSILON)
    }
}

impl<T: CoordinateTransform> PolygonClipper<T> {
    /// Clipper with the given transform and vertex merge tolerance.
    pub const fn new(transform: T, epsilon: f64) -> Self {
        Self { transform, epsilon }
    }

    /// Clip one polygon. Returns `None` if fewer than three vertices
    /// survive.
    #[must_use]
    pub fn clip_single_polygon(&self, polygon: &Polygon, bx: &AxisAlignedBox) -> Option<Polygon> {
        let vertex_count = polygon.vertices().len();
        let mut operands = polygon.vertices().to_vec();
        operands.push(bx.upper_left());
        operands.push(bx.lower_right());
        let wrapped = self.transform.wrap(&operands);
        let (ring, corners) = wrapped.split_at(vertex_count);
        let wrapped_box = AxisAlignedBox::new(corners[0], corners[1]);

        let mut clipped = Vec::with_capacity(2 * vertex_count);
        for (i, &start) in ring.iter().enumerate() {
            let end = ring[(i + 1) % ring.len()];
            let (a, b) = clip_segment(start, end, &wrapped_box);
            clipped.push(a);
            clipped.push(b);
        }
        let mut filtered = self.filter_redundant(&clipped);
        let kept = filtered.len();

        filtered.extend_from_slice(corners);
        let mut unwrapped = self.transform.reverse_wrap(&filtered);
        unwrapped.truncate(kept);

        Polygon::new(unwrapped).ok()
    }

    /// Clip each polygon, dropping those clipped away entirely.
    #[must_use]
    pub fn clip_polygons(&self, polygons: &[Polygon], bx: &AxisAlignedBox) -> Vec<Polygon> {
        polygons
            .iter()
            .filter_map(|polygon| self.clip_single_polygon(polygon, bx))
            .collect()
    }

    fn filter_redundant(&self, vertices: &[Coordinate]) -> Vec<Coordinate> {
        let deduplicated = self.filter_duplicates(vertices);
        let straightened = self.filter_collinear(&deduplicated);
        self.filter_duplicates(&straightened)
    }

    /// Drop vertices identical to their successor, treating the ring as
    /// cyclic.
    fn filter_duplicates(&self, vertices: &[Coordinate]) -> Vec<Coordinate> {
        let Some(&first) = vertices.first() else {
            return Vec::new();
        };
        if vertices.len() == 1 {
            return vertices.to_vec();
        }

        let mut kept = Vec::with_capacity(vertices.len());
        let mut previous = first;
        for &vertex in vertices.iter().rev() {
            if !self.identical(previous, vertex) {
                kept.push(vertex);
                previous = vertex;
            }
        }
        // The ring collapsed onto a single vertex.
        if kept.len() == 1 {
            kept.push(first);
        }
        kept.reverse();
        kept
    }

    /// Drop vertices whose two incident edges have the same gradient.
    fn filter_collinear(&self, vertices: &[Coordinate]) -> Vec<Coordinate> {
        let n = vertices.len();
        (0..n)
            .filter(|&i| {
                let previous = vertices[(i + n - 1) % n];
                let next = vertices[(i + 1) % n];
                !self.same_gradient((previous, vertices[i]), (vertices[i], next))
            })
            .map(|i| vertices[i])
            .collect()
    }

    fn identical(&self, a: Coordinate, b: Coordinate) -> bool {
        (a.longitude - b.longitude).abs() < self.epsilon
            && (a.latitude - b.latitude).abs() < self.epsilon
    }

    fn same_gradient(&self, first: (Coordinate, Coordinate), second: (Coordinate, Coordinate)) -> bool {
        let first_vertical = (first.0.longitude - first.1.longitude).abs() < self.epsilon;
        let second_vertical = (second.0.longitude - second.1.longitude).abs() < self.epsilon;
        if first_vertical || second_vertical {
            return first_vertical && second_vertical;
        }
        (gradient(first) - gradient(second)).abs() < self.epsilon
    }
}

fn gradient((a, b): (Coordinate, Coordinate)) -> f64 {
    (a.latitude - b.latitude) / (a.longitude - b.longitude)
}

fn out_code(c: Coordinate, bx: &AxisAlignedBox) -> u8 {
    let lower_left = bx.lower_left();
    let upper_right = bx.upper_right();
    let mut code = INSIDE;
    if c.longitude < lower_left.longitude {
        code |= LEFT;
    } else if c.longitude > upper_right.longitude {
        code |= RIGHT;
    }
    if c.latitude < lower_left.latitude {
        code |= BOTTOM;
    } else if c.latitude > upper_right.latitude {
        code |= TOP;
    }
    code
}

/// Cohen-Sutherland clip of `a -> b`. A segment outside the box is not
/// discarded: both endpoints are clamped onto the box instead.
fn clip_segment(a: Coordinate, b: Coordinate, bx: &AxisAlignedBox) -> (Coordinate, Coordinate) {
    let x_min = bx.lower_left().longitude;
    let x_max = bx.upper_right().longitude;
    let y_min = bx.lower_left().latitude;
    let y_max = bx.upper_right().latitude;
    // Not `f64::clamp`, which panics on an inverted box.
    let clamp = |c: Coordinate| {
        Coordinate::new(
            c.longitude.max(x_min).min(x_max),
            c.latitude.max(y_min).min(y_max),
        )
    };

    let (mut a, mut b) = (a, b);
    let mut code_a = out_code(a, bx);
    let mut code_b = out_code(b, bx);
    loop {
        if code_a == INSIDE && code_b == INSIDE {
            return (a, b);
        }
        if code_a & code_b != 0 {
            return (clamp(a), clamp(b));
        }

        let outside = if code_a == INSIDE { code_b } else { code_a };
        let (x1, y1, x2, y2) = (a.longitude, a.latitude, b.longitude, b.latitude);
        let moved = if outside & TOP != 0 {
            Coordinate::new(x1 + (x2 - x1) * (y_max - y1) / (y2 - y1), y_max)
        } else if outside & BOTTOM != 0 {
            Coordinate::new(x1 + (x2 - x1) * (y_min - y1) / (y2 - y1), y_min)
        } else if outside & RIGHT != 0 {
            Coordinate::new(x_max, y1 + (y2 - y1) * (x_max - x1) / (x2 - x1))
        } else {
            Coordinate::new(x_min, y1 + (y2 - y1) * (x_min - x1) / (x2 - x1))
        };

        if outside == code_a {
            a = moved;
            code_a = out_code(a, bx);
        } else {
            b = moved;
            code_b = out_code(b, bx);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn c(lon: f64, lat: f64) -> Coordinate {
        Coordinate::new(lon, lat)
    }

    fn polygon(coords: &[(f64, f64)]) -> Polygon {
        Polygon::new(coords.iter().map(|&(lon, lat)| c(lon, lat)).collect()).unwrap()
    }

    fn bx(top_left: (f64, f64), bottom_right: (f64, f64)) -> AxisAlignedBox {
        AxisAlignedBox::new(c(top_left.0, top_left.1), c(bottom_right.0, bottom_right.1))
    }

    fn octagon() -> Polygon {
        polygon(&[
            (1.0, 2.0),
            (2.0, 1.0),
            (2.0, -1.0),
            (1.0, -2.0),
            (-1.0, -2.0),
            (-2.0, -1.0),
            (-2.0, 1.0),
            (-1.0, 2.0),
        ])
    }

    fn assert_ring(actual: &Polygon, expected: &[(f64, f64)]) {
        let vertices = actual.vertices();
        assert_eq!(vertices.len(), expected.len(), "got {vertices:?}");
        for (v, &(lon, lat)) in vertices.iter().zip(expected) {
            assert!(
                (v.longitude - lon).abs() < 1e-9 && (v.latitude - lat).abs() < 1e-9,
                "expected {expected:?}, got {vertices:?}"
            );
        }
    }

    #[test]
    fn box_inside_polygon_yields_box() {
        let clipper = PolygonClipper::new(MeridianWrap, 0.001);
        let clipped = clipper
            .clip_single_polygon(&octagon(), &bx((-1.0, 1.0), (1.0, -1.0)))
            .unwrap();
        assert_ring(&clipped, &[(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0)]);
    }

    #[test]
    fn enclosing_box_leaves_polygon_unchanged() {
        let clipped = PolygonClipper::default()
            .clip_single_polygon(&octagon(), &bx((-2.0, 2.0), (2.0, -2.0)))
            .unwrap();
        assert_eq!(clipped, octagon());
    }

    #[test]
    fn quadrant_box() {
        let clipped = PolygonClipper::default()
            .clip_single_polygon(&octagon(), &bx((0.0, 2.0), (2.0, 0.0)))
            .unwrap();
        assert_ring(&clipped, &[(1.0, 2.0), (2.0, 1.0), (2.0, 0.0), (0.0, 0.0), (0.0, 2.0)]);
    }

    #[test]
    fn half_box() {
        let clipped = PolygonClipper::default()
            .clip_single_polygon(&octagon(), &bx((0.0, 2.0), (2.0, -2.0)))
            .unwrap();
        assert_ring(
            &clipped,
            &[(1.0, 2.0), (2.0, 1.0), (2.0, -1.0), (1.0, -2.0), (0.0, -2.0), (0.0, 2.0)],
        );
    }

    #[test]
    fn concave_polygon() {
        let concave = polygon(&[(-2.0, 0.0), (2.0, 1.0), (1.0, 0.0), (2.0, -1.0)]);
        let clipped = PolygonClipper::default()
            .clip_single_polygon(&concave, &bx((-1.0, 1.0), (1.0, -1.0)))
            .unwrap();
        assert_ring(&clipped, &[(-1.0, 0.25), (1.0, 0.75), (1.0, -0.75), (-1.0, -0.25)]);
    }

    #[test]
    fn polygon_across_antimeridian() {
        let concave = polygon(&[(178.0, 0.0), (-178.0, 1.0), (-179.0, 0.0), (-178.0, -1.0)]);
        let clipped = PolygonClipper::default()
            .clip_single_polygon(&concave, &bx((179.0, 1.0), (-179.0, -1.0)))
            .unwrap();
        assert_ring(
            &clipped,
            &[(179.0, 0.25), (-179.0, 0.75), (-179.0, -0.75), (179.0, -0.25)],
        );
    }

    #[test]
    fn polygon_outside_box_is_dropped() {
        let far = polygon(&[(10.0, 10.0), (11.0, 10.0), (11.0, 11.0)]);
        let clipper = PolygonClipper::default();
        let bx = bx((-1.0, 1.0), (1.0, -1.0));
        assert!(clipper.clip_single_polygon(&far, &bx).is_none());
        assert_eq!(clipper.clip_polygons(&[far, octagon()], &bx).len(), 1);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn enclosing_box_is_identity(
                lon in -170.0f64..170.0, lat in -80.0f64..80.0,
                w in 0.5f64..5.0, h in 0.5f64..5.0,
            ) {
                // A kite has no three collinear vertices.
                let kite = polygon(&[
                    (lon, lat + h),
                    (lon + w, lat),
                    (lon, lat - 2.0 * h),
                    (lon - w, lat),
                ]);
                let enclosing = bx((lon - w - 1.0, lat + h + 1.0), (lon + w + 1.0, lat - 2.0 * h - 1.0));
                let clipped = PolygonClipper::default().clip_single_polygon(&kite, &enclosing);
                prop_assert_eq!(clipped, Some(kite));
            }
        }
    }
}
