//! Geometry kernel: orientation, segment intersection, containment.
//!
//! All functions are pure. Several of them truncate intermediate
//! values to ten decimal places before comparing, so near-collinear
//! configurations produced by floating-point noise classify as
//! collinear. The visibility sweep depends on this: comparing the raw
//! products changes which vertices are found visible.

use std::f64::consts::PI;

use crate::graph::Graph;
use crate::types::{Edge, GraphError, Orientation, Point, PolygonId};

/// X coordinate of the far end of every horizontal test ray.
///
/// Must exceed any coordinate in use, including longitudes shifted
/// past 180 by the antimeridian transformer.
pub const INF: f64 = 10_000.0;

/// Scale for truncating signed areas and cosines to ten decimal places.
const TRUNCATION_SCALE: f64 = 1e10;

/// Drop digits beyond the tenth decimal place, rounding toward zero.
fn truncate(value: f64) -> f64 {
    (value * TRUNCATION_SCALE).trunc() / TRUNCATION_SCALE
}

/// Signed-area orientation of the turn `a -> b -> c`.
#[must_use]
#[allow(clippy::suboptimal_flops)]
pub fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    let area = truncate((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x));
    if area > 0.0 {
        Orientation::CounterClockwise
    } else if area < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Whether `q` lies within the bounding box of `p` and `r`.
///
/// Only meaningful when the three points are already known to be
/// collinear.
#[must_use]
pub fn on_segment(p: Point, q: Point, r: Point) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Whether segment `p1-q1` intersects `edge`, touching included.
#[must_use]
pub fn segments_intersect(p1: Point, q1: Point, edge: &Edge) -> bool {
    let p2 = edge.p1;
    let q2 = edge.p2;
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(p1, p2, q1))
        || (o2 == Orientation::Collinear && on_segment(p1, q2, q1))
        || (o3 == Orientation::Collinear && on_segment(p2, p1, q2))
        || (o4 == Orientation::Collinear && on_segment(p2, q1, q2))
}

/// Intersection of the infinite lines through `p1-p2` and `edge`.
///
/// Returns `p1` or `p2` directly when either is an endpoint of `edge`,
/// and `None` when the lines are parallel.
#[must_use]
#[allow(clippy::float_cmp, clippy::suboptimal_flops)]
pub fn intersect_point(p1: Point, p2: Point, edge: &Edge) -> Option<Point> {
    if edge.contains(p1) {
        return Some(p1);
    }
    if edge.contains(p2) {
        return Some(p2);
    }

    let e1 = edge.p1;
    let e2 = edge.p2;

    if e1.x == e2.x {
        if p1.x == p2.x {
            return None;
        }
        let pslope = (p1.y - p2.y) / (p1.x - p2.x);
        let x = e1.x;
        return Some(Point::new(x, pslope * (x - p1.x) + p1.y));
    }

    if p1.x == p2.x {
        let eslope = (e1.y - e2.y) / (e1.x - e2.x);
        let x = p1.x;
        return Some(Point::new(x, eslope * (x - e1.x) + e1.y));
    }

    let pslope = (p1.y - p2.y) / (p1.x - p2.x);
    let eslope = (e1.y - e2.y) / (e1.x - e2.x);
    if eslope == pslope {
        return None;
    }
    let x = (eslope * e1.x - pslope * p1.x + p1.y - e1.y) / (eslope - pslope);
    Some(Point::new(x, eslope * (x - e1.x) + e1.y))
}

/// Distance from `p1` to where line `p1-p2` meets `edge`, or `0.0` if
/// the lines are parallel.
#[must_use]
pub fn point_edge_distance(p1: Point, p2: Point, edge: &Edge) -> f64 {
    intersect_point(p1, p2, edge).map_or(0.0, |hit| p1.distance(hit))
}

/// Euclidean distance between two points.
#[must_use]
pub fn euclidean_distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Angle of `point` around `center`, in `[0, 2π)`.
#[must_use]
#[allow(clippy::float_cmp, clippy::suboptimal_flops)]
pub fn angle(center: Point, point: Point) -> f64 {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    if dx == 0.0 {
        return if dy < 0.0 { PI * 3.0 / 2.0 } else { PI / 2.0 };
    }
    if dy == 0.0 {
        return if dx < 0.0 { PI } else { 0.0 };
    }
    if dx < 0.0 {
        return PI + (dy / dx).atan();
    }
    if dy < 0.0 {
        return 2.0 * PI + (dy / dx).atan();
    }
    (dy / dx).atan()
}

/// Angle at `b` in the triangle `a, b, c`, by the law of cosines.
///
/// The cosine is truncated to ten decimal places so rounding noise
/// cannot push it outside `[-1, 1]`.
#[must_use]
pub fn angle_at(a: Point, b: Point, c: Point) -> f64 {
    let a_sq = (c.x - b.x).powi(2) + (c.y - b.y).powi(2);
    let b_sq = (c.x - a.x).powi(2) + (c.y - a.y).powi(2);
    let c_sq = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    let cos = (a_sq + c_sq - b_sq) / (2.0 * a_sq.sqrt() * c_sq.sqrt());
    truncate(cos).acos()
}

/// Crossing-number containment test of `point` against a polygon
/// boundary.
///
/// Casts a ray from `point` to `(INF, point.y)`. An edge with exactly
/// one endpoint on the ray counts only if its other endpoint lies
/// strictly above the ray. Edges lying along the ray are ignored.
#[must_use]
pub fn polygon_crossing(point: Point, boundary: &[Edge]) -> bool {
    let ray_end = Point::new(INF, point.y);
    let mut crossings = 0usize;

    for edge in boundary {
        if point.y < edge.p1.y && point.y < edge.p2.y {
            continue;
        }
        if point.y > edge.p1.y && point.y > edge.p2.y {
            continue;
        }
        if point.x > edge.p1.x && point.x > edge.p2.x {
            continue;
        }

        let p1_on_ray = orientation(point, edge.p1, ray_end) == Orientation::Collinear;
        let p2_on_ray = orientation(point, edge.p2, ray_end) == Orientation::Collinear;
        if p1_on_ray && p2_on_ray {
            continue;
        }
        if p1_on_ray || p2_on_ray {
            let on_ray = if p1_on_ray { edge.p1 } else { edge.p2 };
            if edge.adjacent(on_ray).y > point.y {
                crossings += 1;
            }
        } else if segments_intersect(point, ray_end, edge) {
            crossings += 1;
        }
    }

    crossings % 2 == 1
}

/// Whether segment `p1-p2` runs through the interior of the polygon
/// both endpoints belong to.
///
/// False when the endpoints belong to different polygons or to none.
/// Tested at the segment midpoint.
#[must_use]
pub fn edge_in_polygon(p1: Point, p2: Point, graph: &Graph) -> bool {
    let (Some(id), Some(other)) = (p1.polygon_id, p2.polygon_id) else {
        return false;
    };
    if id != other {
        return false;
    }
    let mid = Point::new(f64::midpoint(p1.x, p2.x), f64::midpoint(p1.y, p2.y));
    polygon_crossing(mid, graph.polygon_edges(id))
}

/// The first polygon, in ascending id order, whose boundary contains
/// `point`.
///
/// Nesting is not resolved: a point inside a lake inside a landmass
/// reports whichever of the two has the lower id.
#[must_use]
pub fn point_in_polygon(point: Point, graph: &Graph) -> Option<PolygonId> {
    graph
        .polygons()
        .iter()
        .find(|(_, boundary)| polygon_crossing(point, boundary))
        .map(|(&id, _)| id)
}

/// Unit vector from `base` toward `head`.
fn unit_vector(base: Point, head: Point) -> Point {
    let magnitude = base.distance(head);
    Point::new((head.x - base.x) / magnitude, (head.y - base.y) / magnitude)
}

/// The nearest point outside polygon `polygon_id` to an interior
/// `point`, pushed `length` beyond the boundary.
///
/// Finds the closest point on the boundary by clamped projection onto
/// every edge. If that is a vertex, the result lies along the bisector
/// of the vertex's two edges, on whichever side tests as exterior.
/// Otherwise it continues along the direction from `point` to the
/// boundary.
///
/// # Errors
///
/// Returns [`GraphError::NoPolygonEdges`] if the polygon has no edges,
/// and [`GraphError::MissingBisector`] if the nearest vertex has fewer
/// than two incident edges.
pub fn closest_point(
    point: Point,
    graph: &Graph,
    polygon_id: PolygonId,
    length: f64,
) -> Result<Point, GraphError> {
    let mut best: Option<(f64, Point, Edge)> = None;

    for edge in graph.polygon_edges(polygon_id) {
        let (e1, e2) = (edge.p1, edge.p2);
        let num = (point.x - e1.x).mul_add(e2.x - e1.x, (point.y - e1.y) * (e2.y - e1.y));
        let denom = (e2.x - e1.x).powi(2) + (e2.y - e1.y).powi(2);
        let t = num / denom;
        let candidate = if t < 0.0 {
            e1
        } else if t > 1.0 {
            e2
        } else {
            Point::new(t.mul_add(e2.x - e1.x, e1.x), t.mul_add(e2.y - e1.y, e1.y))
        };
        let distance = point.distance(candidate);
        if best.is_none_or(|(d, _, _)| distance < d) {
            best = Some((distance, candidate, *edge));
        }
    }

    let (_, nearest, edge) = best.ok_or(GraphError::NoPolygonEdges(polygon_id))?;

    if edge.contains(nearest) {
        let vertex = if nearest == edge.p1 { edge.p1 } else { edge.p2 };
        let incident = graph.incident_edges(vertex);
        let [first, second, ..] = incident else {
            return Err(GraphError::MissingBisector(vertex));
        };
        let v1 = unit_vector(vertex, first.adjacent(vertex));
        let v2 = unit_vector(vertex, second.adjacent(vertex));
        let bisector = unit_vector(Point::new(0.0, 0.0), Point::new(v1.x + v2.x, v1.y + v2.y));
        let outward = Point::new(
            bisector.x.mul_add(length, vertex.x),
            bisector.y.mul_add(length, vertex.y),
        );
        if point_in_polygon(outward, graph).is_none() {
            return Ok(outward);
        }
        return Ok(Point::new(
            bisector.x.mul_add(-length, vertex.x),
            bisector.y.mul_add(-length, vertex.y),
        ));
    }

    let direction = unit_vector(point, nearest);
    Ok(Point::new(
        direction.x.mul_add(length, nearest.x),
        direction.y.mul_add(length, nearest.y),
    ))
}
