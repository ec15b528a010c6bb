//! Spatial lookup of polygons, and the land-crossing precheck built on it.
//!
//! The precheck answers "does this segment touch any coastline?" cheaply
//! enough to run before a full visibility query: the index narrows the
//! candidates to polygons whose bounding boxes meet the segment's, and
//! only those are tested edge by edge.

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

use crate::bbox::AxisAlignedBox;
use crate::polygon::Polygon;
use crate::types::Coordinate;

/// Index from boxes to the polygons whose extent meets them.
pub trait PolygonSpatialIndex {
    /// Polygons whose bounding box intersects `bx`. The order is
    /// unspecified.
    fn intersecting(&self, bx: &AxisAlignedBox) -> Vec<&Polygon>;
}

/// Polygon bounding box tagged with the polygon's position in the
/// index.
type IndexedEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// R-tree over polygon bounding boxes.
#[derive(Debug)]
pub struct RTreePolygonIndex {
    polygons: Vec<Polygon>,
    tree: RTree<IndexedEnvelope>,
}

impl RTreePolygonIndex {
    /// Bulk-load an index over `polygons`.
    #[must_use]
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let envelopes = polygons
            .iter()
            .enumerate()
            .map(|(i, polygon)| GeomWithData::new(rectangle(&polygon.bounding_box()), i))
            .collect();
        Self {
            polygons,
            tree: RTree::bulk_load(envelopes),
        }
    }

    /// Number of indexed polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Returns `true` if no polygons are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

impl PolygonSpatialIndex for RTreePolygonIndex {
    fn intersecting(&self, bx: &AxisAlignedBox) -> Vec<&Polygon> {
        let query = AABB::from_corners(
            [bx.lower_left().longitude, bx.lower_left().latitude],
            [bx.upper_right().longitude, bx.upper_right().latitude],
        );
        self.tree
            .locate_in_envelope_intersecting(&query)
            .filter_map(|entry| self.polygons.get(entry.data))
            .collect()
    }
}

fn rectangle(bx: &AxisAlignedBox) -> Rectangle<[f64; 2]> {
    Rectangle::from_corners(
        [bx.lower_left().longitude, bx.lower_left().latitude],
        [bx.upper_right().longitude, bx.upper_right().latitude],
    )
}

/// Tests segments against a polygon set before routing.
#[derive(Debug)]
pub struct IntersectionPrechecker<I = RTreePolygonIndex> {
    index: I,
}

impl IntersectionPrechecker {
    /// Prechecker over an R-tree of `polygons`.
    #[must_use]
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Self::new(RTreePolygonIndex::new(polygons))
    }
}

impl<I: PolygonSpatialIndex> IntersectionPrechecker<I> {
    /// Prechecker over a custom index.
    #[must_use]
    pub const fn new(index: I) -> Self {
        Self { index }
    }

    /// Whether the segment `a -> b` touches any indexed polygon's
    /// boundary.
    #[must_use]
    pub fn does_line_cross_polygons(&self, a: Coordinate, b: Coordinate) -> bool {
        let query = AxisAlignedBox::around_segment(a, b, 0.0);
        self.index
            .intersecting(&query)
            .into_iter()
            .any(|polygon| polygon.line_intersects(a, b))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn c(lon: f64, lat: f64) -> Coordinate {
        Coordinate::new(lon, lat)
    }

    fn square(lon: f64, lat: f64, size: f64) -> Polygon {
        Polygon::new(vec![
            c(lon, lat),
            c(lon + size, lat),
            c(lon + size, lat + size),
            c(lon, lat + size),
        ])
        .unwrap()
    }

    #[test]
    fn index_returns_overlapping_envelopes() {
        let index = RTreePolygonIndex::new(vec![square(0.0, 0.0, 1.0), square(10.0, 10.0, 1.0)]);
        assert_eq!(index.len(), 2);

        let hits = index.intersecting(&AxisAlignedBox::new(c(0.5, 2.0), c(2.0, 0.5)));
        assert_eq!(hits, vec![&square(0.0, 0.0, 1.0)]);

        let none = index.intersecting(&AxisAlignedBox::new(c(4.0, 6.0), c(6.0, 4.0)));
        assert!(none.is_empty());
    }

    #[test]
    fn segment_across_island_is_flagged() {
        let checker = IntersectionPrechecker::from_polygons(vec![square(0.0, 0.0, 1.0)]);
        assert!(checker.does_line_cross_polygons(c(-1.0, 0.5), c(2.0, 0.5)));
    }

    #[test]
    fn segment_in_open_water_is_clear() {
        let checker = IntersectionPrechecker::from_polygons(vec![
            square(0.0, 0.0, 1.0),
            square(10.0, 10.0, 1.0),
        ]);
        assert!(!checker.does_line_cross_polygons(c(-1.0, 3.0), c(5.0, 3.0)));
    }

    #[test]
    fn envelope_overlap_alone_is_not_a_crossing() {
        // The segment's box meets the triangle's box but misses the
        // triangle itself.
        let triangle = Polygon::new(vec![c(0.0, 0.0), c(4.0, 0.0), c(0.0, 4.0)]).unwrap();
        let checker = IntersectionPrechecker::from_polygons(vec![triangle]);
        assert!(!checker.does_line_cross_polygons(c(3.0, 3.5), c(3.5, 3.0)));
    }

    struct Everything(Vec<Polygon>);

    impl PolygonSpatialIndex for Everything {
        fn intersecting(&self, _bx: &AxisAlignedBox) -> Vec<&Polygon> {
            self.0.iter().collect()
        }
    }

    #[test]
    fn custom_index_is_injectable() {
        let checker = IntersectionPrechecker::new(Everything(vec![square(0.0, 0.0, 1.0)]));
        assert!(checker.does_line_cross_polygons(c(0.5, -1.0), c(0.5, 2.0)));
        assert!(!checker.does_line_cross_polygons(c(5.0, -1.0), c(5.0, 2.0)));
    }
}
