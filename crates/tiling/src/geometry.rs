//! Polygon operations needed for tile coverage, backed by the `geo` crate.

use geo::{Area, BooleanOps, BoundingRect, CoordsIter};
use geo_types::{Geometry, MultiPolygon, Polygon};

use crate::BBox;

/// Planar area in square degrees
pub fn area(shape: &MultiPolygon<f64>) -> f64 {
    shape.unsigned_area()
}

/// The overlapping part of two shapes, `None` when they do not overlap or only share edges or points
pub fn intersect(shape: &MultiPolygon<f64>, other: &MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    let intersection = shape.intersection(other);
    if intersection.0.is_empty() || area(&intersection) == 0.0 {
        return None;
    }

    Some(intersection)
}

/// Intersects all shapes, `None` when the list is empty or the shapes have no common area
pub fn multi_intersect(shapes: &[MultiPolygon<f64>]) -> Option<MultiPolygon<f64>> {
    let (first, rest) = shapes.split_first()?;
    rest.iter().try_fold(first.clone(), |acc, shape| intersect(&acc, shape))
}

pub fn bbox_of(shape: &MultiPolygon<f64>) -> Option<BBox> {
    shape.bounding_rect().map(BBox::from)
}

pub fn bbox_polygon(bbox: &BBox) -> Polygon<f64> {
    bbox.to_polygon()
}

/// Number of coordinates in the geometry, closing ring coordinates included
pub fn count_vertices(geometry: &Geometry<f64>) -> usize {
    geometry.coords_count()
}

/// True when the shape covers its bounding box, up to a relative area tolerance
pub fn is_bbox_shaped(shape: &MultiPolygon<f64>, bbox: &BBox, tolerance: f64) -> bool {
    let bbox_area = bbox.area();
    if bbox_area == 0.0 {
        return false;
    }

    // The shape lies within its bounding box, so only the uncovered part of the box matters
    let uncovered = MultiPolygon::from(bbox_polygon(bbox)).difference(shape);
    area(&uncovered) <= bbox_area * tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo_types::{Geometry, GeometryCollection, LineString, Point, polygon};

    fn triangle() -> MultiPolygon<f64> {
        MultiPolygon::from(polygon![(x: -45.0, y: 0.0), (x: 0.0, y: 45.0), (x: 45.0, y: 0.0), (x: -45.0, y: 0.0)])
    }

    fn square(bbox: [f64; 4]) -> MultiPolygon<f64> {
        MultiPolygon::from(BBox::from(bbox).to_polygon())
    }

    #[test]
    fn shape_area() {
        assert_relative_eq!(area(&triangle()), 2025.0);
        assert_relative_eq!(area(&square([0.0, 0.0, 10.0, 5.0])), 50.0);
    }

    #[test]
    fn intersection() {
        let result = intersect(&triangle(), &square([0.0, 0.0, 45.0, 45.0])).expect("shapes overlap");
        assert_relative_eq!(area(&result), 1012.5);

        assert!(intersect(&triangle(), &square([50.0, 0.0, 60.0, 10.0])).is_none());
    }

    #[test]
    fn touching_shapes_do_not_intersect() {
        assert!(intersect(&square([0.0, 0.0, 10.0, 10.0]), &square([10.0, 0.0, 20.0, 10.0])).is_none());
        assert!(intersect(&triangle(), &square([-45.0, -45.0, 0.0, 0.0])).is_none());
    }

    #[test]
    fn intersect_many() {
        let shapes = [square([0.0, 0.0, 10.0, 10.0]), square([5.0, 5.0, 15.0, 15.0]), square([0.0, 7.0, 20.0, 20.0])];
        let result = multi_intersect(&shapes).expect("common area");
        assert_relative_eq!(bbox_of(&result).expect("non empty"), BBox::new(5.0, 7.0, 10.0, 10.0));

        assert!(multi_intersect(&[]).is_none());
        assert!(multi_intersect(&[square([0.0, 0.0, 1.0, 1.0]), square([2.0, 2.0, 3.0, 3.0])]).is_none());
    }

    #[test]
    fn bbox_shaped() {
        let bbox = BBox::new(-45.0, 0.0, 45.0, 45.0);
        assert!(is_bbox_shaped(&square(bbox.to_array()), &bbox, 1e-9));

        let triangle = triangle();
        let bbox = bbox_of(&triangle).expect("non empty");
        assert_relative_eq!(bbox, BBox::new(-45.0, 0.0, 45.0, 45.0));
        assert!(!is_bbox_shaped(&triangle, &bbox, 1e-9));
    }

    #[test]
    fn vertex_count() {
        assert_eq!(count_vertices(&Geometry::from(Point::new(4.0, 50.0))), 1);
        assert_eq!(count_vertices(&Geometry::from(LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]))), 3);
        assert_eq!(count_vertices(&Geometry::from(triangle())), 4);

        let shapes = MultiPolygon::new(vec![triangle().0[0].clone(), BBox::new(0.0, 0.0, 1.0, 1.0).to_polygon()]);
        assert_eq!(count_vertices(&Geometry::from(shapes)), 9);

        let collection = GeometryCollection::from(vec![Geometry::from(Point::new(0.0, 0.0)), Geometry::from(triangle())]);
        assert_eq!(count_vertices(&Geometry::GeometryCollection(collection)), 5);
    }
}
