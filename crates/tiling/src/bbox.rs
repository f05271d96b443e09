use approx::{AbsDiffEq, RelativeEq};
use geo_types::{Polygon, Rect};

use crate::Coordinate;

/// Axis aligned WGS84 bounding box, `[min_lon, min_lat, max_lon, max_lat]` in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    pub const fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        BBox {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Box spanned by two arbitrary corners
    pub fn from_corners(a: Coordinate, b: Coordinate) -> Self {
        BBox {
            min_lon: a.longitude.min(b.longitude),
            min_lat: a.latitude.min(b.latitude),
            max_lon: a.longitude.max(b.longitude),
            max_lat: a.latitude.max(b.latitude),
        }
    }

    /// The same box with the min and max corners ordered
    pub fn normalized(&self) -> BBox {
        BBox::from_corners(self.min_corner(), self.max_corner())
    }

    pub fn min_corner(&self) -> Coordinate {
        Coordinate::latlon(self.min_lat, self.min_lon)
    }

    pub fn max_corner(&self) -> Coordinate {
        Coordinate::latlon(self.max_lat, self.max_lon)
    }

    pub fn width(&self) -> f64 {
        (self.max_lon - self.min_lon).abs()
    }

    pub fn height(&self) -> f64 {
        (self.max_lat - self.min_lat).abs()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// True when the box has no area
    pub fn is_empty(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    pub fn is_valid(&self) -> bool {
        self.min_corner().is_valid() && self.max_corner().is_valid()
    }

    pub fn contains(&self, other: &BBox) -> bool {
        let lhs = self.normalized();
        let rhs = other.normalized();
        lhs.min_lon <= rhs.min_lon && lhs.min_lat <= rhs.min_lat && lhs.max_lon >= rhs.max_lon && lhs.max_lat >= rhs.max_lat
    }

    /// The overlapping part of both boxes, boxes that only touch produce a zero area result
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let lhs = self.normalized();
        let rhs = other.normalized();

        let result = BBox {
            min_lon: lhs.min_lon.max(rhs.min_lon),
            min_lat: lhs.min_lat.max(rhs.min_lat),
            max_lon: lhs.max_lon.min(rhs.max_lon),
            max_lat: lhs.max_lat.min(rhs.max_lat),
        };

        if result.min_lon > result.max_lon || result.min_lat > result.max_lat {
            None
        } else {
            Some(result)
        }
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::from(*self).to_polygon()
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

impl From<[f64; 4]> for BBox {
    fn from(bounds: [f64; 4]) -> Self {
        BBox::new(bounds[0], bounds[1], bounds[2], bounds[3])
    }
}

impl From<Rect<f64>> for BBox {
    fn from(rect: Rect<f64>) -> Self {
        BBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

impl From<BBox> for Rect<f64> {
    fn from(bbox: BBox) -> Self {
        Rect::new(geo_types::Coord::from(bbox.min_corner()), geo_types::Coord::from(bbox.max_corner()))
    }
}

impl std::fmt::Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.min_lon, self.min_lat, self.max_lon, self.max_lat)
    }
}

impl AbsDiffEq for BBox {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.min_corner().abs_diff_eq(&other.min_corner(), epsilon) && self.max_corner().abs_diff_eq(&other.max_corner(), epsilon)
    }
}

impl RelativeEq for BBox {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.min_corner().relative_eq(&other.min_corner(), epsilon, max_relative)
            && self.max_corner().relative_eq(&other.max_corner(), epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_swapped_corners() {
        let bbox = BBox::new(10.0, 20.0, -10.0, -20.0);
        assert_eq!(bbox.normalized(), BBox::new(-10.0, -20.0, 10.0, 20.0));
        assert_relative_eq!(bbox.area(), 800.0);
    }

    #[test]
    fn intersection() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, -5.0, 15.0, 5.0);
        assert_eq!(a.intersection(&b), Some(BBox::new(5.0, 0.0, 10.0, 5.0)));

        let touching = BBox::new(10.0, 0.0, 20.0, 10.0);
        let edge = a.intersection(&touching).expect("touching boxes share an edge");
        assert!(edge.is_empty());

        let disjoint = BBox::new(11.0, 11.0, 20.0, 20.0);
        assert_eq!(a.intersection(&disjoint), None);
    }

    #[test]
    fn contains() {
        let outer = BBox::new(-45.0, -45.0, 45.0, 45.0);
        assert!(outer.contains(&BBox::new(0.0, 0.0, 45.0, 45.0)));
        assert!(!outer.contains(&BBox::new(0.0, 0.0, 45.1, 45.0)));
    }

    #[test]
    fn rect_conversion() {
        let bbox = BBox::from([-45.0, 0.0, 45.0, 45.0]);
        let rect = Rect::from(bbox);
        assert_relative_eq!(BBox::from(rect), bbox);
        assert_eq!(bbox.to_polygon().exterior().0.len(), 5);
    }
}
