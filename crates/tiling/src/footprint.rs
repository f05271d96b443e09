use geo_types::{MultiPolygon, Polygon, Rect};

use crate::{BBox, geometry};

/// Area of interest for which tiles are generated
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    /// Axis aligned box, covered without any polygon clipping
    Bbox(BBox),
    Shape(MultiPolygon<f64>),
}

impl Footprint {
    /// Bounding box of the footprint, `None` for an empty shape
    pub fn bbox(&self) -> Option<BBox> {
        match self {
            Footprint::Bbox(bbox) => Some(bbox.normalized()),
            Footprint::Shape(shape) => geometry::bbox_of(shape),
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Footprint::Bbox(bbox) => bbox.area(),
            Footprint::Shape(shape) => geometry::area(shape),
        }
    }

    /// True for footprints that cannot contain any tile: empty shapes, zero area shapes or invalid coordinates
    pub fn is_degenerate(&self) -> bool {
        match self.bbox() {
            Some(bbox) => !bbox.is_valid() || bbox.is_empty() || self.area() == 0.0,
            None => true,
        }
    }

    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        match self {
            Footprint::Bbox(bbox) => MultiPolygon::from(bbox.normalized().to_polygon()),
            Footprint::Shape(shape) => shape.clone(),
        }
    }

    /// Decides how the footprint gets covered, shapes that fill their bounding box are treated as boxes
    pub(crate) fn into_plan(self, area_tolerance: f64) -> CoveragePlan {
        if self.is_degenerate() {
            log::debug!("Degenerate footprint produces no tiles");
            return CoveragePlan::Empty;
        }

        let Some(bbox) = self.bbox() else {
            return CoveragePlan::Empty;
        };

        match self {
            Footprint::Bbox(_) => CoveragePlan::Bbox(bbox),
            Footprint::Shape(shape) if geometry::is_bbox_shaped(&shape, &bbox, area_tolerance) => {
                log::debug!("Footprint fills its bounding box {bbox}");
                CoveragePlan::Bbox(bbox)
            }
            Footprint::Shape(shape) => CoveragePlan::Shape { bbox, shape },
        }
    }
}

pub(crate) enum CoveragePlan {
    Empty,
    Bbox(BBox),
    Shape { bbox: BBox, shape: MultiPolygon<f64> },
}

impl From<BBox> for Footprint {
    fn from(bbox: BBox) -> Self {
        Footprint::Bbox(bbox)
    }
}

impl From<Rect<f64>> for Footprint {
    fn from(rect: Rect<f64>) -> Self {
        Footprint::Bbox(BBox::from(rect))
    }
}

impl From<Polygon<f64>> for Footprint {
    fn from(polygon: Polygon<f64>) -> Self {
        Footprint::Shape(MultiPolygon::from(polygon))
    }
}

impl From<MultiPolygon<f64>> for Footprint {
    fn from(shape: MultiPolygon<f64>) -> Self {
        Footprint::Shape(shape)
    }
}
