use crate::{
    CoverageOptions, Footprint, Result, Tile, TileRange,
    bboxtiler::{bbox_to_tile_range, tile_range_to_bbox},
    enumerator::TileEnumerator,
    footprint::CoveragePlan,
    quadtree::{FootprintIntersection, QuadtreeWalk, RangeIntersection},
    tilegrid::check_zoom,
};

/// Covers areas with a minimal set of tile ranges at a target zoom level.
///
/// Every tile of the target zoom level that overlaps the area with a non zero surface is part of exactly one produced range.
#[derive(Debug, Clone, Default)]
pub struct TileRanger {
    options: CoverageOptions,
}

impl TileRanger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CoverageOptions) -> Self {
        TileRanger { options }
    }

    pub fn options(&self) -> &CoverageOptions {
        &self.options
    }

    /// The range a tile occupies at `zoom`
    pub fn tile_to_range(&self, tile: &Tile, zoom: u8) -> Result<TileRange> {
        check_zoom(zoom)?;
        check_zoom(tile.zoom)?;
        Ok(tile.to_range(zoom))
    }

    /// Lazily produces the disjoint lower-left ranges covering the footprint at `zoom`.
    ///
    /// Boxes and shapes that fill their bounding box produce a single range, other shapes are refined with a quadtree walk.
    /// Degenerate footprints produce no ranges.
    pub fn cover_footprint(&self, footprint: impl Into<Footprint>, zoom: u8) -> Result<TileRangeCoverage> {
        check_zoom(zoom)?;

        Ok(match footprint.into().into_plan(self.options.area_tolerance) {
            CoveragePlan::Empty => TileRangeCoverage::empty(zoom),
            CoveragePlan::Bbox(bbox) => TileRangeCoverage::single(bbox_to_tile_range(&bbox, zoom)),
            CoveragePlan::Shape { bbox, shape } => {
                let target = FootprintIntersection::new(shape, zoom, self.options.area_tolerance);
                TileRangeCoverage::walk(QuadtreeWalk::new(&bbox, zoom, target), zoom)
            }
        })
    }

    /// Lazily produces disjoint ranges at `zoom` that together cover the given range.
    ///
    /// When `zoom` is coarser than the zoom level of the range, the ranges covering it partially are included.
    pub fn cover_bbox(&self, range: &TileRange, zoom: u8) -> Result<TileRangeCoverage> {
        check_zoom(zoom)?;
        check_zoom(range.zoom)?;

        if range.is_empty() {
            return Ok(TileRangeCoverage::empty(zoom));
        }

        let bbox = tile_range_to_bbox(range);
        let target = RangeIntersection::new(*range, zoom);
        Ok(TileRangeCoverage::walk(QuadtreeWalk::new(&bbox, zoom, target), zoom))
    }

    /// The individual tiles covering the footprint at `zoom`, numbered according to the configured origin
    pub fn generate_tiles(&self, footprint: impl Into<Footprint>, zoom: u8) -> Result<TileEnumerator<TileRangeCoverage>> {
        Ok(TileEnumerator::new(self.cover_footprint(footprint, zoom)?).with_origin(self.options.origin))
    }
}

/// Lazy sequence of disjoint tile ranges produced by [`TileRanger`]
pub struct TileRangeCoverage {
    zoom: u8,
    single: Option<TileRange>,
    walk: Option<QuadtreeWalk>,
}

impl TileRangeCoverage {
    fn empty(zoom: u8) -> Self {
        TileRangeCoverage {
            zoom,
            single: None,
            walk: None,
        }
    }

    fn single(range: TileRange) -> Self {
        TileRangeCoverage {
            zoom: range.zoom,
            single: (!range.is_empty()).then_some(range),
            walk: None,
        }
    }

    fn walk(walk: QuadtreeWalk, zoom: u8) -> Self {
        TileRangeCoverage {
            zoom,
            single: None,
            walk: Some(walk),
        }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }
}

impl Iterator for TileRangeCoverage {
    type Item = TileRange;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(range) = self.single.take() {
            return Some(range);
        }

        let zoom = self.zoom;
        self.walk.as_mut()?.next().map(|tile| tile.to_range(zoom))
    }
}
