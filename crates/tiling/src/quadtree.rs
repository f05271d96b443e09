//! Depth first quadtree refinement shared by the range and hash coverage generators.
//!
//! The walk starts from the tiles covering the area at a coarse seed zoom level and splits every
//! partially covered tile into its four children until the target zoom level is reached.
//! Only fully covered tiles are handed out, so coarse tiles are kept wherever the area allows it.

use approx::relative_eq;
use geo_types::MultiPolygon;

use crate::{
    BBox, Tile, TileRange, TileRangeTiles,
    bboxtiler::bbox_to_tile_range,
    geometry,
    tilegrid::tile_to_bbox,
};

/// How a tile relates to the covered area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionState {
    /// The tile lies completely within the area
    Full,
    /// Part of the tile lies within the area
    Partial,
    None,
}

/// Classifies tiles against the area being covered
pub trait TileIntersection {
    fn intersection(&self, tile: &Tile) -> IntersectionState;
}

/// Classifies tiles by clipping them against a polygonal footprint
pub struct FootprintIntersection {
    footprint: MultiPolygon<f64>,
    max_zoom: u8,
    area_tolerance: f64,
}

impl FootprintIntersection {
    pub fn new(footprint: MultiPolygon<f64>, max_zoom: u8, area_tolerance: f64) -> Self {
        FootprintIntersection {
            footprint,
            max_zoom,
            area_tolerance,
        }
    }
}

impl TileIntersection for FootprintIntersection {
    fn intersection(&self, tile: &Tile) -> IntersectionState {
        let tile_shape = MultiPolygon::from(tile_to_bbox(tile).to_polygon());
        let Some(intersection) = geometry::intersect(&self.footprint, &tile_shape) else {
            return IntersectionState::None;
        };

        if tile.zoom >= self.max_zoom {
            return IntersectionState::Full;
        }

        if relative_eq!(
            geometry::area(&intersection),
            geometry::area(&tile_shape),
            max_relative = self.area_tolerance
        ) {
            IntersectionState::Full
        } else {
            IntersectionState::Partial
        }
    }
}

/// Classifies tiles against a tile range, tiles at `max_zoom` that overlap the range count as full
pub struct RangeIntersection {
    range: TileRange,
    max_zoom: u8,
}

impl RangeIntersection {
    pub fn new(range: TileRange, max_zoom: u8) -> Self {
        RangeIntersection { range, max_zoom }
    }
}

impl TileIntersection for RangeIntersection {
    fn intersection(&self, tile: &Tile) -> IntersectionState {
        let state = if tile.zoom <= self.range.zoom {
            let block = tile.to_range(self.range.zoom);
            let overlap = block.intersection(&self.range);
            if overlap.is_empty() {
                IntersectionState::None
            } else if overlap == block {
                IntersectionState::Full
            } else {
                IntersectionState::Partial
            }
        } else if self.range.to_zoom(tile.zoom).contains(tile) {
            IntersectionState::Full
        } else {
            IntersectionState::None
        };

        if state == IntersectionState::Partial && tile.zoom >= self.max_zoom {
            IntersectionState::Full
        } else {
            state
        }
    }
}

/// Zoom level at which the walk starts for an area spanning `bounding` at the target zoom level
pub(crate) fn seed_zoom(bounding: &TileRange, zoom: u8) -> u8 {
    let dx = bounding.width();
    let dy = bounding.height();
    if dx == 0 || dy == 0 {
        return zoom;
    }

    let zoom = zoom as i64;
    let min_x_zoom = ((zoom + 1) / dx - 1).max(0);
    let min_y_zoom = (zoom / dy).max(0);
    min_x_zoom.min(min_y_zoom).min(zoom) as u8
}

/// Depth first walk yielding the fully covered tiles of an area, coarsest possible zoom level first
pub struct QuadtreeWalk {
    target: Box<dyn TileIntersection>,
    zoom: u8,
    seeds: TileRangeTiles,
    pending: Vec<Tile>,
}

impl QuadtreeWalk {
    /// Walks the tiles of `bbox` down to `zoom`, `target` decides which tiles are kept or refined
    pub fn new(bbox: &BBox, zoom: u8, target: impl TileIntersection + 'static) -> Self {
        let bounding = bbox_to_tile_range(bbox, zoom);
        let start_zoom = seed_zoom(&bounding, zoom);
        let seeds = bbox_to_tile_range(bbox, start_zoom);
        log::debug!("Quadtree walk of {bbox} to zoom {zoom} starts from {seeds}");

        QuadtreeWalk {
            target: Box::new(target),
            zoom,
            seeds: seeds.tiles(),
            pending: Vec::new(),
        }
    }
}

impl Iterator for QuadtreeWalk {
    type Item = Tile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let tile = match self.pending.pop() {
                Some(tile) => tile,
                None => self.seeds.next()?,
            };

            match self.target.intersection(&tile) {
                IntersectionState::Full => return Some(tile),
                IntersectionState::Partial if tile.zoom < self.zoom => {
                    // Reversed so the first child is visited first
                    self.pending.extend(tile.direct_children().into_iter().rev());
                }
                IntersectionState::Partial => return Some(tile),
                IntersectionState::None => {}
            }
        }
    }
}
