//! Quad key style tile hashes.
//!
//! A tile at zoom level `z` is encoded as `z + 1` base-4 digits, one per zoom level starting at level 0.
//! Each digit combines the x bit (value 1) and the y bit (value 2) of that level:
//!
//! ```text
//! zoom 0: | 0 | 1 |
//!
//! zoom 1: | 02 | 03 | 12 | 13 |
//!         | 00 | 01 | 10 | 11 |
//! ```
//!
//! A hash prefix therefore identifies the parent tile, which makes hashes usable as hierarchical keys.

use crate::{
    BBox, CoverageOptions, Error, Footprint, Result, Tile, TileRange,
    bboxtiler::bbox_to_tile_range,
    enumerator::TileEnumerator,
    footprint::CoveragePlan,
    quadtree::{FootprintIntersection, QuadtreeWalk, RangeIntersection},
    tilegrid::{MAX_ZOOM, check_zoom, tile_to_bbox},
};

/// Hash of a lower-left origin tile
pub fn encode_tile(tile: &Tile) -> String {
    (0..=tile.zoom)
        .rev()
        .map(|level| {
            let x_bit = (tile.x >> level) & 1;
            let y_bit = (tile.y >> level) & 1;
            char::from(b'0' + (x_bit + (y_bit << 1)) as u8)
        })
        .collect()
}

pub fn decode_tile(hash: &str) -> Result<Tile> {
    if hash.is_empty() {
        return Err(Error::InvalidArgument("empty tile hash".to_string()));
    }

    if hash.len() > MAX_ZOOM as usize + 1 {
        return Err(Error::InvalidZoom(format!("tile hash '{hash}' is too long")));
    }

    let mut x = 0;
    let mut y = 0;
    for c in hash.chars() {
        let digit = c
            .to_digit(4)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid digit '{c}' in tile hash '{hash}'")))? as i64;
        x = (x << 1) + (digit & 1);
        y = (y << 1) + (digit >> 1);
    }

    Ok(Tile::new(x, y, (hash.len() - 1) as u8))
}

/// The range the hashed tile occupies at `zoom`
pub fn decode_tile_range(hash: &str, zoom: u8) -> Result<TileRange> {
    check_zoom(zoom)?;
    Ok(decode_tile(hash)?.to_range(zoom))
}

pub fn decode_bbox(hash: &str) -> Result<BBox> {
    Ok(tile_to_bbox(&decode_tile(hash)?))
}

/// Covers areas with the hashes of the coarsest tiles that lie completely within them
#[derive(Debug, Clone, Default)]
pub struct TileHasher {
    options: CoverageOptions,
}

impl TileHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CoverageOptions) -> Self {
        TileHasher { options }
    }

    /// Hashes covering the tiles of `bbox` at `zoom`, no hash is deeper than `zoom`
    pub fn encode_bbox(&self, bbox: &BBox, zoom: u8) -> Result<TileHashes> {
        check_zoom(zoom)?;

        let bbox = bbox.normalized();
        if !bbox.is_valid() || bbox.is_empty() {
            return Ok(TileHashes::empty(zoom));
        }

        let bounding = bbox_to_tile_range(&bbox, zoom);
        Ok(TileHashes::walk(QuadtreeWalk::new(&bbox, zoom, RangeIntersection::new(bounding, zoom)), zoom))
    }

    pub fn encode_footprint(&self, footprint: impl Into<Footprint>, zoom: u8) -> Result<TileHashes> {
        check_zoom(zoom)?;

        match footprint.into().into_plan(self.options.area_tolerance) {
            CoveragePlan::Empty => Ok(TileHashes::empty(zoom)),
            CoveragePlan::Bbox(bbox) => self.encode_bbox(&bbox, zoom),
            CoveragePlan::Shape { bbox, shape } => {
                let target = FootprintIntersection::new(shape, zoom, self.options.area_tolerance);
                Ok(TileHashes::walk(QuadtreeWalk::new(&bbox, zoom, target), zoom))
            }
        }
    }

    /// The tiles at `zoom` covered by the hashes of the footprint, numbered according to the configured origin
    pub fn generate_tiles(&self, footprint: impl Into<Footprint>, zoom: u8) -> Result<TileEnumerator<HashRanges>> {
        let hashes = self.encode_footprint(footprint, zoom)?;
        Ok(TileEnumerator::new(hashes.into_ranges()).with_origin(self.options.origin))
    }
}

/// Lazy sequence of tile hashes produced by [`TileHasher`]
pub struct TileHashes {
    zoom: u8,
    walk: Option<QuadtreeWalk>,
}

impl TileHashes {
    fn empty(zoom: u8) -> Self {
        TileHashes { zoom, walk: None }
    }

    fn walk(walk: QuadtreeWalk, zoom: u8) -> Self {
        TileHashes { zoom, walk: Some(walk) }
    }

    /// The ranges at the target zoom level of the remaining hashes
    pub fn into_ranges(self) -> HashRanges {
        HashRanges { hashes: self }
    }

    fn next_tile(&mut self) -> Option<Tile> {
        self.walk.as_mut()?.next()
    }
}

impl Iterator for TileHashes {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_tile().map(|tile| encode_tile(&tile))
    }
}

/// Target zoom level ranges of a [`TileHashes`] sequence
pub struct HashRanges {
    hashes: TileHashes,
}

impl Iterator for HashRanges {
    type Item = TileRange;

    fn next(&mut self) -> Option<Self::Item> {
        let zoom = self.hashes.zoom;
        self.hashes.next_tile().map(|tile| tile.to_range(zoom))
    }
}
