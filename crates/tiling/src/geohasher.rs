//! Covering footprints with variable precision GeoHash cells.
//!
//! Cells that lie completely within the footprint are kept at the coarsest possible precision, cells that
//! are cut by the footprint boundary are refined until the precision matches the tile size of the target zoom level.

use approx::relative_eq;
use geo_types::{Coord, MultiPolygon};

use crate::{
    BBox, CoverageOptions, Error, Footprint, Result, Tile, TileOrigin, TileRange, TileRangeTiles,
    bboxtiler::snap_to_tile_grid,
    geometry,
    tilegrid::{check_zoom, degrees_to_tile},
};

/// Default zoom level matched by the deepest hashes
pub const MAX_STANDARD_ZOOM: u8 = 21;
/// Longest hash supported by the GeoHash encoding
pub const MAX_PRECISION: usize = 12;

/// Hash length at which a cell is no larger than a tile of the zoom level
pub fn precision_for_zoom(zoom: u8) -> Result<usize> {
    let mut precision = 2 * (zoom as usize + 1) / 5;
    match zoom % 5 {
        0 => {}
        1..=3 => precision += 1,
        _ => precision += 2,
    }

    let precision = precision.max(1);
    if precision > MAX_PRECISION {
        return Err(Error::InvalidZoom(format!(
            "zoom level {zoom} requires geohash precision {precision}, the maximum is {MAX_PRECISION}"
        )));
    }

    Ok(precision)
}

/// Extent of a geohash cell
pub fn decode_geohash(hash: &str) -> Result<BBox> {
    let rect = geohash::decode_bbox(hash).map_err(|e| Error::InvalidArgument(format!("invalid geohash '{hash}': {e}")))?;
    Ok(BBox::from(rect))
}

/// The cells of the given precision that overlap the box, from south-west to north-east, row by row.
///
/// Cells that only touch the east or north edge of the box are included.
pub fn bounding_hashes(bbox: &BBox, precision: usize) -> Result<Vec<String>> {
    let bbox = bbox.normalized();
    let lon_bits = (5 * precision).div_ceil(2) as i32;
    let lat_bits = (5 * precision / 2) as i32;
    let columns = 1_i64 << lon_bits;
    let rows = 1_i64 << lat_bits;
    let cell_width = 360.0 / columns as f64;
    let cell_height = 180.0 / rows as f64;

    let cell_index = |v: f64, min: f64, size: f64, count: i64| (((v - min) / size).floor() as i64).clamp(0, count - 1);
    let min_x = cell_index(bbox.min_lon, -180.0, cell_width, columns);
    let max_x = cell_index(bbox.max_lon, -180.0, cell_width, columns);
    let min_y = cell_index(bbox.min_lat, -90.0, cell_height, rows);
    let max_y = cell_index(bbox.max_lat, -90.0, cell_height, rows);

    let mut hashes = Vec::with_capacity(((max_x - min_x + 1) * (max_y - min_y + 1)) as usize);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let center = Coord {
                x: -180.0 + (x as f64 + 0.5) * cell_width,
                y: -90.0 + (y as f64 + 0.5) * cell_height,
            };

            hashes.push(geohash::encode(center, precision).map_err(|e| Error::Geometry(e.to_string()))?);
        }
    }

    Ok(hashes)
}

/// Produces geohash coverings of footprints and the tiles they span
#[derive(Debug, Clone, Default)]
pub struct GeoHasher {
    options: CoverageOptions,
}

impl GeoHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CoverageOptions) -> Self {
        GeoHasher { options }
    }

    /// Lazily produces the hashes covering the footprint, the deepest hashes match tiles of `max_tile_zoom`
    pub fn cover(&self, footprint: impl Into<Footprint>, max_tile_zoom: u8) -> Result<GeoHashCoverage> {
        check_zoom(max_tile_zoom)?;
        let max_precision = precision_for_zoom(max_tile_zoom)?;

        let footprint = footprint.into();
        let bbox = match footprint.bbox() {
            Some(bbox) if !footprint.is_degenerate() => snap_to_tile_grid(&bbox, max_tile_zoom),
            _ => {
                log::debug!("Degenerate footprint produces no geohashes");
                return Ok(GeoHashCoverage::empty(max_precision, self.options.area_tolerance));
            }
        };

        log::debug!("Geohash cover of {bbox} up to precision {max_precision}");
        let hashes = bounding_hashes(&bbox, 1)?;
        Ok(GeoHashCoverage {
            footprint: footprint.to_multi_polygon(),
            max_precision,
            area_tolerance: self.options.area_tolerance,
            frames: vec![HashFrame {
                precision: 1,
                parent: String::new(),
                bbox,
                hashes: hashes.into_iter(),
            }],
        })
    }

    /// Tiles at `zoom` spanned by the geohash cover of the footprint, numbered according to the configured origin
    pub fn tiles(&self, footprint: impl Into<Footprint>, zoom: u8) -> Result<GeoHashTiles> {
        Ok(GeoHashTiles {
            hashes: self.cover(footprint, zoom)?,
            zoom,
            origin: self.options.origin,
            current: None,
        })
    }
}

/// Cells of one precision level that are still to be visited
struct HashFrame {
    precision: usize,
    parent: String,
    bbox: BBox,
    hashes: std::vec::IntoIter<String>,
}

/// Lazy depth first geohash covering produced by [`GeoHasher::cover`]
pub struct GeoHashCoverage {
    footprint: MultiPolygon<f64>,
    max_precision: usize,
    area_tolerance: f64,
    frames: Vec<HashFrame>,
}

impl GeoHashCoverage {
    fn empty(max_precision: usize, area_tolerance: f64) -> Self {
        GeoHashCoverage {
            footprint: MultiPolygon::new(Vec::new()),
            max_precision,
            area_tolerance,
            frames: Vec::new(),
        }
    }

    fn visit(&mut self, hash: String, precision: usize, bbox: BBox) -> Result<Option<String>> {
        let cell_bbox = decode_geohash(&hash)?;
        let cell = MultiPolygon::from(cell_bbox.to_polygon());
        let Some(intersection) = geometry::intersect(&self.footprint, &cell) else {
            return Ok(None);
        };

        if precision >= self.max_precision
            || relative_eq!(
                geometry::area(&intersection),
                geometry::area(&cell),
                max_relative = self.area_tolerance
            )
        {
            return Ok(Some(hash));
        }

        if let Some(sub_bbox) = cell_bbox.intersection(&bbox) {
            let hashes = bounding_hashes(&sub_bbox, precision + 1)?;
            self.frames.push(HashFrame {
                precision: precision + 1,
                parent: hash,
                bbox: sub_bbox,
                hashes: hashes.into_iter(),
            });
        }

        Ok(None)
    }
}

impl Iterator for GeoHashCoverage {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.frames.last_mut()?;
            let Some(hash) = frame.hashes.next() else {
                self.frames.pop();
                continue;
            };

            // Neighbouring cells outside the parent cell are covered by their own parent
            if !hash.starts_with(&frame.parent) {
                continue;
            }

            let (precision, bbox) = (frame.precision, frame.bbox);
            match self.visit(hash, precision, bbox) {
                Ok(Some(hash)) => return Some(Ok(hash)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// The tiles spanned by a geohash cell at `zoom`
fn hash_tile_range(cell: &BBox, zoom: u8, origin: TileOrigin) -> TileRange {
    let a = degrees_to_tile(cell.min_corner(), zoom, origin);
    let b = degrees_to_tile(cell.max_corner(), zoom, origin);

    TileRange::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y), zoom)
}

/// Lazy sequence of the tiles spanned by a geohash covering
pub struct GeoHashTiles {
    hashes: GeoHashCoverage,
    zoom: u8,
    origin: TileOrigin,
    current: Option<TileRangeTiles>,
}

impl Iterator for GeoHashTiles {
    type Item = Result<Tile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tile) = self.current.as_mut().and_then(Iterator::next) {
                return Some(Ok(tile));
            }

            let cell = match self.hashes.next()?.and_then(|hash| decode_geohash(&hash)) {
                Ok(cell) => cell,
                Err(e) => return Some(Err(e)),
            };

            self.current = Some(hash_tile_range(&cell, self.zoom, self.origin).tiles());
        }
    }
}
