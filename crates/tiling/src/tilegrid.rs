//! Conversions between WGS84 degrees and tile indices of the 2:1 plate carrée pyramid.
//!
//! Zoom level 0 consists of two 180x180 degree tiles, every next level halves the tile size.

use crate::{BBox, Coordinate, Error, Result, Tile, TileOrigin};

/// Pixel width and height of a tile
pub const TILE_SIZE: u16 = 256;
/// Deepest zoom level the tile indices of the grid support
pub const MAX_ZOOM: u8 = 30;
/// Deepest zoom level of the resolution tables
pub const MAX_RESOLUTION_ZOOM: u8 = 22;

const RESOLUTION_DEG: [f64; MAX_RESOLUTION_ZOOM as usize + 1] = [
    0.703125,
    0.3515625,
    0.17578125,
    0.087890625,
    0.0439453125,
    0.02197265625,
    0.010986328125,
    0.0054931640625,
    0.00274658203125,
    0.001373291015625,
    0.0006866455078125,
    0.00034332275390625,
    0.000171661376953125,
    0.0000858306884765625,
    0.0000429153442382812,
    0.0000214576721191406,
    0.0000107288360595703,
    0.00000536441802978516,
    0.00000268220901489258,
    0.00000134110450744629,
    0.000000670552253723145,
    0.000000335276126861572,
    0.000000167638063430786,
];

const RESOLUTION_METER: [f64; MAX_RESOLUTION_ZOOM as usize + 1] = [
    78271.52, 39135.76, 19567.88, 9783.94, 4891.97, 2445.98, 1222.99, 611.5, 305.75, 152.87, 76.44, 38.22, 19.11, 9.55, 4.78, 2.39,
    1.19, 0.6, 0.3, 0.15, 0.075, 0.037, 0.0185,
];

/// How a resolution that falls between two zoom levels is mapped onto a zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ZoomLevelStrategy {
    /// The zoom level with a resolution at least as fine as the requested one
    PreferHigher,
    /// The zoom level with a resolution at least as coarse as the requested one
    #[default]
    PreferLower,
    Closest,
}

/// Fails with [`Error::InvalidZoom`] for zoom levels beyond [`MAX_ZOOM`]
pub fn check_zoom(zoom: u8) -> Result {
    if zoom > MAX_ZOOM {
        return Err(Error::InvalidZoom(format!("{zoom} exceeds the maximum zoom level {MAX_ZOOM}")));
    }

    Ok(())
}

fn tiles_per_row_half(zoom: u8) -> f64 {
    f64::powi(2.0, zoom as i32)
}

/// Edge length of a tile in degrees
pub fn degrees_per_tile(zoom: u8) -> f64 {
    180.0 / tiles_per_row_half(zoom)
}

pub fn degrees_per_pixel(zoom: u8) -> f64 {
    degrees_per_tile(zoom) / TILE_SIZE as f64
}

/// The tile containing the coordinate.
///
/// Coordinates on a tile boundary belong to the tile that starts at that boundary.
pub fn degrees_to_tile(coord: Coordinate, zoom: u8, origin: TileOrigin) -> Tile {
    let tile_size = degrees_per_tile(zoom);
    let latitude = match origin {
        TileOrigin::LowerLeft => coord.latitude,
        TileOrigin::UpperLeft => -coord.latitude,
    };

    let x = coord.longitude / tile_size + tiles_per_row_half(zoom);
    let y = if zoom == 0 {
        latitude / tile_size + 0.5
    } else {
        latitude / tile_size + tiles_per_row_half(zoom - 1)
    };

    Tile::new(x.floor() as i64, y.floor() as i64, zoom)
}

/// The corner of the tile that lies on the grid origin side.
///
/// For lower-left tiles this is the south-west corner, for upper-left tiles the north-west corner.
pub fn tile_to_degrees(tile: &Tile, origin: TileOrigin) -> Coordinate {
    let tile_size = degrees_per_tile(tile.zoom);
    let longitude = tile.x as f64 * tile_size - 180.0;
    let latitude = tile.y as f64 * tile_size - 90.0;

    match origin {
        TileOrigin::LowerLeft => Coordinate::latlon(latitude, longitude),
        TileOrigin::UpperLeft => Coordinate::latlon(-latitude, longitude),
    }
}

/// Extent of a lower-left origin tile
pub fn tile_to_bbox(tile: &Tile) -> BBox {
    let min = tile_to_degrees(tile, TileOrigin::LowerLeft);
    let tile_size = degrees_per_tile(tile.zoom);
    BBox::new(min.longitude, min.latitude, min.longitude + tile_size, min.latitude + tile_size)
}

/// Converts the row index between the lower-left and upper-left numbering, the operation is its own inverse.
///
/// The tile zoom level must not exceed [`MAX_ZOOM`].
pub fn flip_y_axis(tile: &Tile) -> Tile {
    let rows = 1_i64 << tile.zoom;
    Tile::new(tile.x, rows - tile.y - 1, tile.zoom)
}

/// The zoom level matching a pixel resolution in degrees
pub fn zoom_level_for_resolution(resolution_deg: f64, strategy: ZoomLevelStrategy) -> Result<u8> {
    if !resolution_deg.is_finite() || resolution_deg <= 0.0 {
        return Err(Error::InvalidZoom(format!("no zoom level matches resolution {resolution_deg}")));
    }

    let zoom = (180.0 / (resolution_deg * TILE_SIZE as f64)).log2();
    let zoom = match strategy {
        ZoomLevelStrategy::PreferHigher => zoom.ceil(),
        ZoomLevelStrategy::PreferLower => zoom.floor(),
        ZoomLevelStrategy::Closest => zoom.round(),
    };

    if !(0.0..=MAX_ZOOM as f64).contains(&zoom) {
        return Err(Error::InvalidZoom(format!("resolution {resolution_deg} maps to zoom level {zoom}")));
    }

    Ok(zoom as u8)
}

/// Pixel size in degrees of the given zoom level
pub fn resolution_deg_for_zoom(zoom: u8) -> Result<f64> {
    RESOLUTION_DEG
        .get(zoom as usize)
        .copied()
        .ok_or_else(|| Error::InvalidZoom(format!("no resolution known for zoom level {zoom}")))
}

/// Approximate pixel size in meters at the equator of the given zoom level
pub fn resolution_meter_for_zoom(zoom: u8) -> Result<f64> {
    RESOLUTION_METER
        .get(zoom as usize)
        .copied()
        .ok_or_else(|| Error::InvalidZoom(format!("no resolution known for zoom level {zoom}")))
}
