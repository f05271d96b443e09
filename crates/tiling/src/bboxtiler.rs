use crate::{
    BBox, Error, Result, Tile, TileOrigin, TileRange,
    tilegrid::{degrees_per_tile, degrees_to_tile, tile_to_degrees},
};

/// Expands the box outward to the nearest tile boundaries of the zoom level.
///
/// Coordinates already on a boundary are kept. At zoom level 0 the latitude extent always spans the full [-90, 90] row.
pub fn snap_to_tile_grid(bbox: &BBox, zoom: u8) -> BBox {
    let bbox = bbox.normalized();
    let tile_size = degrees_per_tile(zoom);
    let snap_down = |v: f64| (v / tile_size).floor() * tile_size;
    let snap_up = |v: f64| (v / tile_size).ceil() * tile_size;

    let mut snapped = BBox::new(snap_down(bbox.min_lon), snap_down(bbox.min_lat), snap_up(bbox.max_lon), snap_up(bbox.max_lat));
    if zoom == 0 {
        snapped.min_lat = -90.0;
        snapped.max_lat = 90.0;
    }

    snapped
}

/// The lower-left origin tiles covering the box
pub fn bbox_to_tile_range(bbox: &BBox, zoom: u8) -> TileRange {
    let snapped = snap_to_tile_grid(bbox, zoom);
    let min_tile = degrees_to_tile(snapped.min_corner(), zoom, TileOrigin::LowerLeft);
    let max_tile = degrees_to_tile(snapped.max_corner(), zoom, TileOrigin::LowerLeft);

    TileRange::new(min_tile.x, min_tile.y, max_tile.x, max_tile.y, zoom)
}

/// Extent of a lower-left tile range
pub fn tile_range_to_bbox(range: &TileRange) -> BBox {
    let min = tile_to_degrees(&Tile::new(range.min_x, range.min_y, range.zoom), TileOrigin::LowerLeft);
    let max = tile_to_degrees(&Tile::new(range.max_x, range.max_y, range.zoom), TileOrigin::LowerLeft);

    BBox::new(min.longitude, min.latitude, max.longitude, max.latitude)
}

/// Extent spanned by two lower-left tiles, both tiles are included
pub fn bbox_from_tiles(first: &Tile, second: &Tile) -> Result<BBox> {
    if first.zoom != second.zoom {
        return Err(Error::MismatchedZoom {
            first: first.zoom,
            second: second.zoom,
        });
    }

    let tile_size = degrees_per_tile(first.zoom);
    let a = tile_to_degrees(first, TileOrigin::LowerLeft);
    let b = tile_to_degrees(second, TileOrigin::LowerLeft);

    Ok(BBox::new(
        a.longitude.min(b.longitude),
        a.latitude.min(b.latitude),
        a.longitude.max(b.longitude) + tile_size,
        a.latitude.max(b.latitude) + tile_size,
    ))
}
