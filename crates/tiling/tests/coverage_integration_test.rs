use std::collections::HashSet;

use futures::StreamExt;
use geo_types::{MultiPolygon, polygon};
use tiling::{
    BBox, CoverageOptions, Footprint, GeoHasher, Result, Tile, TileBatcher, TileEnumerator, TileHasher, TileOrigin, TileRange,
    TileRanger, bboxtiler::bbox_to_tile_range, geometry, tile_batch_stream, tilegrid::tile_to_bbox, tiles_stream,
};

fn lake() -> Footprint {
    Footprint::from(polygon![
        (x: 3.1, y: 50.2),
        (x: 4.9, y: 50.9),
        (x: 5.8, y: 50.3),
        (x: 5.1, y: 49.6),
        (x: 4.2, y: 49.9),
        (x: 3.6, y: 49.5),
    ])
}

/// Every tile of the bounding range that shares a surface with the footprint
fn brute_force_tiles(footprint: &Footprint, zoom: u8) -> HashSet<Tile> {
    let shape = footprint.to_multi_polygon();
    let bbox = footprint.bbox().expect("non empty footprint");

    bbox_to_tile_range(&bbox, zoom)
        .tiles()
        .filter(|tile| geometry::intersect(&shape, &MultiPolygon::from(tile_to_bbox(tile).to_polygon())).is_some())
        .collect()
}

#[test_log::test]
fn ranges_partition_the_footprint() -> Result {
    for zoom in [4, 7, 9] {
        let ranges: Vec<TileRange> = TileRanger::new().cover_footprint(lake(), zoom)?.collect();
        assert!(ranges.iter().all(|range| range.zoom == zoom && !range.is_empty()));

        let tiles: Vec<Tile> = TileEnumerator::new(ranges.iter().copied()).collect();
        let unique: HashSet<Tile> = tiles.iter().copied().collect();
        assert_eq!(unique.len(), tiles.len(), "ranges overlap at zoom {zoom}");
        assert_eq!(unique, brute_force_tiles(&lake(), zoom), "zoom {zoom}");
    }

    Ok(())
}

#[test]
fn hasher_and_ranger_agree() -> Result {
    let zoom = 8;
    let from_ranges: Vec<Tile> = TileRanger::new().generate_tiles(lake(), zoom)?.collect();
    let from_hashes: Vec<Tile> = TileHasher::new().generate_tiles(lake(), zoom)?.collect();
    assert_eq!(from_ranges, from_hashes);

    let hashes: Vec<String> = TileHasher::new().encode_footprint(lake(), zoom)?.collect();
    let ranges: Vec<TileRange> = TileRanger::new().cover_footprint(lake(), zoom)?.collect();
    assert_eq!(hashes.len(), ranges.len());
    for (hash, range) in hashes.iter().zip(&ranges) {
        assert_eq!(tiling::tilehasher::decode_tile_range(hash, zoom)?, *range);
    }

    Ok(())
}

#[test]
fn upper_left_tiles_are_flipped() -> Result {
    let zoom = 6;
    let ranger = TileRanger::with_options(CoverageOptions::builder().origin(TileOrigin::UpperLeft).build());

    let lower_left: Vec<Tile> = TileRanger::new().generate_tiles(lake(), zoom)?.collect();
    let upper_left: Vec<Tile> = ranger.generate_tiles(lake(), zoom)?.collect();
    let flipped: Vec<Tile> = lower_left.iter().map(tiling::tilegrid::flip_y_axis).collect();
    assert_eq!(upper_left, flipped);
    Ok(())
}

#[test]
fn batches_cover_every_tile_once() -> Result {
    let zoom = 9;
    let ranges: Vec<TileRange> = TileRanger::new().cover_footprint(lake(), zoom)?.collect();
    let total: u64 = ranges.iter().map(TileRange::tile_count).sum();

    let batches: Vec<Vec<TileRange>> = TileBatcher::new(7, ranges.iter().copied())?.collect();
    let sizes: Vec<u64> = batches.iter().map(|batch| batch.iter().map(TileRange::tile_count).sum()).collect();
    assert_eq!(sizes.iter().sum::<u64>(), total);
    assert!(sizes[..sizes.len() - 1].iter().all(|&size| size == 7));

    let batched: HashSet<Tile> = batches.iter().flatten().flat_map(TileRange::tiles).collect();
    assert_eq!(batched, brute_force_tiles(&lake(), zoom));
    Ok(())
}

#[tokio::test]
async fn async_pipeline_matches_iterators() -> Result {
    let zoom = 7;
    let ranges: Vec<TileRange> = TileRanger::new().cover_footprint(lake(), zoom)?.collect();

    let tiles: Vec<Tile> = tiles_stream(futures::stream::iter(ranges.clone())).collect().await;
    let expected: Vec<Tile> = TileEnumerator::new(ranges.iter().copied()).collect();
    assert_eq!(tiles, expected);

    let batches: Vec<Vec<TileRange>> = tile_batch_stream(7, futures::stream::iter(ranges.clone()))?.collect().await;
    let expected: Vec<Vec<TileRange>> = TileBatcher::new(7, ranges)?.collect();
    assert_eq!(batches, expected);
    Ok(())
}

#[test]
fn range_cover_at_coarser_zoom_contains_range() -> Result {
    let range = TileRange::new(37, 11, 53, 20, 6);
    let ranges: Vec<TileRange> = TileRanger::new().cover_bbox(&range, 4)?.collect();
    let covered: HashSet<Tile> = ranges.iter().flat_map(|r| r.to_zoom(6).tiles()).collect();

    for tile in range.tiles() {
        assert!(covered.contains(&tile), "{tile} is not covered");
    }

    let exact: Vec<TileRange> = TileRanger::new().cover_bbox(&range, 6)?.collect();
    assert_eq!(exact.iter().map(TileRange::tile_count).sum::<u64>(), range.tile_count());
    Ok(())
}

#[test]
fn geohash_tiles_lie_within_footprint() -> Result {
    let zoom = 7;
    let tiles: Vec<Tile> = GeoHasher::new().tiles(lake(), zoom)?.collect::<Result<_>>()?;
    assert!(!tiles.is_empty());

    let touched = brute_force_tiles(&lake(), zoom);
    for tile in &tiles {
        assert!(touched.contains(tile), "{tile} does not touch the footprint");
    }
    Ok(())
}

#[test]
fn bbox_and_polygon_footprints_are_equivalent() -> Result {
    let bbox = BBox::new(2.5, 49.5, 6.4, 51.5);
    let from_bbox: Vec<TileRange> = TileRanger::new().cover_footprint(bbox, 10)?.collect();
    let from_polygon: Vec<TileRange> = TileRanger::new().cover_footprint(bbox.to_polygon(), 10)?.collect();

    assert_eq!(from_bbox, from_polygon);
    assert_eq!(from_bbox, vec![bbox_to_tile_range(&bbox, 10)]);
    Ok(())
}
