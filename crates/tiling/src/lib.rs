#![warn(clippy::unwrap_used)]

pub type Error = inf::Error;
pub type Result<T = ()> = inf::Result<T>;

pub mod batcher;
mod bbox;
pub mod bboxtiler;
mod coordinate;
pub mod enumerator;
mod footprint;
pub mod geohasher;
pub mod geometry;
mod options;
pub mod quadtree;
mod tile;
pub mod tilecount;
pub mod tilegrid;
pub mod tilehasher;
mod tileranger;

#[doc(inline)]
pub use batcher::TileBatcher;
#[doc(inline)]
pub use batcher::tile_batch_stream;
#[doc(inline)]
pub use bbox::BBox;
pub use coordinate::Coordinate;
#[doc(inline)]
pub use enumerator::TileEnumerator;
#[doc(inline)]
pub use enumerator::tiles_stream;
#[doc(inline)]
pub use footprint::Footprint;
#[doc(inline)]
pub use geohasher::GeoHasher;
#[doc(inline)]
pub use options::CoverageOptions;
pub use options::DEFAULT_AREA_TOLERANCE;
#[doc(inline)]
pub use quadtree::IntersectionState;
#[doc(inline)]
pub use tile::Tile;
#[doc(inline)]
pub use tile::TileOrigin;
#[doc(inline)]
pub use tile::TileRange;
pub use tile::TileRangeTiles;
#[doc(inline)]
pub use tilegrid::ZoomLevelStrategy;
#[doc(inline)]
pub use tilehasher::TileHasher;
#[doc(inline)]
pub use tileranger::TileRangeCoverage;
#[doc(inline)]
pub use tileranger::TileRanger;
