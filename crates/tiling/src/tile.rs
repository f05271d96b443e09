//! Tile and tile range value types of the 2:1 WGS84 tile pyramid.

/// Row numbering of the tile grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum TileOrigin {
    /// Row 0 is the southernmost row, latitude increases with y
    #[default]
    LowerLeft,
    /// Row 0 is the northernmost row (XYZ raster convention)
    UpperLeft,
}

/// A single cell of the tile pyramid.
///
/// At zoom level `z` a lower-left grid has `2^(z+1)` columns and `2^z` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub x: i64,
    pub y: i64,
    pub zoom: u8,
}

impl Tile {
    pub const fn new(x: i64, y: i64, zoom: u8) -> Self {
        Tile { x, y, zoom }
    }

    pub fn x(&self) -> i64 {
        self.x
    }

    pub fn y(&self) -> i64 {
        self.y
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// The four tiles of the next zoom level, in `(2x, 2y), (2x+1, 2y), (2x, 2y+1), (2x+1, 2y+1)` order
    pub fn direct_children(&self) -> [Tile; 4] {
        let x = self.x << 1;
        let y = self.y << 1;
        let zoom = self.zoom + 1;

        [
            Tile { x, y, zoom },
            Tile { x: x + 1, y, zoom },
            Tile { x, y: y + 1, zoom },
            Tile { x: x + 1, y: y + 1, zoom },
        ]
    }

    pub fn parent(&self) -> Option<Tile> {
        if self.zoom == 0 {
            return None;
        }

        Some(Tile {
            x: self.x >> 1,
            y: self.y >> 1,
            zoom: self.zoom - 1,
        })
    }

    /// Converts the tile to the range it occupies at `zoom`.
    ///
    /// Upsampling turns the tile into a `2^dz x 2^dz` block, downsampling collapses it to the single covering tile.
    pub fn to_range(&self, zoom: u8) -> TileRange {
        if self.zoom < zoom {
            let dz = zoom - self.zoom;
            TileRange {
                min_x: self.x << dz,
                min_y: self.y << dz,
                max_x: (self.x + 1) << dz,
                max_y: (self.y + 1) << dz,
                zoom,
            }
        } else {
            let dz = self.zoom - zoom;
            let x = self.x >> dz;
            let y = self.y >> dz;
            TileRange::new(x, y, x + 1, y + 1, zoom)
        }
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Half-open rectangular block of tiles at one zoom level.
///
/// A tile `(x, y)` is part of the range when `min_x <= x < max_x` and `min_y <= y < max_y`.
/// Zero width or zero height ranges are valid values that contain no tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TileRange {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
    pub zoom: u8,
}

impl TileRange {
    pub const fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64, zoom: u8) -> Self {
        TileRange {
            min_x,
            min_y,
            max_x,
            max_y,
            zoom,
        }
    }

    pub fn width(&self) -> i64 {
        (self.max_x - self.min_x).max(0)
    }

    pub fn height(&self) -> i64 {
        (self.max_y - self.min_y).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Number of tiles in the range
    pub fn tile_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn contains(&self, tile: &Tile) -> bool {
        tile.zoom == self.zoom && tile.x >= self.min_x && tile.x < self.max_x && tile.y >= self.min_y && tile.y < self.max_y
    }

    /// The overlapping part of two ranges at the same zoom level, empty when they do not overlap
    pub fn intersection(&self, other: &TileRange) -> TileRange {
        debug_assert_eq!(self.zoom, other.zoom);

        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        TileRange {
            min_x,
            min_y,
            max_x: self.max_x.min(other.max_x).max(min_x),
            max_y: self.max_y.min(other.max_y).max(min_y),
            zoom: self.zoom,
        }
    }

    /// The range covering the same area at another zoom level.
    ///
    /// When moving to a lower zoom level the result is the smallest range that covers the original one.
    pub fn to_zoom(&self, zoom: u8) -> TileRange {
        if zoom >= self.zoom {
            let dz = zoom - self.zoom;
            return TileRange {
                min_x: self.min_x << dz,
                min_y: self.min_y << dz,
                max_x: self.max_x << dz,
                max_y: self.max_y << dz,
                zoom,
            };
        }

        if self.is_empty() {
            return TileRange::new(self.min_x, self.min_y, self.min_x, self.min_y, zoom);
        }

        let dz = self.zoom - zoom;
        TileRange {
            min_x: self.min_x >> dz,
            min_y: self.min_y >> dz,
            max_x: ((self.max_x - 1) >> dz) + 1,
            max_y: ((self.max_y - 1) >> dz) + 1,
            zoom,
        }
    }

    /// Iterates the tiles of the range, column by column
    pub fn tiles(&self) -> TileRangeTiles {
        TileRangeTiles::new(*self)
    }
}

impl From<Tile> for TileRange {
    fn from(tile: Tile) -> Self {
        tile.to_range(tile.zoom)
    }
}

impl std::fmt::Display for TileRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/[{}..{})/[{}..{})", self.zoom, self.min_x, self.max_x, self.min_y, self.max_y)
    }
}

/// Iterator over the tiles of a [`TileRange`], the y index varies fastest
#[derive(Debug, Clone)]
pub struct TileRangeTiles {
    range: TileRange,
    x: i64,
    y: i64,
}

impl TileRangeTiles {
    fn new(range: TileRange) -> Self {
        TileRangeTiles {
            range,
            x: range.min_x,
            y: range.min_y,
        }
    }
}

impl Iterator for TileRangeTiles {
    type Item = Tile;

    fn next(&mut self) -> Option<Self::Item> {
        if self.range.is_empty() || self.x >= self.range.max_x {
            return None;
        }

        let tile = Tile::new(self.x, self.y, self.range.zoom);
        self.y += 1;
        if self.y >= self.range.max_y {
            self.y = self.range.min_y;
            self.x += 1;
        }

        Some(tile)
    }
}
