use futures::{Stream, StreamExt};

use crate::{Tile, TileOrigin, TileRange, TileRangeTiles, tilegrid::flip_y_axis};

/// Flattens a sequence of lower-left tile ranges into individual tiles.
///
/// Ranges are visited in order, the tiles within a range column by column.
pub struct TileEnumerator<I> {
    ranges: I,
    current: Option<TileRangeTiles>,
    origin: TileOrigin,
}

impl<I: Iterator<Item = TileRange>> TileEnumerator<I> {
    pub fn new(ranges: impl IntoIterator<IntoIter = I>) -> Self {
        TileEnumerator {
            ranges: ranges.into_iter(),
            current: None,
            origin: TileOrigin::LowerLeft,
        }
    }

    /// Numbers the produced tiles according to `origin`
    pub fn with_origin(mut self, origin: TileOrigin) -> Self {
        self.origin = origin;
        self
    }
}

impl<I: Iterator<Item = TileRange>> Iterator for TileEnumerator<I> {
    type Item = Tile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tile) = self.current.as_mut().and_then(Iterator::next) {
                return Some(match self.origin {
                    TileOrigin::LowerLeft => tile,
                    TileOrigin::UpperLeft => flip_y_axis(&tile),
                });
            }

            self.current = Some(self.ranges.next()?.tiles());
        }
    }
}

/// Asynchronous variant of [`TileEnumerator`] for ranges that arrive as a stream
pub fn tiles_stream<S>(ranges: S) -> impl Stream<Item = Tile>
where
    S: Stream<Item = TileRange>,
{
    ranges.flat_map(|range| futures::stream::iter(range.tiles()))
}
