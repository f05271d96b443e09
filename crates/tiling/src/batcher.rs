//! Regroups a sequence of tile ranges into batches holding a fixed number of tiles.
//!
//! Ranges are split along rows: a batch consists of an optional remainder of a partially consumed row,
//! a block of complete rows and an optional start of the next row. Every batch except the last one
//! contains exactly `batch_size` tiles and the concatenated batches contain every input tile exactly once.

use std::pin::Pin;

use futures::{Stream, StreamExt};

use crate::{Error, Result, TileRange};

/// Read position within the range that is currently being split
#[derive(Debug, Clone, Copy)]
struct RangeCursor {
    /// Unconsumed rows, `min_y` is the row being consumed
    range: TileRange,
    /// First unconsumed column of the `min_y` row
    row_x: i64,
}

impl RangeCursor {
    fn new(range: TileRange) -> Self {
        RangeCursor { range, row_x: range.min_x }
    }
}

/// Splitting state shared by the iterator and stream batchers
#[derive(Debug)]
struct BatchShaper {
    batch_size: u64,
    remaining: u64,
    batch: Vec<TileRange>,
    cursor: Option<RangeCursor>,
}

impl BatchShaper {
    fn new(batch_size: u64) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidArgument("batch size must be at least 1".to_string()));
        }

        Ok(BatchShaper {
            batch_size,
            remaining: batch_size,
            batch: Vec::new(),
            cursor: None,
        })
    }

    fn needs_input(&self) -> bool {
        self.cursor.is_none()
    }

    fn push_range(&mut self, range: TileRange) {
        debug_assert!(self.cursor.is_none());
        if range.is_empty() {
            log::trace!("Skipping empty range {range}");
            return;
        }

        self.cursor = Some(RangeCursor::new(range));
    }

    /// Returns the next complete batch, `None` when the current range is exhausted before a batch is filled
    fn next_batch(&mut self) -> Option<Vec<TileRange>> {
        while let Some(cursor) = self.cursor.take() {
            let (cursor, full) = self.fill(cursor);
            self.cursor = cursor;
            if full {
                return Some(self.take_batch());
            }
        }

        None
    }

    /// The last, possibly smaller, batch once the input is exhausted
    fn finish(&mut self) -> Option<Vec<TileRange>> {
        if self.batch.is_empty() {
            None
        } else {
            Some(self.take_batch())
        }
    }

    fn take_batch(&mut self) -> Vec<TileRange> {
        self.remaining = self.batch_size;
        let batch = std::mem::take(&mut self.batch);
        log::trace!("Batch of {} ranges", batch.len());
        batch
    }

    /// Moves tiles from the cursor into the batch until the batch is full or the range is consumed
    fn fill(&mut self, mut cursor: RangeCursor) -> (Option<RangeCursor>, bool) {
        let zoom = cursor.range.zoom;
        let width = cursor.range.width() as u64;

        if cursor.row_x > cursor.range.min_x {
            let row_y = cursor.range.min_y;
            let left = (cursor.range.max_x - cursor.row_x) as u64;
            if left > self.remaining {
                let end_x = cursor.row_x + self.remaining as i64;
                self.batch.push(TileRange::new(cursor.row_x, row_y, end_x, row_y + 1, zoom));
                self.remaining = 0;
                cursor.row_x = end_x;
                return (Some(cursor), true);
            }

            self.batch.push(TileRange::new(cursor.row_x, row_y, cursor.range.max_x, row_y + 1, zoom));
            self.remaining -= left;
            cursor.range.min_y += 1;
            cursor.row_x = cursor.range.min_x;
        }

        let rows = (self.remaining / width).min(cursor.range.height() as u64);
        if rows > 0 {
            let end_y = cursor.range.min_y + rows as i64;
            self.batch
                .push(TileRange::new(cursor.range.min_x, cursor.range.min_y, cursor.range.max_x, end_y, zoom));
            cursor.range.min_y = end_y;
            self.remaining -= rows * width;
        }

        if self.remaining > 0 && !cursor.range.is_empty() {
            let take = self.remaining.min(width);
            let end_x = cursor.range.min_x + take as i64;
            self.batch
                .push(TileRange::new(cursor.range.min_x, cursor.range.min_y, end_x, cursor.range.min_y + 1, zoom));
            self.remaining -= take;

            if end_x < cursor.range.max_x {
                cursor.row_x = end_x;
            } else {
                cursor.range.min_y += 1;
            }
        }

        let cursor = (!cursor.range.is_empty()).then_some(cursor);
        (cursor, self.remaining == 0)
    }
}

/// Iterator producing batches of `batch_size` tiles from a sequence of ranges
pub struct TileBatcher<I> {
    ranges: I,
    shaper: BatchShaper,
    exhausted: bool,
}

impl<I: Iterator<Item = TileRange>> TileBatcher<I> {
    /// Fails with [`Error::InvalidArgument`] for a zero batch size
    pub fn new(batch_size: u64, ranges: impl IntoIterator<IntoIter = I>) -> Result<Self> {
        Ok(TileBatcher {
            ranges: ranges.into_iter(),
            shaper: BatchShaper::new(batch_size)?,
            exhausted: false,
        })
    }
}

impl<I: Iterator<Item = TileRange>> Iterator for TileBatcher<I> {
    type Item = Vec<TileRange>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(batch) = self.shaper.next_batch() {
                return Some(batch);
            }

            if self.exhausted {
                return None;
            }

            debug_assert!(self.shaper.needs_input());
            match self.ranges.next() {
                Some(range) => self.shaper.push_range(range),
                None => {
                    self.exhausted = true;
                    return self.shaper.finish();
                }
            }
        }
    }
}

struct StreamState<S> {
    ranges: Pin<Box<S>>,
    shaper: BatchShaper,
    exhausted: bool,
}

/// Asynchronous variant of [`TileBatcher`], the ranges are pulled from the stream as batches are requested
pub fn tile_batch_stream<S>(batch_size: u64, ranges: S) -> Result<impl Stream<Item = Vec<TileRange>>>
where
    S: Stream<Item = TileRange>,
{
    let state = StreamState {
        ranges: Box::pin(ranges),
        shaper: BatchShaper::new(batch_size)?,
        exhausted: false,
    };

    Ok(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(batch) = state.shaper.next_batch() {
                return Some((batch, state));
            }

            if state.exhausted {
                return None;
            }

            match state.ranges.next().await {
                Some(range) => state.shaper.push_range(range),
                None => {
                    state.exhausted = true;
                    let batch = state.shaper.finish()?;
                    return Some((batch, state));
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ranges: &[(i64, i64, i64, i64)], zoom: u8) -> Vec<TileRange> {
        ranges
            .iter()
            .map(|&(min_x, max_x, min_y, max_y)| TileRange::new(min_x, min_y, max_x, max_y, zoom))
            .collect()
    }

    fn complex_input() -> Vec<TileRange> {
        vec![
            TileRange::new(0, 2, 5, 4, 8),
            TileRange::new(0, 6, 2, 8, 8),
            TileRange::new(0, 8, 1, 11, 8),
        ]
    }

    fn complex_expected() -> Vec<Vec<TileRange>> {
        vec![
            batch(&[(0, 3, 2, 3)], 8),
            batch(&[(3, 5, 2, 3), (0, 1, 3, 4)], 8),
            batch(&[(1, 4, 3, 4)], 8),
            batch(&[(4, 5, 3, 4), (0, 2, 6, 7)], 8),
            batch(&[(0, 2, 7, 8), (0, 1, 8, 9)], 8),
            batch(&[(0, 1, 9, 11)], 8),
        ]
    }

    #[test]
    fn single_tile() -> Result {
        let batches: Vec<_> = TileBatcher::new(5, [TileRange::new(0, 0, 1, 1, 0)])?.collect();
        assert_eq!(batches, vec![vec![TileRange::new(0, 0, 1, 1, 0)]]);
        Ok(())
    }

    #[test]
    fn empty_ranges_produce_nothing() -> Result {
        assert_eq!(TileBatcher::new(5, [TileRange::new(0, 0, 0, 3, 0)])?.count(), 0);
        assert_eq!(TileBatcher::new(5, [TileRange::new(1, 1, 4, 1, 0)])?.count(), 0);
        assert_eq!(TileBatcher::new(5, Vec::<TileRange>::new())?.count(), 0);
        Ok(())
    }

    #[test]
    fn zero_batch_size() {
        assert!(matches!(TileBatcher::new(0, Vec::<TileRange>::new()), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn first_batch_is_cut_from_the_first_row() -> Result {
        let mut batches = TileBatcher::new(3, [TileRange::new(0, 2, 5, 4, 8)])?;
        assert_eq!(batches.next(), Some(vec![TileRange::new(0, 2, 3, 3, 8)]));
        assert_eq!(batches.next(), Some(vec![TileRange::new(3, 2, 5, 3, 8), TileRange::new(0, 3, 1, 4, 8)]));
        Ok(())
    }

    #[test]
    fn single_tile_batches_are_row_major() -> Result {
        let range = TileRange::new(0, 16, 16, 32, 5);
        let batches: Vec<_> = TileBatcher::new(1, [range])?.collect();
        assert_eq!(batches.len(), 256);

        let mut expected = Vec::new();
        for y in 16..32 {
            for x in 0..16 {
                expected.push(vec![TileRange::new(x, y, x + 1, y + 1, 5)]);
            }
        }

        assert_eq!(batches, expected);
        Ok(())
    }

    #[test]
    fn ranges_smaller_than_batch_are_not_merged_when_batch_is_full() -> Result {
        let batches: Vec<_> = TileBatcher::new(4, [TileRange::new(0, 0, 2, 2, 3), TileRange::new(5, 5, 6, 6, 3)])?.collect();
        assert_eq!(batches, vec![vec![TileRange::new(0, 0, 2, 2, 3)], vec![TileRange::new(5, 5, 6, 6, 3)]]);
        Ok(())
    }

    #[test]
    fn split_across_rows_and_ranges() -> Result {
        let batches: Vec<_> = TileBatcher::new(3, complex_input())?.collect();
        assert_eq!(batches, complex_expected());
        Ok(())
    }

    #[test_log::test]
    fn batches_preserve_tiles() -> Result {
        let input = vec![
            TileRange::new(3, 7, 10, 12, 6),
            TileRange::new(0, 0, 1, 1, 6),
            TileRange::new(20, 20, 20, 25, 6),
            TileRange::new(-4, -2, 3, 3, 6),
        ];

        for batch_size in [1, 2, 7, 13, 100] {
            let batches: Vec<_> = TileBatcher::new(batch_size, input.clone())?.collect();
            let sizes: Vec<u64> = batches.iter().map(|b| b.iter().map(TileRange::tile_count).sum()).collect();
            let (last, full) = sizes.split_last().expect("batches");
            assert!(full.iter().all(|&size| size == batch_size));
            assert!(*last <= batch_size && *last > 0);

            let mut actual: Vec<_> = batches.iter().flatten().flat_map(TileRange::tiles).collect();
            let mut expected: Vec<_> = input.iter().flat_map(TileRange::tiles).collect();
            expected.sort_by_key(|t| (t.x, t.y));
            actual.sort_by_key(|t| (t.x, t.y));
            assert_eq!(actual, expected, "batch size {batch_size}");
        }

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn stream_matches_iterator() -> Result {
        let batches: Vec<_> = tile_batch_stream(3, futures::stream::iter(complex_input()))?.collect().await;
        assert_eq!(batches, complex_expected());

        let batches: Vec<_> = tile_batch_stream(3, futures::stream::iter(Vec::<TileRange>::new()))?.collect().await;
        assert!(batches.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn stream_keeps_partial_batch_while_waiting() -> Result {
        let input = complex_input();
        let expected = complex_expected();

        let (sender, receiver) = tokio::sync::mpsc::channel(1);
        let ranges = futures::stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|range| (range, receiver))
        });
        let mut batches = std::pin::pin!(tile_batch_stream(3, ranges)?);

        sender.send(input[0]).await.expect("receiver is alive");
        for batch in &expected[..3] {
            assert_eq!(batches.next().await.as_ref(), Some(batch));
        }

        // The last row of the first range only partially fills the next batch
        let waiting = tokio::time::timeout(std::time::Duration::from_millis(20), batches.next()).await;
        assert!(waiting.is_err());

        tokio::spawn(async move {
            for range in input.into_iter().skip(1) {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                sender.send(range).await.expect("receiver is alive");
            }
        });

        let rest: Vec<_> = batches.collect().await;
        assert_eq!(rest, expected[3..]);
        Ok(())
    }

    #[test]
    fn zero_batch_size_stream() {
        assert!(matches!(
            tile_batch_stream(0, futures::stream::iter(Vec::<TileRange>::new())),
            Err(Error::InvalidArgument(_))
        ));
    }
}
