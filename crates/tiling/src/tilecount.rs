//! Estimates of the number of tiles needed to cover footprints over a span of zoom levels.
//!
//! The estimate counts the tiles of the bounding box, snapped to the grid of the deepest zoom level.

use std::ops::RangeInclusive;

use crate::{
    Error, Footprint, Result, ZoomLevelStrategy,
    bboxtiler::{bbox_to_tile_range, snap_to_tile_grid},
    tilegrid::{MAX_RESOLUTION_ZOOM, zoom_level_for_resolution},
};

/// Zoom levels counted when a footprint has no resolutions of its own
pub const DEFAULT_COUNT_ZOOMS: RangeInclusive<u8> = 0..=MAX_RESOLUTION_ZOOM;

/// Pixel resolutions in degrees that limit the counted zoom levels.
///
/// The minimum resolution is the coarsest one and determines the lowest zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResolutionSpan {
    pub min_resolution_deg: Option<f64>,
    pub max_resolution_deg: Option<f64>,
}

/// A footprint with optional resolution limits
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintFeature {
    pub footprint: Footprint,
    pub resolutions: ResolutionSpan,
}

impl FootprintFeature {
    pub fn new(footprint: impl Into<Footprint>) -> Self {
        FootprintFeature {
            footprint: footprint.into(),
            resolutions: ResolutionSpan::default(),
        }
    }

    pub fn with_resolutions(mut self, resolutions: ResolutionSpan) -> Self {
        self.resolutions = resolutions;
        self
    }
}

fn validate_default_zooms(zooms: &RangeInclusive<u8>) -> Result {
    let (min, max) = (*zooms.start(), *zooms.end());
    if max > MAX_RESOLUTION_ZOOM {
        return Err(Error::InvalidZoom(format!(
            "unsupported zoom levels, min-max zoom should be [0-{MAX_RESOLUTION_ZOOM}] but actual [{min}:{max}]"
        )));
    }

    if min > max {
        return Err(Error::InvalidArgument(format!(
            "default min zoom {min} is larger than default max zoom {max}"
        )));
    }

    Ok(())
}

/// Number of tiles covering the feature at every zoom level of its span.
///
/// Resolutions of the feature take precedence over `default_zooms`.
pub fn footprint_tile_count(feature: &FootprintFeature, default_zooms: RangeInclusive<u8>, strategy: ZoomLevelStrategy) -> Result<u64> {
    validate_default_zooms(&default_zooms)?;

    let max_zoom = match feature.resolutions.max_resolution_deg {
        Some(resolution) => zoom_level_for_resolution(resolution, strategy)?,
        None => *default_zooms.end(),
    };

    let min_zoom = match feature.resolutions.min_resolution_deg {
        Some(resolution) => zoom_level_for_resolution(resolution, strategy)?,
        None => *default_zooms.start(),
    };

    let Some(bbox) = feature.footprint.bbox() else {
        return Ok(0);
    };

    let snapped = snap_to_tile_grid(&bbox, max_zoom);
    let count: u64 = (min_zoom..=max_zoom).map(|zoom| bbox_to_tile_range(&snapped, zoom).tile_count()).sum();
    log::debug!("{count} tiles for {bbox} on zoom levels {min_zoom}-{max_zoom}");
    Ok(count)
}

/// Sum of the tile counts of all features
pub fn feature_collection_tile_count<'a>(
    features: impl IntoIterator<Item = &'a FootprintFeature>,
    default_zooms: RangeInclusive<u8>,
    strategy: ZoomLevelStrategy,
) -> Result<u64> {
    validate_default_zooms(&default_zooms)?;

    features
        .into_iter()
        .map(|feature| footprint_tile_count(feature, default_zooms.clone(), strategy))
        .sum()
}

/// True when both collections hold the same features, regardless of their order
pub fn feature_collection_equal(features: &[FootprintFeature], other: &[FootprintFeature]) -> bool {
    features.len() == other.len()
        && features.iter().all(|feature| other.contains(feature))
        && other.iter().all(|feature| features.contains(feature))
}
