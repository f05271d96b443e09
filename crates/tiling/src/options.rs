use bon::bon;

use crate::{TileOrigin, ZoomLevelStrategy};

/// Relative difference below which an intersection area counts as the full tile area
pub const DEFAULT_AREA_TOLERANCE: f64 = 1e-9;

/// Settings shared by the tile coverage generators
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CoverageOptions {
    /// Row numbering of the tiles handed out to the caller
    pub origin: TileOrigin,
    pub area_tolerance: f64,
    /// Rounding of resolutions that fall between zoom levels
    pub zoom_strategy: ZoomLevelStrategy,
}

#[bon]
impl CoverageOptions {
    #[builder]
    pub fn new(origin: Option<TileOrigin>, area_tolerance: Option<f64>, zoom_strategy: Option<ZoomLevelStrategy>) -> Self {
        Self {
            origin: origin.unwrap_or_default(),
            area_tolerance: area_tolerance.unwrap_or(DEFAULT_AREA_TOLERANCE),
            zoom_strategy: zoom_strategy.unwrap_or_default(),
        }
    }
}

impl Default for CoverageOptions {
    fn default() -> Self {
        CoverageOptions::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = CoverageOptions::default();
        assert_eq!(options.origin, TileOrigin::LowerLeft);
        assert_eq!(options.area_tolerance, DEFAULT_AREA_TOLERANCE);
        assert_eq!(options.zoom_strategy, ZoomLevelStrategy::PreferLower);
    }

    #[test]
    fn builder_overrides() {
        let options = CoverageOptions::builder()
            .origin(TileOrigin::UpperLeft)
            .zoom_strategy(ZoomLevelStrategy::Closest)
            .build();

        assert_eq!(options.origin, TileOrigin::UpperLeft);
        assert_eq!(options.area_tolerance, DEFAULT_AREA_TOLERANCE);
        assert_eq!(options.zoom_strategy, ZoomLevelStrategy::Closest);
    }
}
