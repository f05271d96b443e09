//! Tile coverage of geographic footprints on a plate carrée tile grid.
//!
//! Re-exports the [`tiling`] crate, its [`Error`] type is shared through the `inf` crate.

#[doc(inline)]
pub use tiling::*;
