//! Gridded crop growth - one crop simulation per raster cell
//!
//! Builds a sparse grid of per-cell engines from categorical masks, feeds
//! them gridded weather one day at a time and exposes the whole grid through
//! a Basic Model Interface for coupling with a hydrological model.

pub mod agromanagement;
pub mod bmi;
pub mod core;
pub mod engine;
pub mod grid;
pub mod weather;

pub use crate::bmi::{Bmi, GriddedCropModel};
pub use crate::core::{GridError, Result, RunConfig};
