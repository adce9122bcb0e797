//! Per-cell simulation engines
//!
//! The grid treats the crop model as opaque: it only needs to step it one
//! day, read and write named variables, and know its simulation window.

pub mod degree_day;
pub mod transpiration;

use crate::agromanagement::AgroSchedule;
use crate::core::error::Result;
use crate::core::types::{CellIndex, RotationId, ZoneId};
use crate::weather::WeatherLayerCache;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use degree_day::{DegreeDayEngine, DegreeDayFactory, DegreeDayParameters};
pub use transpiration::{ForcedTranspiration, TranspirationRates};

/// One simulation run bound to a single grid cell
pub trait SimulationEngine: Send {
    /// Advance exactly one simulated day
    fn step(&mut self) -> Result<()>;

    /// Current value of a named variable, `None` when not computed yet
    fn get_variable(&self, name: &str) -> Option<f64>;

    fn set_variable(&mut self, name: &str, value: f64) -> Result<()>;

    fn start_date(&self) -> NaiveDate;

    fn end_date(&self) -> NaiveDate;

    /// Day the engine state currently refers to
    fn current_day(&self) -> NaiveDate;
}

/// Creates the engine for each eligible cell during grid construction
pub trait EngineFactory: Sync {
    type Engine: SimulationEngine;

    fn create(&self, context: CellContext) -> Result<Self::Engine>;
}

/// Soil parameters assembled per cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilParameters {
    /// Maximum rooting depth allowed by the soil (cm)
    pub rdmsol: f64,
    /// Soil moisture at saturation
    pub sm0: f64,
    /// Soil moisture at field capacity
    pub smfcf: f64,
    /// Soil moisture at wilting point
    pub smw: f64,
    /// Critical air content for aeration
    pub crairc: f64,
}

impl SoilParameters {
    /// Rooting depth from the raster, fixed defaults for the rest
    pub fn with_rooting_depth(rdmsol: f64) -> Self {
        Self {
            rdmsol,
            sm0: 0.4,
            smfcf: 0.25,
            smw: 0.1,
            crairc: 0.04,
        }
    }
}

/// Site parameters shared by all cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteParameters {
    /// Initial available soil water (cm)
    pub wav: f64,
    /// Atmospheric CO2 (ppm)
    pub co2: f64,
}

impl Default for SiteParameters {
    fn default() -> Self {
        Self { wav: 10.0, co2: 360.0 }
    }
}

/// Everything an engine needs to know about its cell
#[derive(Debug, Clone)]
pub struct CellContext {
    pub cell: CellIndex,
    pub aez: ZoneId,
    pub rotation: RotationId,
    pub schedule: Arc<AgroSchedule>,
    pub soil: SoilParameters,
    pub site: SiteParameters,
    pub weather: Arc<WeatherLayerCache>,
}
