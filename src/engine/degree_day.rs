//! Degree-day placeholder engine
//!
//! A deliberately crude stand-in for a crop model: it accumulates a
//! temperature sum from the sowing date, emerges once a threshold is reached,
//! and grows linearly with thermal time scaled by the transpiration reduction
//! factor. It exists so the grid can be exercised end to end; none of its
//! numbers are physiologically meaningful.

use crate::agromanagement::AgroSchedule;
use crate::core::config::RunConfig;
use crate::core::error::{GridError, Result};
use crate::core::types::CellIndex;
use crate::engine::transpiration::{ForcedTranspiration, TranspirationRates};
use crate::engine::{CellContext, EngineFactory, SimulationEngine, SiteParameters, SoilParameters};
use crate::weather::WeatherLayerCache;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tunables of the placeholder engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DegreeDayParameters {
    /// Base temperature for thermal time (°C)
    pub tbase: f64,
    /// Temperature sum from sowing to emergence (°C·d)
    pub tsum_emergence: f64,
    /// Temperature sum from emergence to maturity (°C·d)
    pub tsum_maturity: f64,
    pub initial_lai: f64,
    pub max_lai: f64,
    /// Leaf area gained per kg of biomass (ha/kg)
    pub specific_leaf_area: f64,
    /// Relative LAI loss per day after flowering
    pub senescence_rate: f64,
    /// Above-ground biomass per degree-day at no stress (kg/ha/°C·d)
    pub growth_rate: f64,
    /// Share of growth allocated to storage organs after flowering
    pub storage_fraction: f64,
    /// Initial rooting depth (cm)
    pub rdi: f64,
    /// Daily root extension (cm/day)
    pub rri: f64,
    /// Maximum rooting depth of the crop (cm)
    pub rdmcr: f64,
}

impl Default for DegreeDayParameters {
    fn default() -> Self {
        Self {
            tbase: 0.0,
            tsum_emergence: 100.0,
            tsum_maturity: 2000.0,
            initial_lai: 0.05,
            max_lai: 6.0,
            specific_leaf_area: 0.002,
            senescence_rate: 0.02,
            growth_rate: 10.0,
            storage_fraction: 0.5,
            rdi: 10.0,
            rri: 1.2,
            rdmcr: 120.0,
        }
    }
}

impl DegreeDayParameters {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// State that only exists once the crop has emerged
#[derive(Debug, Clone, Copy, PartialEq)]
struct CropState {
    dvs: f64,
    lai: f64,
    tagp: f64,
    twso: f64,
    rd: f64,
}

impl CropState {
    fn emerged(params: &DegreeDayParameters) -> Self {
        Self {
            dvs: 0.0,
            lai: params.initial_lai,
            tagp: 0.0,
            twso: 0.0,
            rd: params.rdi,
        }
    }

    fn grow(&mut self, thermal_time: f64, rftra: f64, params: &DegreeDayParameters, soil: &SoilParameters) {
        self.dvs = (self.dvs + 2.0 * thermal_time / params.tsum_maturity).min(2.0);

        let growth = params.growth_rate * thermal_time * rftra;
        self.tagp += growth;
        if self.dvs < 1.0 {
            self.lai = (self.lai + params.specific_leaf_area * growth).min(params.max_lai);
        } else {
            self.twso += params.storage_fraction * growth;
            self.lai *= 1.0 - params.senescence_rate;
        }

        let rdmax = soil.rdmsol.min(params.rdmcr);
        self.rd = (self.rd + params.rri).min(rdmax);
    }
}

#[derive(Debug)]
pub struct DegreeDayEngine {
    cell: CellIndex,
    weather: Arc<WeatherLayerCache>,
    schedule: Arc<AgroSchedule>,
    params: DegreeDayParameters,
    soil: SoilParameters,
    site: SiteParameters,
    day: NaiveDate,
    tsum: f64,
    crop: Option<CropState>,
    transpiration: ForcedTranspiration,
    last_rates: Option<TranspirationRates>,
}

impl DegreeDayEngine {
    pub fn new(context: CellContext, params: DegreeDayParameters) -> Self {
        Self {
            cell: context.cell,
            day: context.schedule.campaign_start,
            weather: context.weather,
            schedule: context.schedule,
            params,
            soil: context.soil,
            site: context.site,
            tsum: 0.0,
            crop: None,
            transpiration: ForcedTranspiration::new(),
            last_rates: None,
        }
    }

}

impl SimulationEngine for DegreeDayEngine {
    fn step(&mut self) -> Result<()> {
        if self.day >= self.schedule.campaign_end {
            tracing::debug!(cell = %self.cell, day = %self.day, "campaign finished, step ignored");
            return Ok(());
        }

        let next = self.day + Duration::days(1);
        let drv = self.weather.record_for(next, self.cell.row, self.cell.col)?;
        self.day = next;

        if next < self.schedule.crop_start {
            return Ok(());
        }

        let rates = self.transpiration.rates(next);
        self.last_rates = Some(rates);

        let thermal_time = (drv.temp - self.params.tbase).max(0.0);
        self.tsum += thermal_time;

        if let Some(state) = self.crop.as_mut() {
            state.grow(thermal_time, rates.rftra, &self.params, &self.soil);
        } else if self.tsum >= self.params.tsum_emergence {
            tracing::trace!(cell = %self.cell, day = %next, "crop emerged");
            self.crop = Some(CropState::emerged(&self.params));
        }
        Ok(())
    }

    fn get_variable(&self, name: &str) -> Option<f64> {
        match name {
            "LAI" => self.crop.map(|c| c.lai),
            "DVS" => self.crop.map(|c| c.dvs),
            "TAGP" => self.crop.map(|c| c.tagp),
            "TWSO" => self.crop.map(|c| c.twso),
            "RD" => self.crop.map(|c| c.rd),
            "TSUM" => Some(self.tsum),
            "TRA" => Some(self.transpiration.tra()),
            "TRAMX" => Some(self.transpiration.tramx()),
            "RFTRA" => self.last_rates.map(|r| r.rftra),
            "WAV" => Some(self.site.wav),
            "CO2" => Some(self.site.co2),
            _ => None,
        }
    }

    fn set_variable(&mut self, name: &str, value: f64) -> Result<()> {
        match name {
            "TRA" => self.transpiration.set_tra(value),
            "TRAMX" => self.transpiration.set_tramx(value),
            _ => return Err(GridError::UnknownVariable(name.to_string())),
        }
        Ok(())
    }

    fn start_date(&self) -> NaiveDate {
        self.schedule.campaign_start
    }

    fn end_date(&self) -> NaiveDate {
        self.schedule.campaign_end
    }

    fn current_day(&self) -> NaiveDate {
        self.day
    }
}

/// Builds a `DegreeDayEngine` for every cell with shared parameters
#[derive(Debug, Clone, Default)]
pub struct DegreeDayFactory {
    params: DegreeDayParameters,
}

impl DegreeDayFactory {
    pub fn new(params: DegreeDayParameters) -> Self {
        Self { params }
    }

    /// Use the crop parameter file from the configuration when one is given
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        let Some(crop) = config.crop_parameters.as_ref() else {
            return Ok(Self::default());
        };
        if !crop.location.exists() {
            return Err(GridError::MissingInput(crop.location.clone()));
        }
        let content = std::fs::read_to_string(&crop.location)?;
        Ok(Self::new(DegreeDayParameters::from_toml_str(&content)?))
    }

}

impl EngineFactory for DegreeDayFactory {
    type Engine = DegreeDayEngine;

    fn create(&self, context: CellContext) -> Result<DegreeDayEngine> {
        Ok(DegreeDayEngine::new(context, self.params))
    }
}
