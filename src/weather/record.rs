//! Day layers and per-cell weather records
//!
//! The gridded dataset carries only mean temperature, precipitation and
//! reference evapotranspiration. The remaining driving variables are
//! synthesized from those with fixed stand-in rules, so every record built
//! from a derived layer is flagged `synthetic`.

use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Symmetric offset between mean and min/max temperature (°C)
pub const TEMPERATURE_RANGE_OFFSET: f64 = 5.0;

/// Offset between mean and daytime temperature (°C)
pub const DAY_TEMPERATURE_OFFSET: f64 = 2.5;

/// Latent heat of vaporization (J/kg), used to turn ET0 into radiation
pub const LATENT_HEAT_OF_VAPORIZATION: f64 = 2.45e6;

/// Millimetres per centimetre
pub const MM_PER_CM: f64 = 10.0;

/// One day of raw gridded fields as stored in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDayLayer {
    /// Mean daily temperature (°C)
    pub temp: Array2<f64>,
    /// Precipitation (mm/day)
    pub precip: Array2<f64>,
    /// Reference evapotranspiration (mm/day)
    pub pet: Array2<f64>,
}

impl RawDayLayer {
    /// Shape shared by all three fields, `None` when they disagree
    pub fn shape(&self) -> Option<(usize, usize)> {
        let shape = self.temp.dim();
        (self.precip.dim() == shape && self.pet.dim() == shape).then_some(shape)
    }
}

/// Full-grid driving variables for one day, raw fields plus derived ones
#[derive(Debug, Clone, PartialEq)]
pub struct DayLayer {
    pub tmin: Array2<f64>,
    pub tmax: Array2<f64>,
    pub temp: Array2<f64>,
    pub dtemp: Array2<f64>,
    /// Precipitation (cm/day)
    pub rain: Array2<f64>,
    /// Reference evapotranspiration (cm/day)
    pub et0: Array2<f64>,
    /// Bare-soil evaporation (cm/day)
    pub es0: Array2<f64>,
    /// Open-water evaporation (cm/day)
    pub e0: Array2<f64>,
    /// Incoming radiation (J/m2/day)
    pub irrad: Array2<f64>,
}

impl DayLayer {
    /// Add the derived fields to a raw layer
    ///
    /// Soil and open-water evaporation are not supplied by the driving
    /// hydrological model and are set equal to ET0.
    pub fn derive(raw: &RawDayLayer) -> Self {
        let et0 = raw.pet.mapv(|v| v / MM_PER_CM);
        Self {
            tmin: raw.temp.mapv(|t| t - TEMPERATURE_RANGE_OFFSET),
            tmax: raw.temp.mapv(|t| t + TEMPERATURE_RANGE_OFFSET),
            temp: raw.temp.clone(),
            dtemp: raw.temp.mapv(|t| t + DAY_TEMPERATURE_OFFSET),
            rain: raw.precip.mapv(|p| p / MM_PER_CM),
            es0: et0.clone(),
            e0: et0.clone(),
            et0,
            irrad: raw.pet.mapv(|v| v * LATENT_HEAT_OF_VAPORIZATION),
        }
    }

    /// Scalar record for one cell; indices must already be bounds-checked
    pub(crate) fn record(&self, day: NaiveDate, row: usize, col: usize, latitude: f64, longitude: f64) -> WeatherRecord {
        let at = [row, col];
        WeatherRecord {
            day,
            latitude,
            longitude,
            tmin: self.tmin[at],
            tmax: self.tmax[at],
            temp: self.temp[at],
            dtemp: self.dtemp[at],
            rain: self.rain[at],
            et0: self.et0[at],
            es0: self.es0[at],
            e0: self.e0[at],
            irrad: self.irrad[at],
            synthetic: true,
        }
    }
}

/// Driving variables for one (day, row, col)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub day: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub tmin: f64,
    pub tmax: f64,
    pub temp: f64,
    pub dtemp: f64,
    pub rain: f64,
    pub et0: f64,
    pub es0: f64,
    pub e0: f64,
    pub irrad: f64,
    /// Min/max/day temperature and radiation are stand-ins, not measurements
    pub synthetic: bool,
}
