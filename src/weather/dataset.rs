//! Gridded weather time series
//!
//! `WeatherDataset` is the seam to the meteorological source. Each call to
//! `read_day` returns a whole-grid slice for one day.

use crate::core::error::{GridError, Result};
use crate::grid::inputs::array_from_rows;
use crate::weather::record::RawDayLayer;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Source of daily gridded weather slices
pub trait WeatherDataset: Send + Sync {
    /// Latitude of each grid row
    fn latitudes(&self) -> &[f64];

    /// Longitude of each grid column
    fn longitudes(&self) -> &[f64];

    /// Bulk read of all fields for one day
    fn read_day(&self, day: NaiveDate) -> Result<RawDayLayer>;
}

/// Weather dataset held entirely in memory, keyed by day
#[derive(Debug, Clone, Default)]
pub struct InMemoryWeatherDataset {
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    days: BTreeMap<NaiveDate, RawDayLayer>,
}

#[derive(Deserialize)]
struct DatasetFile {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    days: Vec<DayEntry>,
}

#[derive(Deserialize)]
struct DayEntry {
    day: NaiveDate,
    #[serde(rename = "TEMP")]
    temp: Vec<Vec<f64>>,
    #[serde(rename = "P")]
    precip: Vec<Vec<f64>>,
    #[serde(rename = "PET")]
    pet: Vec<Vec<f64>>,
}

impl InMemoryWeatherDataset {
    pub fn new(latitudes: Vec<f64>, longitudes: Vec<f64>) -> Self {
        Self {
            latitudes,
            longitudes,
            days: BTreeMap::new(),
        }
    }

    /// Add or replace the slice for one day
    pub fn insert_day(&mut self, day: NaiveDate, layer: RawDayLayer) -> Result<()> {
        let expected = (self.latitudes.len(), self.longitudes.len());
        match layer.shape() {
            Some(found) if found == expected => {
                self.days.insert(day, layer);
                Ok(())
            }
            Some(found) => Err(GridError::GridShapeMismatch {
                layer: format!("weather for {day}"),
                expected,
                found,
            }),
            None => Err(GridError::GridShapeMismatch {
                layer: format!("weather for {day}"),
                expected,
                found: layer.temp.dim(),
            }),
        }
    }

    /// Load a dataset from a JSON file
    ///
    /// The file holds `latitude`, `longitude` and a `days` list whose entries
    /// carry `day`, `TEMP`, `P` and `PET` as row-major nested arrays.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GridError::MissingInput(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: DatasetFile = serde_json::from_str(json)?;
        let mut dataset = Self::new(file.latitude, file.longitude);
        for entry in file.days {
            let layer = RawDayLayer {
                temp: array_from_rows(entry.temp, "TEMP")?,
                precip: array_from_rows(entry.precip, "P")?,
                pet: array_from_rows(entry.pet, "PET")?,
            };
            dataset.insert_day(entry.day, layer)?;
        }
        tracing::debug!(days = dataset.day_count(), span = ?dataset.span(), "loaded in-memory weather dataset");
        Ok(dataset)
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// First and last day covered
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.days.keys().next()?;
        let last = self.days.keys().next_back()?;
        Some((*first, *last))
    }
}

impl WeatherDataset for InMemoryWeatherDataset {
    fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    fn read_day(&self, day: NaiveDate) -> Result<RawDayLayer> {
        self.days.get(&day).cloned().ok_or_else(|| GridError::DataUnavailable {
            day,
            reason: "day not present in dataset".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2010, 1, d).unwrap()
    }

    #[test]
    fn test_read_missing_day() {
        let dataset = InMemoryWeatherDataset::new(vec![50.0], vec![6.0]);
        let err = dataset.read_day(date(1)).unwrap_err();
        assert!(matches!(err, GridError::DataUnavailable { .. }));
    }

    #[test]
    fn test_insert_rejects_wrong_shape() {
        let mut dataset = InMemoryWeatherDataset::new(vec![50.0, 49.0], vec![6.0]);
        let layer = RawDayLayer {
            temp: Array2::zeros((1, 1)),
            precip: Array2::zeros((1, 1)),
            pet: Array2::zeros((1, 1)),
        };
        assert!(matches!(
            dataset.insert_day(date(1), layer),
            Err(GridError::GridShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "latitude": [50.0, 49.5],
            "longitude": [6.0],
            "days": [
                {"day": "2010-01-02", "TEMP": [[1.0], [2.0]], "P": [[0.0], [3.0]], "PET": [[1.0], [1.0]]},
                {"day": "2010-01-01", "TEMP": [[0.5], [1.5]], "P": [[0.0], [0.0]], "PET": [[0.8], [0.9]]}
            ]
        }"#;
        let dataset = InMemoryWeatherDataset::from_json_str(json).unwrap();
        assert_eq!(dataset.day_count(), 2);
        assert_eq!(dataset.span(), Some((date(1), date(2))));
        let layer = dataset.read_day(date(2)).unwrap();
        assert_eq!(layer.precip[[1, 0]], 3.0);
    }

    #[test]
    fn test_from_json_ragged_rows() {
        let json = r#"{
            "latitude": [50.0, 49.5],
            "longitude": [6.0, 6.5],
            "days": [{"day": "2010-01-01", "TEMP": [[1.0, 2.0], [2.0]], "P": [[0.0, 0.0], [0.0, 0.0]], "PET": [[1.0, 1.0], [1.0, 1.0]]}]
        }"#;
        assert!(InMemoryWeatherDataset::from_json_str(json).is_err());
    }
}
