//! Run configuration loaded from TOML
//!
//! Every setting the grid model consumes is enumerated here as a typed field
//! and checked once at load time.

use crate::core::error::{GridError, Result};
use crate::core::types::{GridShape, RotationId, ZoneId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete configuration for one gridded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub grid: GridMetadata,
    pub maps: MapsConfig,
    pub weather: LocationConfig,
    #[serde(default)]
    pub crop_parameters: Option<LocationConfig>,
    pub agromanagement: LocationConfig,
    pub runtime: RuntimeWindow,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Raster dimensions every input layer must match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMetadata {
    pub nrows: usize,
    pub ncols: usize,
}

impl GridMetadata {
    pub fn shape(&self) -> GridShape {
        GridShape::new(self.nrows, self.ncols)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    pub aez: CategoricalMap,
    pub crop_rotation: CategoricalMap,
    pub rooting_depth: LocationConfig,
}

/// A categorical mask and the codes that take part in the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalMap {
    pub location: PathBuf,
    pub relevant: Vec<i32>,
}

impl CategoricalMap {
    #[inline]
    pub fn is_relevant(&self, code: i32) -> bool {
        self.relevant.contains(&code)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub location: PathBuf,
}

/// Simulation window shared by every cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Flip output arrays vertically (north-up rasters stored south-up)
    #[serde(default)]
    pub flip_output_array: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Minimum cell count before using parallel processing
    ///
    /// Below this threshold, thread overhead exceeds benefits.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Mark a cell inert when its engine fails instead of aborting the update
    #[serde(default)]
    pub isolate_cell_failures: bool,
}

fn default_parallel_threshold() -> usize {
    1000
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: default_parallel_threshold(),
            isolate_cell_failures: false,
        }
    }
}

impl RunConfig {
    /// Read, resolve and validate a TOML configuration file
    ///
    /// Relative input locations are resolved against the directory holding
    /// the configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GridError::MissingInput(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse without resolving paths or validating
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn shape(&self) -> GridShape {
        self.grid.shape()
    }

    pub fn is_relevant_aez(&self, aez: ZoneId) -> bool {
        self.maps.aez.is_relevant(aez)
    }

    pub fn is_relevant_rotation(&self, rotation: RotationId) -> bool {
        self.maps.crop_rotation.is_relevant(rotation)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.maps.aez.location);
        resolve(&mut self.maps.crop_rotation.location);
        resolve(&mut self.maps.rooting_depth.location);
        resolve(&mut self.weather.location);
        resolve(&mut self.agromanagement.location);
        if let Some(crop) = self.crop_parameters.as_mut() {
            resolve(&mut crop.location);
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.grid.nrows == 0 || self.grid.ncols == 0 {
            return Err(GridError::Config(format!(
                "grid must have at least one cell, got {}x{}",
                self.grid.nrows, self.grid.ncols
            )));
        }

        if self.runtime.start_date >= self.runtime.end_date {
            return Err(GridError::Config(format!(
                "start_date ({}) must be before end_date ({})",
                self.runtime.start_date, self.runtime.end_date
            )));
        }

        for (name, map) in [("aez", &self.maps.aez), ("crop_rotation", &self.maps.crop_rotation)] {
            if map.relevant.is_empty() {
                return Err(GridError::Config(format!("maps.{name}.relevant is empty")));
            }
            // Negative codes are no-data in the masks
            if let Some(code) = map.relevant.iter().find(|&&c| c < 0) {
                return Err(GridError::Config(format!(
                    "maps.{name}.relevant contains negative code {code}"
                )));
            }
        }

        if self.execution.parallel_threshold == 0 {
            return Err(GridError::Config("execution.parallel_threshold must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [grid]
        nrows = 3
        ncols = 4

        [maps.aez]
        location = "aez.json"
        relevant = [1, 2]

        [maps.crop_rotation]
        location = "rotation.json"
        relevant = [7]

        [maps.rooting_depth]
        location = "rooting_depth.json"

        [weather]
        location = "/data/weather.json"

        [agromanagement]
        location = "agro"

        [runtime]
        start_date = "2010-01-01"
        end_date = "2010-12-31"
    "#;

    #[test]
    fn test_parse_with_defaults() {
        let config = RunConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.shape(), GridShape::new(3, 4));
        assert!(config.is_relevant_aez(2));
        assert!(!config.is_relevant_rotation(1));
        assert!(!config.output.flip_output_array);
        assert_eq!(config.execution.parallel_threshold, 1000);
        assert!(!config.execution.isolate_cell_failures);
        assert!(config.crop_parameters.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_relative_paths() {
        let mut config = RunConfig::from_toml_str(SAMPLE).unwrap();
        config.resolve_paths(Path::new("/runs/moselle"));
        assert_eq!(config.maps.aez.location, PathBuf::from("/runs/moselle/aez.json"));
        assert_eq!(config.agromanagement.location, PathBuf::from("/runs/moselle/agro"));
        // Absolute paths stay untouched
        assert_eq!(config.weather.location, PathBuf::from("/data/weather.json"));
    }

    #[test]
    fn test_rejects_reversed_window() {
        let mut config = RunConfig::from_toml_str(SAMPLE).unwrap();
        config.runtime.end_date = NaiveDate::from_ymd_opt(2009, 1, 1).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GridError::Config(_)));
    }

    #[test]
    fn test_rejects_negative_relevant_code() {
        let mut config = RunConfig::from_toml_str(SAMPLE).unwrap();
        config.maps.aez.relevant.push(-1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = RunConfig::load(Path::new("/nonexistent/run.toml")).unwrap_err();
        assert!(matches!(err, GridError::MissingInput(_)));
    }
}
