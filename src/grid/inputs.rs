//! Raster inputs for grid construction
//!
//! Masks are exchanged as row-major JSON arrays. Negative cell values mark
//! no-data, as in the source rasters.

use crate::core::config::RunConfig;
use crate::core::error::{GridError, Result};
use crate::core::types::{GridShape, RotationId, ZoneId};
use ndarray::Array2;
use serde::de::DeserializeOwned;
use std::path::Path;

/// The three rasters the grid builder walks
#[derive(Debug, Clone, PartialEq)]
pub struct GridInputs {
    pub aez: Array2<ZoneId>,
    pub rotation: Array2<RotationId>,
    /// Maximum rooting depth (cm); NaN where no data
    pub rooting_depth: Array2<f64>,
}

impl GridInputs {
    pub fn new(aez: Array2<ZoneId>, rotation: Array2<RotationId>, rooting_depth: Array2<f64>) -> Self {
        Self {
            aez,
            rotation,
            rooting_depth: rooting_depth.mapv(|v| if v < 0.0 { f64::NAN } else { v }),
        }
    }

    /// Read the rasters named in the configuration
    pub fn load(config: &RunConfig) -> Result<Self> {
        let aez = read_json_grid(&config.maps.aez.location, "AEZ map")?;
        let rotation = read_json_grid(&config.maps.crop_rotation.location, "crop rotation map")?;
        let rooting_depth = read_json_grid(&config.maps.rooting_depth.location, "rooting depth map")?;
        Ok(Self::new(aez, rotation, rooting_depth))
    }

    /// Check every raster against the configured grid metadata
    pub fn check_shape(&self, expected: GridShape) -> Result<()> {
        check_grid_size("AEZ map", self.aez.dim(), expected)?;
        check_grid_size("crop rotation map", self.rotation.dim(), expected)?;
        check_grid_size("rooting depth map", self.rooting_depth.dim(), expected)?;
        Ok(())
    }
}

fn check_grid_size(layer: &str, found: (usize, usize), expected: GridShape) -> Result<()> {
    if found != expected.as_tuple() {
        return Err(GridError::GridShapeMismatch {
            layer: layer.to_string(),
            expected: expected.as_tuple(),
            found,
        });
    }
    Ok(())
}

/// Read a JSON file holding a nested row-major array
pub fn read_json_grid<T: DeserializeOwned + Clone>(path: &Path, layer: &str) -> Result<Array2<T>> {
    if !path.exists() {
        return Err(GridError::MissingInput(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let rows: Vec<Vec<T>> = serde_json::from_str(&content)?;
    array_from_rows(rows, layer)
}

/// Convert nested rows into a dense array, rejecting ragged input
pub fn array_from_rows<T: Clone>(rows: Vec<Vec<T>>, layer: &str) -> Result<Array2<T>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|row| row.len() != ncols) {
        return Err(GridError::GridShapeMismatch {
            layer: format!("{layer} (ragged rows)"),
            expected: (nrows, ncols),
            found: (nrows, bad.len()),
        });
    }
    let flat: Vec<T> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat).map_err(|e| GridError::Config(format!("{layer}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_array_from_rows() {
        let a = array_from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]], "test").unwrap();
        assert_eq!(a.dim(), (2, 3));
        assert_eq!(a[[1, 0]], 4);
    }

    #[test]
    fn test_array_from_ragged_rows() {
        let err = array_from_rows(vec![vec![1.0, 2.0], vec![3.0]], "test").unwrap_err();
        assert!(matches!(err, GridError::GridShapeMismatch { .. }));
    }

    #[test]
    fn test_negative_rooting_depth_is_nodata() {
        let inputs = GridInputs::new(array![[1, 1]], array![[2, 2]], array![[120.0, -9999.0]]);
        assert_eq!(inputs.rooting_depth[[0, 0]], 120.0);
        assert!(inputs.rooting_depth[[0, 1]].is_nan());
    }

    #[test]
    fn test_check_shape() {
        let inputs = GridInputs::new(array![[1, 1]], array![[2, 2]], array![[1.0, 1.0]]);
        assert!(inputs.check_shape(GridShape::new(1, 2)).is_ok());
        let err = inputs.check_shape(GridShape::new(2, 1)).unwrap_err();
        assert!(matches!(err, GridError::GridShapeMismatch { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = read_json_grid::<i32>(Path::new("/nonexistent/aez.json"), "AEZ map").unwrap_err();
        assert!(matches!(err, GridError::MissingInput(_)));
    }
}
