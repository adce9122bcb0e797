//! Basic Model Interface surface for coupling with a hydrological model

pub mod catalog;
pub mod model;

use crate::core::error::Result;
use crate::engine::DegreeDayEngine;
use chrono::NaiveDate;
use ndarray::Array2;
use std::path::Path;

pub use catalog::{mm_to_cm, InputVariable, OutputVariable, VariableCatalog};
pub use model::{GriddedCropModel, ModelState};

pub const COMPONENT_NAME: &str = "Gridded crop growth model";

/// Get/set/update contract seen by a coupling framework
pub trait Bmi {
    fn initialize(&mut self, config_file: &Path) -> Result<()>;

    fn update(&mut self) -> Result<()>;

    fn finalize(&mut self) -> Result<()>;

    fn get_component_name(&self) -> &str {
        COMPONENT_NAME
    }

    fn get_input_var_names(&self) -> Vec<&'static str>;

    fn get_output_var_names(&self) -> Vec<&'static str>;

    fn get_var_units(&self, name: &str) -> Result<&'static str>;

    fn get_current_time(&self) -> Result<NaiveDate>;

    fn get_start_time(&self) -> Result<NaiveDate>;

    fn get_end_time(&self) -> Result<NaiveDate>;

    /// Length of one update in [`Bmi::get_time_units`]
    fn get_time_step(&self) -> f64 {
        1.0
    }

    fn get_time_units(&self) -> &str {
        "days"
    }

    fn get_grid_shape(&self) -> Result<(usize, usize)>;

    fn get_value(&self, name: &str) -> Result<Array2<f64>>;

    fn get_value_into(&self, name: &str, dest: &mut Array2<f64>) -> Result<()>;

    fn set_value(&mut self, name: &str, values: &Array2<f64>) -> Result<()>;
}

impl Bmi for GriddedCropModel<DegreeDayEngine> {
    fn initialize(&mut self, config_file: &Path) -> Result<()> {
        self.initialize_from_file(config_file)
    }

    fn update(&mut self) -> Result<()> {
        GriddedCropModel::update(self)
    }

    fn finalize(&mut self) -> Result<()> {
        GriddedCropModel::finalize(self)
    }

    fn get_input_var_names(&self) -> Vec<&'static str> {
        GriddedCropModel::get_input_var_names(self)
    }

    fn get_output_var_names(&self) -> Vec<&'static str> {
        GriddedCropModel::get_output_var_names(self)
    }

    fn get_var_units(&self, name: &str) -> Result<&'static str> {
        GriddedCropModel::get_var_units(self, name)
    }

    fn get_current_time(&self) -> Result<NaiveDate> {
        GriddedCropModel::get_current_time(self)
    }

    fn get_start_time(&self) -> Result<NaiveDate> {
        GriddedCropModel::get_start_time(self)
    }

    fn get_end_time(&self) -> Result<NaiveDate> {
        GriddedCropModel::get_end_time(self)
    }

    fn get_grid_shape(&self) -> Result<(usize, usize)> {
        GriddedCropModel::get_grid_shape(self)
    }

    fn get_value(&self, name: &str) -> Result<Array2<f64>> {
        GriddedCropModel::get_value(self, name)
    }

    fn get_value_into(&self, name: &str, dest: &mut Array2<f64>) -> Result<()> {
        GriddedCropModel::get_value_into(self, name, dest)
    }

    fn set_value(&mut self, name: &str, values: &Array2<f64>) -> Result<()> {
        GriddedCropModel::set_value(self, name, values)
    }
}
