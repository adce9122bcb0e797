//! The gridded model driving every cell in lock-step
//!
//! Owns the cell grid, the shared weather cache and the simulation clock.
//! Externally visible variables are marshalled between dense grid arrays and
//! the per-cell engines through the [`VariableCatalog`].

use crate::agromanagement::{ScheduleDirectory, ScheduleSource};
use crate::bmi::catalog::VariableCatalog;
use crate::core::clock::SimulationClock;
use crate::core::config::RunConfig;
use crate::core::error::{GridError, Result};
use crate::core::types::{CellIndex, GridShape, FILL_VALUE};
use crate::engine::{DegreeDayEngine, DegreeDayFactory, EngineFactory, SimulationEngine};
use crate::grid::{CellGrid, CellSlot, GridBuilder, GridInputs};
use crate::weather::{InMemoryWeatherDataset, WeatherDataset, WeatherLayerCache};
use chrono::NaiveDate;
use ndarray::Array2;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Lifecycle of a model instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Uninitialized,
    Ready,
    /// An engine failed without isolation; the grid is no longer in lock-step
    Failed,
    Finished,
}

impl std::fmt::Display for ModelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelState::Uninitialized => write!(f, "uninitialized"),
            ModelState::Ready => write!(f, "ready"),
            ModelState::Failed => write!(f, "failed"),
            ModelState::Finished => write!(f, "finished"),
        }
    }
}

/// Everything that exists once the grid has been built
struct ModelRun<E> {
    config: RunConfig,
    cells: CellGrid<E>,
    weather: Arc<WeatherLayerCache>,
    clock: SimulationClock,
}

/// Grid of crop simulations exposed through a get/set/update contract
pub struct GriddedCropModel<E> {
    catalog: VariableCatalog,
    state: ModelState,
    run: Option<ModelRun<E>>,
}

impl<E> Default for GriddedCropModel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> GriddedCropModel<E> {
    pub fn new() -> Self {
        Self {
            catalog: VariableCatalog::standard(),
            state: ModelState::Uninitialized,
            run: None,
        }
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    fn run(&self, operation: &'static str) -> Result<&ModelRun<E>> {
        self.run.as_ref().ok_or_else(|| GridError::InvalidState {
            operation,
            state: self.state.to_string(),
        })
    }

    fn run_mut(&mut self, operation: &'static str) -> Result<&mut ModelRun<E>> {
        let state = self.state;
        self.run.as_mut().ok_or_else(|| GridError::InvalidState {
            operation,
            state: state.to_string(),
        })
    }

    pub fn config(&self) -> Option<&RunConfig> {
        self.run.as_ref().map(|run| &run.config)
    }

    /// Shared weather cache, available once initialized
    pub fn weather(&self) -> Option<&Arc<WeatherLayerCache>> {
        self.run.as_ref().map(|run| &run.weather)
    }

    /// Engine of one active cell, for inspection
    pub fn engine_at(&self, row: usize, col: usize) -> Option<&E> {
        self.run.as_ref()?.cells.engine(row, col)
    }

    pub fn active_cell_count(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.cells.active_count())
    }

    pub fn get_grid_shape(&self) -> Result<(usize, usize)> {
        Ok(self.run("query grid shape")?.config.shape().as_tuple())
    }

    pub fn get_input_var_names(&self) -> Vec<&'static str> {
        self.catalog.input_names()
    }

    pub fn get_output_var_names(&self) -> Vec<&'static str> {
        self.catalog.output_names()
    }

    pub fn get_var_units(&self, name: &str) -> Result<&'static str> {
        self.catalog
            .units(name)
            .ok_or_else(|| GridError::UnknownVariable(name.to_string()))
    }

    /// Release the run; queries stay possible but no further updates
    pub fn finalize(&mut self) -> Result<()> {
        if self.state == ModelState::Ready {
            if let Some(run) = self.run.as_ref() {
                tracing::info!(
                    day = %run.clock.current(),
                    elapsed_days = run.clock.elapsed_days(),
                    reloads = run.weather.reload_count(),
                    "Finalized gridded run"
                );
            }
        }
        self.state = ModelState::Finished;
        Ok(())
    }
}

impl<E: SimulationEngine> GriddedCropModel<E> {
    /// Build the grid from already loaded inputs
    pub fn initialize_with<F>(
        &mut self,
        config: RunConfig,
        inputs: &GridInputs,
        dataset: Arc<dyn WeatherDataset>,
        schedules: &dyn ScheduleSource,
        factory: &F,
    ) -> Result<()>
    where
        F: EngineFactory<Engine = E>,
    {
        if self.state != ModelState::Uninitialized {
            return Err(GridError::InvalidState {
                operation: "initialize",
                state: self.state.to_string(),
            });
        }
        config.validate()?;

        let weather = Arc::new(WeatherLayerCache::new(dataset, config.shape())?);
        let cells = GridBuilder::new(&config).build(inputs, schedules, factory, &weather)?;

        let clock = match cells.first_active() {
            Some(engine) => SimulationClock::new(engine.start_date(), engine.end_date()),
            None => {
                tracing::warn!("No relevant cells on the grid, nothing will be simulated");
                SimulationClock::new(config.runtime.start_date, config.runtime.end_date)
            }
        };

        self.run = Some(ModelRun {
            config,
            cells,
            weather,
            clock,
        });
        self.state = ModelState::Ready;
        Ok(())
    }

    /// Advance every active cell by one day
    pub fn update(&mut self) -> Result<()> {
        if self.state != ModelState::Ready {
            return Err(GridError::InvalidState {
                operation: "update",
                state: self.state.to_string(),
            });
        }
        let run = self.run_mut("update")?;
        if run.clock.is_finished() {
            return Err(GridError::WindowExhausted { end: run.clock.end() });
        }

        let day = run.clock.next_day();
        run.weather.ensure_day(day)?;

        let failures = step_cells(&mut run.cells, run.config.execution.parallel_threshold);
        if let Some((cell, err)) = failures.first() {
            if !run.config.execution.isolate_cell_failures {
                // Other cells may already have stepped, so the run cannot continue
                tracing::error!(row = cell.row, col = cell.col, error = %err, "cell failed, run aborted");
                let err = GridError::Engine {
                    row: cell.row,
                    col: cell.col,
                    message: err.to_string(),
                };
                self.state = ModelState::Failed;
                return Err(err);
            }
        }
        for (cell, err) in &failures {
            tracing::error!(row = cell.row, col = cell.col, error = %err, "cell failed, marked inert");
            run.cells.mark_inert(cell.row, cell.col);
        }

        run.clock.advance();
        tracing::debug!(
            %day,
            active_cells = run.cells.active_count(),
            inert_cells = run.cells.occupied_count() - run.cells.active_count(),
            "advanced grid"
        );
        Ok(())
    }

    /// Clock of a run holding at least one active cell
    fn active_clock(&self, operation: &'static str) -> Result<&SimulationClock> {
        let run = self.run(operation)?;
        if run.cells.active_count() == 0 {
            return Err(GridError::EmptyGrid);
        }
        Ok(&run.clock)
    }

    /// Last day every active cell completed
    pub fn get_current_time(&self) -> Result<NaiveDate> {
        Ok(self.active_clock("query current time")?.current())
    }

    pub fn get_start_time(&self) -> Result<NaiveDate> {
        Ok(self.active_clock("query start time")?.start())
    }

    pub fn get_end_time(&self) -> Result<NaiveDate> {
        Ok(self.active_clock("query end time")?.end())
    }

    /// Dense grid of an output variable
    ///
    /// Cells outside the simulated domain hold [`FILL_VALUE`]; simulated cells
    /// whose engine has not computed the variable yet hold `0.0`.
    pub fn get_value(&self, name: &str) -> Result<Array2<f64>> {
        let shape = self.run("get value")?.config.shape();
        let mut dest = Array2::from_elem(shape.as_tuple(), FILL_VALUE);
        self.get_value_into(name, &mut dest)?;
        Ok(dest)
    }

    /// Write an output variable into a caller-owned grid-sized array
    pub fn get_value_into(&self, name: &str, dest: &mut Array2<f64>) -> Result<()> {
        if self.catalog.output(name).is_none() {
            return Err(GridError::UnknownVariable(name.to_string()));
        }
        let run = self.run("get value")?;
        if run.cells.active_count() == 0 {
            return Err(GridError::EmptyGrid);
        }
        let shape = run.config.shape();
        check_array_shape(shape, dest)?;

        let flip = run.config.output.flip_output_array;
        dest.fill(FILL_VALUE);
        for (cell, engine) in run.cells.active() {
            let row = if flip { shape.nrows - 1 - cell.row } else { cell.row };
            dest[[row, cell.col]] = engine.get_variable(name).unwrap_or(0.0);
        }
        Ok(())
    }

    /// Forward a grid of input values to every active cell
    ///
    /// Values are converted to engine units first. Inputs are always taken in
    /// raster orientation.
    pub fn set_value(&mut self, name: &str, values: &Array2<f64>) -> Result<()> {
        let input = *self
            .catalog
            .input(name)
            .ok_or_else(|| GridError::UnknownVariable(name.to_string()))?;
        let run = self.run_mut("set value")?;
        check_array_shape(run.config.shape(), values)?;

        for (cell, engine) in run.cells.active_mut() {
            let value = (input.convert)(values[[cell.row, cell.col]]);
            engine.set_variable(input.engine_name, value)?;
        }
        Ok(())
    }
}

impl GriddedCropModel<DegreeDayEngine> {
    /// Load every input named by the configuration file and build the grid
    pub fn initialize_from_file(&mut self, config_file: &Path) -> Result<()> {
        let config = RunConfig::load(config_file)?;
        let inputs = GridInputs::load(&config)?;
        let dataset = Arc::new(InMemoryWeatherDataset::from_json_file(&config.weather.location)?);
        let schedules = ScheduleDirectory::new(config.agromanagement.location.clone());
        let factory = DegreeDayFactory::from_config(&config)?;
        tracing::info!(config = %config_file.display(), "Initializing gridded run");
        self.initialize_with(config, &inputs, dataset, &schedules, &factory)
    }
}

fn check_array_shape(shape: GridShape, array: &Array2<f64>) -> Result<()> {
    if array.dim() != shape.as_tuple() {
        return Err(GridError::ShapeMismatch {
            expected: shape.as_tuple(),
            found: array.dim(),
        });
    }
    Ok(())
}

/// Step all active cells, returning failures in raster order
fn step_cells<E: SimulationEngine>(cells: &mut CellGrid<E>, parallel_threshold: usize) -> Vec<(CellIndex, GridError)> {
    let ncols = cells.shape().ncols;
    let step = |(i, slot): (usize, &mut Option<CellSlot<E>>)| {
        let slot = slot.as_mut().filter(|s| s.is_active())?;
        slot.engine
            .step()
            .err()
            .map(|err| (CellIndex::new(i / ncols, i % ncols), err))
    };

    // PARALLEL: each engine owns its state; the weather day is already loaded
    if cells.active_count() >= parallel_threshold {
        cells.slots_mut().par_iter_mut().enumerate().filter_map(step).collect()
    } else {
        cells.slots_mut().iter_mut().enumerate().filter_map(step).collect()
    }
}
