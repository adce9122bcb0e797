//! Grid construction from categorical masks
//!
//! Walks the raster in row-major order, keeps cells whose AEZ and rotation
//! type are both relevant, and instantiates one engine per kept cell. Every
//! engine must report the configured simulation window, otherwise the grid
//! could not be advanced in lock-step.

use crate::agromanagement::{ScheduleCache, ScheduleSource};
use crate::core::config::{RunConfig, RuntimeWindow};
use crate::core::error::{GridError, Result, WindowBound};
use crate::core::types::{CellIndex, RotationId, ZoneId};
use crate::engine::{CellContext, EngineFactory, SimulationEngine, SiteParameters, SoilParameters};
use crate::grid::cells::CellGrid;
use crate::grid::inputs::GridInputs;
use crate::weather::WeatherLayerCache;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// Builds the cell grid for one run
pub struct GridBuilder<'a> {
    config: &'a RunConfig,
}

impl<'a> GridBuilder<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// Instantiate engines for all eligible cells
    ///
    /// Fails on the first structural problem in raster order: mask shapes
    /// differing from the grid metadata, a missing schedule or rooting depth,
    /// or an engine whose window differs from the configured one.
    pub fn build<F: EngineFactory>(
        &self,
        inputs: &GridInputs,
        schedules: &dyn ScheduleSource,
        factory: &F,
        weather: &Arc<WeatherLayerCache>,
    ) -> Result<CellGrid<F::Engine>> {
        let started = Instant::now();
        let shape = self.config.shape();
        inputs.check_shape(shape)?;

        // Schedules are memoized for this build only
        let mut schedule_cache = ScheduleCache::new(schedules);
        let mut pending = Vec::new();
        let progress_step = (shape.nrows / 10).max(1);

        for cell in shape.cells() {
            if cell.col == 0 && cell.row % progress_step == 0 {
                tracing::debug!(
                    "Initializing: {:.1}%",
                    cell.row as f64 / shape.nrows as f64 * 100.0
                );
            }

            let at = [cell.row, cell.col];
            let rotation = inputs.rotation[at];
            let aez = inputs.aez[at];
            if !self.config.is_relevant_rotation(rotation) || !self.config.is_relevant_aez(aez) {
                continue;
            }

            let schedule = schedule_cache.get(aez, rotation)?;
            let rooting_depth = inputs.rooting_depth[at];
            if rooting_depth.is_nan() {
                return Err(GridError::MissingCellData {
                    row: cell.row,
                    col: cell.col,
                    layer: "rooting depth".into(),
                });
            }

            pending.push(CellContext {
                cell,
                aez,
                rotation,
                schedule,
                soil: SoilParameters::with_rooting_depth(rooting_depth),
                site: SiteParameters::default(),
                weather: Arc::clone(weather),
            });
        }

        let create = |context: CellContext| {
            let (cell, aez, rotation) = (context.cell, context.aez, context.rotation);
            (cell, aez, rotation, factory.create(context))
        };

        // PARALLEL: cells are independent, collect keeps raster order
        let created: Vec<_> = if pending.len() >= self.config.execution.parallel_threshold {
            pending.into_par_iter().map(create).collect()
        } else {
            pending.into_iter().map(create).collect()
        };

        let mut grid = CellGrid::new(shape);
        for (cell, aez, rotation, engine) in created {
            let engine = engine?;
            check_simulation_window(&engine, &self.config.runtime, cell, aez, rotation)?;
            grid.insert(cell, engine);
        }

        tracing::info!(
            active_cells = grid.active_count(),
            schedules = schedule_cache.len(),
            "Initializing took {:.3} seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(grid)
    }
}

/// Check one engine's start/end date against the configured window
pub fn check_simulation_window<E: SimulationEngine>(
    engine: &E,
    window: &RuntimeWindow,
    cell: CellIndex,
    aez: ZoneId,
    rotation: RotationId,
) -> Result<()> {
    let checks = [
        (WindowBound::Start, engine.start_date(), window.start_date),
        (WindowBound::End, engine.end_date(), window.end_date),
    ];
    for (which, engine_date, configured) in checks {
        if engine_date != configured {
            return Err(GridError::InconsistentSimulationWindow {
                row: cell.row,
                col: cell.col,
                aez,
                rotation,
                which,
                engine: engine_date,
                configured,
            });
        }
    }
    Ok(())
}
