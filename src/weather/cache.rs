//! Single-slot, day-indexed weather layer cache
//!
//! All cells of the grid ask for weather of the same day within one update,
//! so the cache keeps exactly one day materialized. A request for any other
//! day replaces the whole layer with one bulk read from the dataset.

use crate::core::error::{GridError, Result};
use crate::core::types::GridShape;
use crate::weather::dataset::WeatherDataset;
use crate::weather::record::{DayLayer, WeatherRecord};
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct ActiveLayer {
    day: NaiveDate,
    layer: DayLayer,
}

/// Shared weather cache read by every cell engine
pub struct WeatherLayerCache {
    dataset: Arc<dyn WeatherDataset>,
    shape: GridShape,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    slot: RwLock<Option<ActiveLayer>>,
    reloads: AtomicUsize,
}

impl WeatherLayerCache {
    /// Wrap a dataset whose axes must match the grid definition
    pub fn new(dataset: Arc<dyn WeatherDataset>, shape: GridShape) -> Result<Self> {
        let found = (dataset.latitudes().len(), dataset.longitudes().len());
        if found != shape.as_tuple() {
            return Err(GridError::GridShapeMismatch {
                layer: "weather dataset".into(),
                expected: shape.as_tuple(),
                found,
            });
        }
        tracing::warn!("TMIN, TMAX, DTEMP and IRRAD are synthesized from TEMP and PET");
        Ok(Self {
            latitudes: dataset.latitudes().to_vec(),
            longitudes: dataset.longitudes().to_vec(),
            dataset,
            shape,
            slot: RwLock::new(None),
            reloads: AtomicUsize::new(0),
        })
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Day currently materialized, if any
    pub fn active_day(&self) -> Option<NaiveDate> {
        self.slot.read().as_ref().map(|active| active.day)
    }

    /// Number of bulk reads performed so far
    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::Relaxed)
    }

    /// Materialize `day` up front so concurrent readers never trigger a reload
    pub fn ensure_day(&self, day: NaiveDate) -> Result<()> {
        if self.active_day() == Some(day) {
            return Ok(());
        }
        let mut slot = self.slot.write();
        self.reload_locked(&mut slot, day)?;
        Ok(())
    }

    /// Driving variables for one cell on one day
    pub fn record_for(&self, day: NaiveDate, row: usize, col: usize) -> Result<WeatherRecord> {
        if !self.shape.contains(row, col) {
            return Err(GridError::IndexOutOfBounds {
                row,
                col,
                nrows: self.shape.nrows,
                ncols: self.shape.ncols,
            });
        }

        {
            let slot = self.slot.read();
            if let Some(active) = slot.as_ref().filter(|active| active.day == day) {
                return Ok(self.build_record(active, row, col));
            }
        }

        let mut slot = self.slot.write();
        let active = self.reload_locked(&mut slot, day)?;
        Ok(self.build_record(active, row, col))
    }

    fn build_record(&self, active: &ActiveLayer, row: usize, col: usize) -> WeatherRecord {
        active
            .layer
            .record(active.day, row, col, self.latitudes[row], self.longitudes[col])
    }

    /// Replace the slot unless another writer already loaded `day`
    fn reload_locked<'a>(&self, slot: &'a mut Option<ActiveLayer>, day: NaiveDate) -> Result<&'a ActiveLayer> {
        let stale = slot.as_ref().map_or(true, |active| active.day != day);
        if stale {
            let raw = self.dataset.read_day(day)?;
            match raw.shape() {
                Some(found) if found == self.shape.as_tuple() => {}
                found => {
                    return Err(GridError::DataUnavailable {
                        day,
                        reason: format!(
                            "layer bounds {:?} do not match grid {:?}",
                            found,
                            self.shape.as_tuple()
                        ),
                    })
                }
            }
            *slot = Some(ActiveLayer {
                day,
                layer: DayLayer::derive(&raw),
            });
            self.reloads.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%day, "loaded weather layer");
        }
        slot.as_ref().ok_or_else(|| GridError::DataUnavailable {
            day,
            reason: "weather slot empty after reload".into(),
        })
    }
}

impl std::fmt::Debug for WeatherLayerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherLayerCache")
            .field("shape", &self.shape)
            .field("active_day", &self.active_day())
            .field("reloads", &self.reload_count())
            .finish()
    }
}
