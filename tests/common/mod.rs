//! Shared fixtures for the integration tests

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use gridded_crop::agromanagement::{AgroSchedule, StaticSchedules};
use gridded_crop::core::error::{GridError, Result};
use gridded_crop::core::types::CellIndex;
use gridded_crop::engine::{CellContext, EngineFactory, SimulationEngine};
use gridded_crop::weather::{InMemoryWeatherDataset, RawDayLayer, WeatherDataset};
use gridded_crop::RunConfig;
use ndarray::Array2;
use std::sync::Arc;

pub const AEZ: i32 = 1;
pub const ROTATION: i32 = 2;

pub fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, m, d).unwrap()
}

/// Configuration for an April 2010 run on an `nrows` x `ncols` grid
pub fn config(nrows: usize, ncols: usize) -> RunConfig {
    let toml = format!(
        r#"
        [grid]
        nrows = {nrows}
        ncols = {ncols}

        [maps.aez]
        location = "aez.json"
        relevant = [{AEZ}]

        [maps.crop_rotation]
        location = "rotation.json"
        relevant = [{ROTATION}]

        [maps.rooting_depth]
        location = "rooting_depth.json"

        [weather]
        location = "weather.json"

        [agromanagement]
        location = "agromanagement"

        [runtime]
        start_date = "2010-04-01"
        end_date = "2010-04-30"
        "#
    );
    RunConfig::from_toml_str(&toml).unwrap()
}

/// Uniform weather from April 1st on
pub fn dataset(nrows: usize, ncols: usize, days: i64, temp: f64) -> Arc<dyn WeatherDataset> {
    let latitudes = (0..nrows).map(|r| 52.0 - r as f64 * 0.5).collect();
    let longitudes = (0..ncols).map(|c| 5.0 + c as f64 * 0.5).collect();
    let mut ds = InMemoryWeatherDataset::new(latitudes, longitudes);
    for i in 0..days {
        let layer = RawDayLayer {
            temp: Array2::from_elem((nrows, ncols), temp),
            precip: Array2::from_elem((nrows, ncols), 2.0),
            pet: Array2::from_elem((nrows, ncols), 3.5),
        };
        ds.insert_day(date(4, 1) + Duration::days(i), layer).unwrap();
    }
    Arc::new(ds)
}

pub fn schedules() -> StaticSchedules {
    StaticSchedules::new().with(AEZ, ROTATION, AgroSchedule::new("maize", date(4, 1), date(4, 1), date(4, 30)))
}

/// Rotation mask marking only the given cells as relevant
pub fn rotation_mask(nrows: usize, ncols: usize, relevant: &[(usize, usize)]) -> Array2<i32> {
    let mut mask = Array2::zeros((nrows, ncols));
    for &(r, c) in relevant {
        mask[[r, c]] = ROTATION;
    }
    mask
}

/// Engine that counts steps and fails on request
#[derive(Debug)]
pub struct ProbeEngine {
    pub cell: CellIndex,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub day: NaiveDate,
    pub steps: usize,
    pub fails: bool,
    pub tra: f64,
}

impl SimulationEngine for ProbeEngine {
    fn step(&mut self) -> Result<()> {
        if self.fails {
            return Err(GridError::Config(format!("probe failure at {}", self.cell)));
        }
        self.day += Duration::days(1);
        self.steps += 1;
        Ok(())
    }

    fn get_variable(&self, name: &str) -> Option<f64> {
        match name {
            "LAI" => Some(self.steps as f64),
            "TRA" => Some(self.tra),
            _ => None,
        }
    }

    fn set_variable(&mut self, name: &str, value: f64) -> Result<()> {
        match name {
            "TRA" | "TRAMX" => {
                self.tra = value;
                Ok(())
            }
            _ => Err(GridError::UnknownVariable(name.to_string())),
        }
    }

    fn start_date(&self) -> NaiveDate {
        self.start
    }

    fn end_date(&self) -> NaiveDate {
        self.end
    }

    fn current_day(&self) -> NaiveDate {
        self.day
    }
}

/// Builds probe engines, failing ones at the listed cells
#[derive(Debug, Default)]
pub struct ProbeFactory {
    pub failing: Vec<CellIndex>,
}

impl EngineFactory for ProbeFactory {
    type Engine = ProbeEngine;

    fn create(&self, context: CellContext) -> Result<ProbeEngine> {
        Ok(ProbeEngine {
            cell: context.cell,
            start: context.schedule.campaign_start,
            end: context.schedule.campaign_end,
            day: context.schedule.campaign_start,
            steps: 0,
            fails: self.failing.contains(&context.cell),
            tra: 0.0,
        })
    }
}
