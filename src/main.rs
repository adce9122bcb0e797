//! Gridded crop growth - command line runner
//!
//! Initializes the grid from a configuration file, steps it day by day and
//! prints a summary of one output variable per day.

use clap::Parser;
use gridded_crop::core::error::{GridError, Result};
use gridded_crop::engine::DegreeDayEngine;
use gridded_crop::{Bmi, GriddedCropModel};
use ndarray::Array2;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Run the gridded crop model over its configured window
#[derive(Parser, Debug)]
#[command(name = "gridded-crop")]
#[command(about = "Step a grid of crop simulations and report one output variable")]
struct Args {
    /// Run configuration (TOML)
    #[arg(long)]
    config: PathBuf,

    /// Number of days to simulate, defaults to the end of the window
    #[arg(long)]
    days: Option<u64>,

    /// Output variable to summarize
    #[arg(long, default_value = "LAI")]
    variable: String,

    /// Directory receiving one JSON grid per simulated day
    #[arg(long)]
    dump_dir: Option<PathBuf>,
}

/// One day of output written to the dump directory
#[derive(Serialize)]
struct DayDump<'a> {
    day: String,
    variable: &'a str,
    /// Rows of the grid, no-data cells as null
    values: Vec<Vec<f64>>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gridded_crop=info")),
        )
        .init();

    let mut model: GriddedCropModel<DegreeDayEngine> = GriddedCropModel::new();
    Bmi::initialize(&mut model, &args.config)?;
    let simulated = run(&mut model, &args)?;
    model.finalize()?;
    println!("Simulated {} days", simulated);
    Ok(())
}

/// Step the initialized model and report the chosen variable per day
fn run(model: &mut GriddedCropModel<DegreeDayEngine>, args: &Args) -> Result<u64> {
    if !model.get_output_var_names().contains(&args.variable.as_str()) {
        return Err(GridError::UnknownVariable(args.variable.clone()));
    }
    let (nrows, ncols) = model.get_grid_shape()?;
    let window = model
        .config()
        .map(|config| config.runtime)
        .ok_or_else(|| GridError::InvalidState {
            operation: "run",
            state: model.state().to_string(),
        })?;
    println!(
        "{} | grid {}x{} | {} active cells | {} to {}",
        model.get_component_name(),
        nrows,
        ncols,
        model.active_cell_count(),
        window.start_date,
        window.end_date
    );

    if model.active_cell_count() == 0 {
        println!("No relevant cells, nothing to simulate");
        return Ok(0);
    }

    if let Some(dir) = &args.dump_dir {
        std::fs::create_dir_all(dir)?;
    }

    let limit = args.days.unwrap_or(u64::MAX);
    let mut simulated = 0;
    while simulated < limit && model.get_current_time()? < window.end_date {
        model.update()?;
        simulated += 1;

        let day = model.get_current_time()?;
        let values = model.get_value(&args.variable)?;
        let (cells, mean) = summarize(&values);
        println!(
            "{}  active={}  mean {}={:.4}",
            day, cells, args.variable, mean
        );

        if let Some(dir) = &args.dump_dir {
            dump_day(dir, &day.to_string(), &args.variable, &values)?;
        }
    }
    Ok(simulated)
}

/// Count and mean of the cells holding data
fn summarize(values: &Array2<f64>) -> (usize, f64) {
    let (count, sum) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0usize, 0.0), |(n, s), v| (n + 1, s + v));
    let mean = if count > 0 { sum / count as f64 } else { f64::NAN };
    (count, mean)
}

fn dump_day(dir: &Path, day: &str, variable: &str, values: &Array2<f64>) -> Result<()> {
    let dump = DayDump {
        day: day.to_string(),
        variable,
        values: values.outer_iter().map(|row| row.to_vec()).collect(),
    };
    let path = dir.join(format!("{}_{}.json", variable, day));
    std::fs::write(path, serde_json::to_string(&dump)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use gridded_crop::agromanagement::{AgroSchedule, StaticSchedules};
    use gridded_crop::engine::DegreeDayFactory;
    use gridded_crop::grid::GridInputs;
    use gridded_crop::weather::{InMemoryWeatherDataset, RawDayLayer};
    use gridded_crop::RunConfig;
    use std::sync::Arc;

    const CONFIG: &str = r#"
        [grid]
        nrows = 1
        ncols = 2

        [maps.aez]
        location = "aez.json"
        relevant = [1]

        [maps.crop_rotation]
        location = "rotation.json"
        relevant = [1]

        [maps.rooting_depth]
        location = "rooting_depth.json"

        [weather]
        location = "weather.json"

        [agromanagement]
        location = "agromanagement"

        [runtime]
        start_date = "2010-04-01"
        end_date = "2010-04-04"
    "#;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2010, 4, d).unwrap()
    }

    fn model(rotation: [i32; 2]) -> GriddedCropModel<DegreeDayEngine> {
        let mut dataset = InMemoryWeatherDataset::new(vec![52.0], vec![5.0, 5.5]);
        for i in 0..4 {
            let layer = RawDayLayer {
                temp: Array2::from_elem((1, 2), 15.0),
                precip: Array2::zeros((1, 2)),
                pet: Array2::from_elem((1, 2), 2.0),
            };
            dataset.insert_day(date(1) + Duration::days(i), layer).unwrap();
        }
        let inputs = GridInputs::new(
            Array2::from_elem((1, 2), 1),
            Array2::from_shape_vec((1, 2), rotation.to_vec()).unwrap(),
            Array2::from_elem((1, 2), 100.0),
        );
        let schedules = StaticSchedules::new().with(1, 1, AgroSchedule::new("maize", date(1), date(1), date(4)));
        let mut model = GriddedCropModel::new();
        model
            .initialize_with(
                RunConfig::from_toml_str(CONFIG).unwrap(),
                &inputs,
                Arc::new(dataset),
                &schedules,
                &DegreeDayFactory::default(),
            )
            .unwrap();
        model
    }

    fn args(days: Option<u64>) -> Args {
        Args {
            config: PathBuf::from("run.toml"),
            days,
            variable: "LAI".into(),
            dump_dir: None,
        }
    }

    #[test]
    fn test_empty_grid_exits_cleanly() {
        let mut model = model([0, 0]);
        assert_eq!(run(&mut model, &args(None)).unwrap(), 0);
    }

    #[test]
    fn test_runs_to_end_of_window() {
        let mut model = model([1, 0]);
        assert_eq!(run(&mut model, &args(None)).unwrap(), 3);
        assert_eq!(model.get_current_time().unwrap(), date(4));
    }

    #[test]
    fn test_day_limit() {
        let mut model = model([1, 1]);
        assert_eq!(run(&mut model, &args(Some(2))).unwrap(), 2);
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let mut model = model([1, 1]);
        let mut args = args(None);
        args.variable = "SM".into();
        assert!(matches!(run(&mut model, &args), Err(GridError::UnknownVariable(_))));
    }
}
