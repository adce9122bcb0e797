use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Which end of the simulation window a check refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBound {
    Start,
    End,
}

impl std::fmt::Display for WindowBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowBound::Start => write!(f, "start"),
            WindowBound::End => write!(f, "end"),
        }
    }
}

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Input file {0} does not exist")]
    MissingInput(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Grid shape of {layer} is {found:?}, configuration defines {expected:?}")]
    GridShapeMismatch {
        layer: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error(
        "{which} date for model {engine} not equal to configuration {which} date {configured} \
         at row/col {row}/{col}, AEZ {aez} and crop rotation type {rotation}"
    )]
    InconsistentSimulationWindow {
        row: usize,
        col: usize,
        aez: i32,
        rotation: i32,
        which: WindowBound,
        engine: NaiveDate,
        configured: NaiveDate,
    },

    #[error("No valid {layer} value at row/col {row}/{col}")]
    MissingCellData {
        row: usize,
        col: usize,
        layer: String,
    },

    #[error("'{0}' not defined as a BMI variable")]
    UnknownVariable(String),

    #[error("Input array of shape {found:?} does not match grid shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Cell {row}/{col} outside grid of {nrows}x{ncols}")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    },

    #[error("Weather data unavailable for {day}: {reason}")]
    DataUnavailable { day: NaiveDate, reason: String },

    #[error("No simulation cell was instantiated on the grid")]
    EmptyGrid,

    #[error("Simulation already reached its end date {end}")]
    WindowExhausted { end: NaiveDate },

    #[error("Cannot {operation} while model is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    #[error("Engine failure at row/col {row}/{col}: {message}")]
    Engine {
        row: usize,
        col: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GridError>;
