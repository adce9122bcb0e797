//! The sparse cell grid and how it is built

pub mod builder;
pub mod cells;
pub mod inputs;

pub use builder::{check_simulation_window, GridBuilder};
pub use cells::{CellGrid, CellSlot, CellStatus};
pub use inputs::GridInputs;
