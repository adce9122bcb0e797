pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::SimulationClock;
pub use config::RunConfig;
pub use error::{GridError, Result};
