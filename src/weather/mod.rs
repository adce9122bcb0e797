//! Gridded weather: dataset access, derived fields and the day-layer cache

pub mod cache;
pub mod dataset;
pub mod record;

pub use cache::WeatherLayerCache;
pub use dataset::{InMemoryWeatherDataset, WeatherDataset};
pub use record::{DayLayer, RawDayLayer, WeatherRecord};
