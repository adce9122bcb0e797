//! Agromanagement schedules per agro-ecological zone and rotation type

pub mod cache;
pub mod loader;
pub mod schedule;

pub use cache::ScheduleCache;
pub use loader::{ScheduleDirectory, ScheduleSource, StaticSchedules};
pub use schedule::AgroSchedule;
