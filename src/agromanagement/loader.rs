//! Load agromanagement schedules from a zone/rotation directory tree

use crate::agromanagement::schedule::AgroSchedule;
use crate::core::error::{GridError, Result};
use crate::core::types::{RotationId, ZoneId};
use ahash::AHashMap;
use std::path::PathBuf;

/// Anything that can resolve the schedule for a zone and rotation type
pub trait ScheduleSource {
    fn load(&self, aez: ZoneId, rotation: RotationId) -> Result<AgroSchedule>;
}

/// Schedules stored as `AEZ_<aez:03>/rotation_type_<rot:02>.toml` under a root
#[derive(Debug, Clone)]
pub struct ScheduleDirectory {
    root: PathBuf,
}

impl ScheduleDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File holding the schedule for one zone and rotation type
    pub fn path_for(&self, aez: ZoneId, rotation: RotationId) -> PathBuf {
        self.root
            .join(format!("AEZ_{aez:03}"))
            .join(format!("rotation_type_{rotation:02}.toml"))
    }
}

impl ScheduleSource for ScheduleDirectory {
    fn load(&self, aez: ZoneId, rotation: RotationId) -> Result<AgroSchedule> {
        let path = self.path_for(aez, rotation);
        if !path.exists() {
            return Err(GridError::MissingInput(path));
        }
        let content = std::fs::read_to_string(&path)?;
        let schedule = AgroSchedule::from_toml_str(&content)?;
        tracing::debug!(aez, rotation, path = %path.display(), "read agromanagement");
        Ok(schedule)
    }
}

/// Fixed schedules keyed by zone and rotation, for programmatic setups
#[derive(Debug, Clone, Default)]
pub struct StaticSchedules {
    schedules: AHashMap<(ZoneId, RotationId), AgroSchedule>,
}

impl StaticSchedules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, aez: ZoneId, rotation: RotationId, schedule: AgroSchedule) -> Self {
        self.schedules.insert((aez, rotation), schedule);
        self
    }
}

impl ScheduleSource for StaticSchedules {
    fn load(&self, aez: ZoneId, rotation: RotationId) -> Result<AgroSchedule> {
        self.schedules.get(&(aez, rotation)).cloned().ok_or_else(|| {
            GridError::Config(format!(
                "no agromanagement defined for AEZ {aez} and crop rotation type {rotation}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_path_layout() {
        let dir = ScheduleDirectory::new("/agro");
        assert_eq!(
            dir.path_for(7, 3),
            PathBuf::from("/agro/AEZ_007/rotation_type_03.toml")
        );
        assert_eq!(
            dir.path_for(112, 14),
            PathBuf::from("/agro/AEZ_112/rotation_type_14.toml")
        );
    }

    #[test]
    fn test_missing_schedule_file() {
        let dir = ScheduleDirectory::new("/nonexistent/agro");
        assert!(matches!(dir.load(1, 1), Err(GridError::MissingInput(_))));
    }

    #[test]
    fn test_static_schedules() {
        let d = |m, day| NaiveDate::from_ymd_opt(2010, m, day).unwrap();
        let source = StaticSchedules::new().with(1, 2, AgroSchedule::new("barley", d(1, 1), d(3, 1), d(9, 30)));
        assert_eq!(source.load(1, 2).unwrap().crop_name, "barley");
        assert!(source.load(2, 1).is_err());
    }
}
