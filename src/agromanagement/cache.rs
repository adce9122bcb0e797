//! Per-build memo of schedules by zone and rotation type

use crate::agromanagement::loader::ScheduleSource;
use crate::agromanagement::schedule::AgroSchedule;
use crate::core::error::Result;
use crate::core::types::{RotationId, ZoneId};
use ahash::AHashMap;
use std::sync::Arc;

/// Resolves each (AEZ, rotation) pair from the source at most once
///
/// Lives for a single grid build, so nothing leaks between runs.
pub struct ScheduleCache<'a> {
    source: &'a dyn ScheduleSource,
    entries: AHashMap<(ZoneId, RotationId), Arc<AgroSchedule>>,
}

impl<'a> ScheduleCache<'a> {
    pub fn new(source: &'a dyn ScheduleSource) -> Self {
        Self {
            source,
            entries: AHashMap::new(),
        }
    }

    pub fn get(&mut self, aez: ZoneId, rotation: RotationId) -> Result<Arc<AgroSchedule>> {
        if let Some(schedule) = self.entries.get(&(aez, rotation)) {
            return Ok(Arc::clone(schedule));
        }
        let schedule = Arc::new(self.source.load(aez, rotation)?);
        self.entries.insert((aez, rotation), Arc::clone(&schedule));
        Ok(schedule)
    }

    /// Number of distinct pairs loaded
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
