//! Crop calendar for one agro-ecological zone and rotation type

use crate::core::error::{GridError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Agromanagement definition driving one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgroSchedule {
    pub crop_name: String,
    #[serde(default)]
    pub variety: Option<String>,
    /// First day of the simulation window
    pub campaign_start: NaiveDate,
    /// Sowing (or emergence) date
    pub crop_start: NaiveDate,
    /// Last day of the simulation window
    pub campaign_end: NaiveDate,
}

impl AgroSchedule {
    pub fn new(crop_name: impl Into<String>, campaign_start: NaiveDate, crop_start: NaiveDate, campaign_end: NaiveDate) -> Self {
        Self {
            crop_name: crop_name.into(),
            variety: None,
            campaign_start,
            crop_start,
            campaign_end,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let schedule: Self = toml::from_str(content)?;
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<()> {
        if self.campaign_start > self.crop_start || self.crop_start > self.campaign_end {
            return Err(GridError::Config(format!(
                "agromanagement for {}: expected campaign_start ({}) <= crop_start ({}) <= campaign_end ({})",
                self.crop_name, self.campaign_start, self.crop_start, self.campaign_end
            )));
        }
        Ok(())
    }
}
