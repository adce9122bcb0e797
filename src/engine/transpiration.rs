//! Transpiration forced by the coupled hydrological model
//!
//! Actual and potential transpiration are injected from outside each day.
//! Soil evaporation is computed by the hydrological model, so it is zero here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rates published for one day (cm/day)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TranspirationRates {
    pub evsmx: f64,
    pub evs: f64,
    pub tra: f64,
    pub tramx: f64,
    /// Reduction factor for transpiration, in [0, 1]
    pub rftra: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForcedTranspiration {
    tra: f64,
    tramx: f64,
}

impl Default for ForcedTranspiration {
    fn default() -> Self {
        Self { tra: 1.0, tramx: 1.0 }
    }
}

impl ForcedTranspiration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tra(&self) -> f64 {
        self.tra
    }

    pub fn tramx(&self) -> f64 {
        self.tramx
    }

    pub fn set_tra(&mut self, value: f64) {
        self.tra = value;
    }

    pub fn set_tramx(&mut self, value: f64) {
        self.tramx = value;
    }

    /// Rates for `day`; a zero potential transpiration means no stress
    pub fn rates(&self, day: NaiveDate) -> TranspirationRates {
        let rftra = match reduction_factor(self.tra, self.tramx) {
            Some(rf) => rf,
            None => {
                tracing::warn!(%day, tra = self.tra, tramx = self.tramx, "Zero division when computing RFTRA");
                1.0
            }
        };
        TranspirationRates {
            evsmx: 0.0,
            evs: 0.0,
            tra: self.tra,
            tramx: self.tramx,
            rftra,
        }
    }
}

/// `tra / tramx` limited to [0, 1], `None` when the ratio is undefined
pub fn reduction_factor(tra: f64, tramx: f64) -> Option<f64> {
    if tramx == 0.0 {
        return None;
    }
    let ratio = tra / tramx;
    ratio.is_finite().then(|| ratio.clamp(0.0, 1.0))
}
