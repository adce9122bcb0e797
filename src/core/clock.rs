//! Simulation clock for daily stepping
//!
//! Tracks the simulated day between a fixed start and end date.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Clock advancing one calendar day per step inside a closed window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationClock {
    start: NaiveDate,
    end: NaiveDate,
    current: NaiveDate,
}

impl SimulationClock {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            current: start,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn current(&self) -> NaiveDate {
        self.current
    }

    /// The day the next step will move to
    pub fn next_day(&self) -> NaiveDate {
        self.current + Duration::days(1)
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.end
    }

    /// Days elapsed since the start date
    pub fn elapsed_days(&self) -> i64 {
        (self.current - self.start).num_days()
    }

    pub fn advance(&mut self) {
        self.current = self.next_day();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_clock_advances() {
        let mut clock = SimulationClock::new(date(2010, 1, 1), date(2010, 1, 3));
        assert_eq!(clock.current(), date(2010, 1, 1));
        assert_eq!(clock.next_day(), date(2010, 1, 2));
        assert!(!clock.is_finished());

        clock.advance();
        assert_eq!(clock.elapsed_days(), 1);

        clock.advance();
        assert!(clock.is_finished());
        assert_eq!(clock.elapsed_days(), 2);
    }

    #[test]
    fn test_clock_crosses_year_boundary() {
        let mut clock = SimulationClock::new(date(2010, 12, 31), date(2011, 1, 5));
        clock.advance();
        assert_eq!(clock.current(), date(2011, 1, 1));
    }
}
