//! Weekly grid and placement models.
//!
//! The grid defines which (day, period) cells exist in the teaching week.
//! It bounds both input validation (a slot must sit inside the grid) and
//! the auto-fix candidate space.
//!
//! # Ordering
//! Cells are enumerated day-major: every period of the first configured
//! day, then every period of the next, and so on.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Day;

/// A (day, period) position in the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Teaching day.
    pub day: Day,
    /// 1-based period.
    pub period: u32,
}

impl Placement {
    /// Creates a new placement.
    pub fn new(day: Day, period: u32) -> Self {
        Self { day, period }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} period {}", self.day, self.period)
    }
}

/// The configured teaching week: a set of days, each with the same
/// number of periods.
///
/// Missing fields take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeekGrid {
    /// Teaching days, in scan order.
    pub days: Vec<Day>,
    /// Periods per day (periods are numbered `1..=periods_per_day`).
    #[serde(alias = "periods_per_day")]
    pub periods_per_day: u32,
}

impl WeekGrid {
    /// Default number of periods per day.
    pub const DEFAULT_PERIODS: u32 = 8;

    /// Creates a grid over the given days.
    pub fn new(days: Vec<Day>, periods_per_day: u32) -> Self {
        Self {
            days,
            periods_per_day,
        }
    }

    /// Monday through Friday.
    pub fn weekdays(periods_per_day: u32) -> Self {
        Self::new(Day::ALL[..5].to_vec(), periods_per_day)
    }

    /// Monday through Saturday.
    pub fn full_week(periods_per_day: u32) -> Self {
        Self::new(Day::ALL.to_vec(), periods_per_day)
    }

    /// Whether the day is part of the grid.
    #[inline]
    pub fn has_day(&self, day: Day) -> bool {
        self.days.contains(&day)
    }

    /// Whether the period number is inside `1..=periods_per_day`.
    #[inline]
    pub fn has_period(&self, period: u32) -> bool {
        period >= 1 && period <= self.periods_per_day
    }

    /// Whether the placement is a cell of this grid.
    pub fn contains(&self, placement: Placement) -> bool {
        self.has_day(placement.day) && self.has_period(placement.period)
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.days.len() * self.periods_per_day as usize
    }

    /// Enumerates every cell, day-major.
    pub fn placements(&self) -> impl Iterator<Item = Placement> + '_ {
        self.days.iter().flat_map(move |&day| {
            (1..=self.periods_per_day).map(move |period| Placement::new(day, period))
        })
    }
}

impl Default for WeekGrid {
    fn default() -> Self {
        Self::full_week(Self::DEFAULT_PERIODS)
    }
}
