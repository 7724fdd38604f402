use serde::{Deserialize, Serialize};

use crate::types::day::DayId;
use crate::types::journal::JournalBook;

/// Distance and climbing accumulated by the end of a day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub miles: f64,
    pub elevation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JourneyStats {
    /// `None` before the first day, when everything is still zero.
    pub day: Option<DayId>,
    pub total_days: u16,
    pub totals: Totals,
    pub progress_percent: u32,
}

impl JourneyStats {
    pub fn at(journal: &JournalBook, day: DayId, total_days: u16) -> Self {
        Self {
            day: Some(day),
            total_days,
            totals: totals(journal, day),
            progress_percent: progress_percent(day, total_days),
        }
    }

    pub fn before_start(total_days: u16) -> Self {
        Self {
            day: None,
            total_days,
            totals: Totals::default(),
            progress_percent: 0,
        }
    }
}

/// Sums the metrics of every entry up to and including `active`. Days with
/// no metrics count as zero.
pub fn totals(journal: &JournalBook, active: DayId) -> Totals {
    journal
        .iter()
        .filter(|(day, _)| **day <= active)
        .filter_map(|(_, entry)| entry.metrics)
        .fold(Totals::default(), |acc, m| Totals {
            miles: acc.miles + m.miles,
            elevation: acc.elevation + m.elevation,
        })
}

/// Share of the journey reached by `active`, rounded to a whole percent.
pub fn progress_percent(active: DayId, total_days: u16) -> u32 {
    if total_days == 0 {
        return 0;
    }
    let pct = f64::from(active.get()) / f64::from(total_days) * 100.0;
    pct.round().clamp(0.0, 100.0) as u32
}
