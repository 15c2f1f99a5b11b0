//! Day model
//!
//! An ordered set of slots for one date, plus the running overall point
//! consumption checked against that weekday's budget. Per-attribute totals
//! are deliberately not cached here: occupancy changes between checks
//! within a batch, so attribute-scoped totals are recomputed by scanning
//! slots (see `Board::attribute_cap_ok`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::slot::Slot;

/// One date on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    date: NaiveDate,

    /// Weekday index, Monday = 0
    weekday: usize,

    slots: Vec<Slot>,

    /// Overall points consumed by capacity-checked placements
    ///
    /// Updated only when an overall-cap check admits a case; ignored cases
    /// and forced placements do not consume budget.
    points_used: f64,
}

impl Day {
    pub fn new(date: NaiveDate, weekday: usize) -> Self {
        Self {
            date,
            weekday,
            slots: Vec::new(),
            points_used: 0.0,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> usize {
        self.weekday
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn points_used(&self) -> f64 {
        self.points_used
    }

    /// Remaining overall budget; unlimited when no limit is configured.
    pub fn free_points(&self, overall_limit: Option<f64>) -> f64 {
        match overall_limit {
            Some(limit) => limit - self.points_used,
            None => f64::INFINITY,
        }
    }

    /// Admit a case against the overall budget, consuming on success.
    ///
    /// Ignored cases always pass and consume nothing.
    pub(crate) fn admit_points(
        &mut self,
        case_points: f64,
        ignored: bool,
        overall_limit: Option<f64>,
    ) -> bool {
        if ignored {
            return true;
        }
        if let Some(limit) = overall_limit {
            if self.points_used + case_points > limit {
                return false;
            }
        }
        self.points_used += case_points;
        true
    }

    pub(crate) fn push_slot(&mut self, slot: Slot) {
        self.slots.push(slot);
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Slot {
        &mut self.slots[index]
    }
}
