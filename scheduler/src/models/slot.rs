//! Slot model
//!
//! One placement opportunity: a date, a lab, the attendings eligible to
//! staff it, and at most one occupying case. An occupant, once set, is only
//! replaced by the explicit reorder pass.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::attending::AttendingId;
use super::case::CaseId;
use super::lab::LabId;
use super::weekday_index;

/// One placement opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    date: NaiveDate,
    lab: LabId,

    /// Attendings eligible to take a case in this slot
    attendings: Vec<AttendingId>,

    occupant: Option<CaseId>,
}

impl Slot {
    pub fn new(date: NaiveDate, lab: LabId, attendings: Vec<AttendingId>) -> Self {
        Self {
            date,
            lab,
            attendings,
            occupant: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn lab(&self) -> LabId {
        self.lab
    }

    pub fn attendings(&self) -> &[AttendingId] {
        &self.attendings
    }

    pub fn occupant(&self) -> Option<CaseId> {
        self.occupant
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// Weekday index of the slot's date, Monday = 0.
    pub fn weekday(&self) -> usize {
        weekday_index(self.date.weekday())
    }

    pub(crate) fn set_occupant(&mut self, case: CaseId) {
        self.occupant = Some(case);
    }
}
