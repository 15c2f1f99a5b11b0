//! Attending model
//!
//! An attending is a named operator qualified for a set of procedure
//! categories on a set of weekdays. Attendings are not configured directly;
//! they are aggregated from lab day schedules by [`Roster::build`].
//!
//! [`Roster::build`]: crate::models::Roster::build

use serde::{Deserialize, Serialize};

/// Index of an attending in the roster's attending table.
pub type AttendingId = usize;

/// A qualified operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attending {
    name: String,

    /// Procedure categories this attending can perform
    procedures: Vec<String>,

    /// Weekdays worked, indexed Monday = 0
    weekdays: [bool; 7],
}

impl Attending {
    pub fn new(name: String, procedures: Vec<String>, weekdays: [bool; 7]) -> Self {
        Self {
            name,
            procedures,
            weekdays,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn procedures(&self) -> &[String] {
        &self.procedures
    }

    /// Whether this attending is qualified for the given procedure.
    pub fn can_perform(&self, procedure: &str) -> bool {
        self.procedures.iter().any(|p| p == procedure)
    }

    /// Whether this attending works on the given weekday (Monday = 0).
    pub fn works_on(&self, weekday: usize) -> bool {
        self.weekdays[weekday]
    }

    pub(crate) fn add_procedure(&mut self, procedure: &str) {
        if !self.can_perform(procedure) {
            self.procedures.push(procedure.to_string());
        }
    }

    pub(crate) fn add_weekday(&mut self, weekday: usize) {
        self.weekdays[weekday] = true;
    }
}
