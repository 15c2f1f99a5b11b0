//! Lab model
//!
//! A lab is a named capacity-bearing resource. Per weekday it carries the
//! attendings staffing it, the procedure categories it accepts, and how
//! many slots it offers. A lab with no parameters for a weekday is closed
//! that day.

use serde::{Deserialize, Serialize};

use super::attending::AttendingId;

/// Index of a lab in the roster's lab table.
pub type LabId = usize;

/// Operating parameters of a lab on one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabDayParams {
    /// Attendings staffing the lab, in configuration order
    pub attendings: Vec<AttendingId>,

    /// Procedure categories the lab accepts
    pub procedures: Vec<String>,

    /// Number of slots offered
    pub slot_count: usize,
}

/// A capacity-bearing resource with a weekly operating schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    name: String,

    /// Per-weekday parameters, indexed Monday = 0; `None` means closed
    day_params: [Option<LabDayParams>; 7],
}

impl Lab {
    pub fn new(name: String, day_params: [Option<LabDayParams>; 7]) -> Self {
        Self { name, day_params }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operating parameters for a weekday (Monday = 0), if open.
    pub fn day_params(&self, weekday: usize) -> Option<&LabDayParams> {
        self.day_params[weekday].as_ref()
    }

    /// Whether the lab operates on the given weekday.
    pub fn is_open(&self, weekday: usize) -> bool {
        self.day_params[weekday].is_some()
    }

    /// Whether the lab accepts the given procedure on the given weekday.
    pub fn allows_procedure(&self, weekday: usize, procedure: &str) -> bool {
        self.day_params(weekday)
            .map(|p| p.procedures.iter().any(|x| x == procedure))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_days_and_procedures() {
        let mut days: [Option<LabDayParams>; 7] = Default::default();
        days[0] = Some(LabDayParams {
            attendings: vec![0],
            procedures: vec!["A".to_string()],
            slot_count: 2,
        });
        let lab = Lab::new("Lab 1".to_string(), days);

        assert!(lab.is_open(0));
        assert!(!lab.is_open(1));
        assert!(lab.allows_procedure(0, "A"));
        assert!(!lab.allows_procedure(0, "B"));
        assert!(!lab.allows_procedure(3, "A"));
    }
}
