//! Domain models
//!
//! - **case**: one unit of demand, with derived capacity points
//! - **attending**: a qualified operator, aggregated from lab schedules
//! - **lab**: a capacity-bearing resource with a weekly operating schedule
//! - **roster**: the static lab/attending/weekday-policy universe of a run
//! - **slot**: one placement opportunity (date × lab × eligible attendings)
//! - **day**: the ordered slots of one date plus live point consumption
//! - **board**: the full day horizon, case arena, and outcome counters

pub mod attending;
pub mod board;
pub mod case;
pub mod day;
pub mod lab;
pub mod roster;
pub mod slot;

pub use attending::{Attending, AttendingId};
pub use board::{forced_over_counter, Board, ScheduleCounts};
pub use board::{
    ADDED_SLOT_CASES, FORCED_OVER_ALL_CASES, TOTAL_FORCED_CASES, UNSCHEDULED_CASES,
};
pub use case::{Assignment, AttrValue, Case, CaseId, CaseRecord};
pub use day::Day;
pub use lab::{Lab, LabDayParams, LabId};
pub use roster::{PointLimits, Roster, WeekdayPolicy};
pub use slot::Slot;

/// Weekday names indexed Monday = 0, matching [`weekday_index`].
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Index of a weekday with Monday = 0 and Sunday = 6.
pub fn weekday_index(weekday: chrono::Weekday) -> usize {
    weekday.num_days_from_monday() as usize
}

/// Whether a weekday index falls on a weekend.
pub fn is_weekend(weekday: usize) -> bool {
    weekday >= 5
}
