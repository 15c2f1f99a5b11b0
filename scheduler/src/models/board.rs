//! Board model
//!
//! The board is the full day horizon of one iteration: every day from
//! `start − warmup` through `end + window`, each populated with the slots
//! its weekday policy opens. It owns the case arena, the outcome counters,
//! and the per-weekday placement distribution, and it answers the capacity
//! and eligibility queries the placement strategies need.
//!
//! Capacity accounting follows two regimes on purpose:
//! - the overall budget is tracked incrementally per day (`points_used`),
//! - per-attribute totals are recomputed by scanning slots at every check,
//!   since occupancy changes between checks within the same batch.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{AddedSlotAttribute, CapScope, ConfigError, SimulationConfig};

use super::attending::AttendingId;
use super::case::{Assignment, Case, CaseId};
use super::day::Day;
use super::lab::LabId;
use super::roster::Roster;
use super::slot::Slot;
use super::{weekday_index, WEEKDAY_NAMES};

/// Counter: cases that could not be placed anywhere in their window.
pub const UNSCHEDULED_CASES: &str = "unscheduled_overall_cases";

/// Counter: cases placed into a slot appended beyond configured capacity.
pub const ADDED_SLOT_CASES: &str = "added_slot_scheduled_cases";

/// Counter: all forced placements, regardless of which limit broke.
pub const TOTAL_FORCED_CASES: &str = "total_forcibly_scheduled_cases";

/// Counter: forced placements that violated every priority attribute.
pub const FORCED_OVER_ALL_CASES: &str = "forcibly_scheduled_over_all_cases";

/// Counter name for forced placements violating one named attribute.
pub fn forced_over_counter(attribute: &str) -> String {
    format!("forcibly_scheduled_over_{attribute}_cases")
}

/// Scheduling-outcome counters for one iteration
///
/// The counter set is fixed at board construction from the active point
/// attributes; incrementing a name outside that set is a fatal
/// configuration error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCounts {
    counts: BTreeMap<String, u64>,
}

impl ScheduleCounts {
    /// Initialize the counter set for the given active attributes.
    pub fn new(active_attrs: &[String]) -> Self {
        let mut counts = BTreeMap::new();
        counts.insert(UNSCHEDULED_CASES.to_string(), 0);
        counts.insert(ADDED_SLOT_CASES.to_string(), 0);
        counts.insert(TOTAL_FORCED_CASES.to_string(), 0);
        for attr in active_attrs {
            counts.insert(forced_over_counter(attr), 0);
        }
        if active_attrs.len() > 1 {
            counts.insert(FORCED_OVER_ALL_CASES.to_string(), 0);
        }
        Self { counts }
    }

    /// Add to a counter.
    ///
    /// # Errors
    /// [`ConfigError::UnknownCounter`] when the name was never initialized.
    pub fn add(&mut self, name: &str, amount: u64) -> Result<(), ConfigError> {
        match self.counts.get_mut(name) {
            Some(count) => {
                *count += amount;
                Ok(())
            }
            None => Err(ConfigError::UnknownCounter(name.to_string())),
        }
    }

    /// Current value of a counter (0 for unknown names).
    pub fn get(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }
}

/// The full scheduling horizon of one iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    start_date: NaiveDate,
    end_date: NaiveDate,
    board_start_date: NaiveDate,

    lead_days: usize,
    window_days: usize,

    roster: Roster,
    days: Vec<Day>,

    /// Case arena; slots reference cases by index
    cases: Vec<Case>,

    counts: ScheduleCounts,

    /// Placements inside the reporting period, per weekday (Monday = 0)
    weekday_placements: [u64; 7],

    /// Active point attribute names, in configuration order
    active_attrs: Vec<String>,

    /// Scope of each active attribute's limit
    attr_scopes: BTreeMap<String, CapScope>,

    /// Priority order over attributes for the split-cap fallback
    importance_order: Vec<String>,

    /// Metric driving the added-slot fallback
    added_slot_attribute: AddedSlotAttribute,
}

impl Board {
    /// Build the board for one iteration.
    ///
    /// Days span `[start − warmup, end + window]` inclusive. Each day gets
    /// one slot per configured opening of each lab open that weekday,
    /// staffed by the weekday's attendings who work in that lab.
    pub fn new(config: &SimulationConfig, roster: Roster) -> Result<Self, ConfigError> {
        if config.end_date < config.start_date {
            return Err(ConfigError::EmptyHorizon {
                start: config.start_date,
                end: config.end_date,
            });
        }

        let warmup_days = config.arrivals.warmup_weeks * 7;
        let lead_days = config.arrivals.lead_weeks * 7;
        let window_days = config.arrivals.window_weeks * 7;

        let board_start_date = config.start_date - Duration::days(warmup_days as i64);
        let board_end_date = config.end_date + Duration::days(window_days as i64);
        let n_days = (board_end_date - board_start_date).num_days() as usize + 1;

        let mut days = Vec::with_capacity(n_days);
        for i in 0..n_days {
            let date = board_start_date + Duration::days(i as i64);
            let weekday = weekday_index(date.weekday());
            let policy = roster.weekday(weekday);

            let mut day = Day::new(date, weekday);
            for &lab_id in &policy.labs {
                if let Some(params) = roster.lab(lab_id).day_params(weekday) {
                    let staffing: Vec<AttendingId> = policy
                        .attendings
                        .iter()
                        .copied()
                        .filter(|a| params.attendings.contains(a))
                        .collect();
                    for _ in 0..params.slot_count {
                        day.push_slot(Slot::new(date, lab_id, staffing.clone()));
                    }
                }
            }
            days.push(day);
        }

        let active_attrs = config.points.active_attrs();
        let attr_scopes = config
            .points
            .attributes
            .iter()
            .filter(|a| a.active)
            .map(|a| (a.name.clone(), a.scope))
            .collect();

        Ok(Self {
            start_date: config.start_date,
            end_date: config.end_date,
            board_start_date,
            lead_days,
            window_days,
            roster,
            days,
            cases: Vec::new(),
            counts: ScheduleCounts::new(&active_attrs),
            weekday_placements: [0; 7],
            active_attrs,
            attr_scopes,
            importance_order: config.points.importance_order.clone(),
            added_slot_attribute: config.points.added_slot_attribute.clone(),
        })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn board_start_date(&self) -> NaiveDate {
        self.board_start_date
    }

    pub fn n_days(&self) -> usize {
        self.days.len()
    }

    pub fn day(&self, index: usize) -> &Day {
        &self.days[index]
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn lead_days(&self) -> usize {
        self.lead_days
    }

    pub fn window_days(&self) -> usize {
        self.window_days
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn case(&self, id: CaseId) -> &Case {
        &self.cases[id]
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn counts(&self) -> &ScheduleCounts {
        &self.counts
    }

    pub fn counts_mut(&mut self) -> &mut ScheduleCounts {
        &mut self.counts
    }

    /// Placements inside the reporting period, per weekday (Monday = 0).
    pub fn weekday_placements(&self) -> &[u64; 7] {
        &self.weekday_placements
    }

    pub fn active_attrs(&self) -> &[String] {
        &self.active_attrs
    }

    pub fn importance_order(&self) -> &[String] {
        &self.importance_order
    }

    pub fn added_slot_attribute(&self) -> &AddedSlotAttribute {
        &self.added_slot_attribute
    }

    /// Whether a date falls inside the reporting period.
    pub fn in_reporting_range(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Add an arriving case to the arena.
    pub fn admit_case(&mut self, case: Case) -> CaseId {
        self.cases.push(case);
        self.cases.len() - 1
    }

    /// Place a case into a slot, binding the attending if none was
    /// requested. The case's `scheduled` flag never reverts afterwards.
    pub fn place(&mut self, case_id: CaseId, day_index: usize, slot_index: usize, attending: AttendingId) {
        let (date, weekday, lab) = {
            let day = &self.days[day_index];
            let slot = &day.slots()[slot_index];
            (slot.date(), day.weekday(), slot.lab())
        };
        self.days[day_index].slot_mut(slot_index).set_occupant(case_id);

        let attending_name = self.roster.attending(attending).name().to_string();
        self.cases[case_id].assign(
            Assignment {
                date,
                weekday,
                lab,
                day_index,
                slot_index,
                attending,
            },
            &attending_name,
        );
        debug!(
            "scheduled case on {} {} in {} with {}",
            WEEKDAY_NAMES[weekday],
            date,
            self.roster.lab(lab).name(),
            attending_name
        );
    }

    /// Append an overflow slot to a lab on a day (added-slot fallback).
    ///
    /// Returns the new slot's index within the day.
    pub fn append_slot(&mut self, day_index: usize, lab: LabId, attending: AttendingId) -> usize {
        let date = self.days[day_index].date();
        self.days[day_index].push_slot(Slot::new(date, lab, vec![attending]));
        self.days[day_index].slots().len() - 1
    }

    /// Record an in-reporting-range placement in the weekday distribution.
    pub fn note_weekday_placement(&mut self, date: NaiveDate) {
        self.weekday_placements[weekday_index(date.weekday())] += 1;
    }

    /// Check-and-consume against a day's overall budget.
    ///
    /// Consumes budget on success; ignored cases pass without consuming.
    pub fn overall_cap_admit(&mut self, day_index: usize, case_id: CaseId) -> bool {
        let (points, ignored) = {
            let case = &self.cases[case_id];
            (case.total_points(), case.is_ignored())
        };
        let limit = self
            .roster
            .weekday(self.days[day_index].weekday())
            .limits
            .overall;
        self.days[day_index].admit_points(points, ignored, limit)
    }

    /// Remaining overall budget of a day.
    pub fn free_points(&self, day_index: usize) -> f64 {
        let day = &self.days[day_index];
        let limit = self.roster.weekday(day.weekday()).limits.overall;
        day.free_points(limit)
    }

    /// Whether one attribute's limit would still hold if the case were
    /// placed, in the attribute's configured scope (day or lab).
    ///
    /// The current total is recomputed by scanning the day's slots.
    pub fn attribute_cap_ok(&self, day_index: usize, lab: LabId, case_id: CaseId, attribute: &str) -> bool {
        let day = &self.days[day_index];
        let limit = match self
            .roster
            .weekday(day.weekday())
            .limits
            .attribute(attribute)
        {
            Some(limit) => limit,
            None => return true,
        };
        let scope = self
            .attr_scopes
            .get(attribute)
            .copied()
            .unwrap_or(CapScope::Day);

        let case_points = self.cases[case_id].attribute_point(attribute);
        let mut total = 0.0;
        for slot in day.slots() {
            if scope == CapScope::Lab && slot.lab() != lab {
                continue;
            }
            if let Some(occupant) = slot.occupant() {
                total += self.cases[occupant].attribute_point(attribute);
            }
        }
        total + case_points <= limit
    }

    /// Whether every active attribute's limit would hold for the case.
    ///
    /// Ignored cases always pass.
    pub fn split_caps_ok(&self, day_index: usize, lab: LabId, case_id: CaseId) -> bool {
        if self.cases[case_id].is_ignored() {
            return true;
        }
        self.active_attrs
            .iter()
            .all(|attr| self.attribute_cap_ok(day_index, lab, case_id, attr))
    }

    /// Re-sort same-day, same-lab placed cases by an attribute, alternating
    /// descending/ascending across successive labs within each day.
    ///
    /// Counters are untouched; with at most one placed case per lab this is
    /// a no-op, and applying it twice equals applying it once.
    pub fn reorder_within_days(&mut self, attribute: &str) {
        for d in 0..self.days.len() {
            let weekday = self.days[d].weekday();
            let lab_ids = self.roster.weekday(weekday).labs.clone();

            for (n, &lab) in lab_ids.iter().enumerate() {
                let mut slot_indices = Vec::new();
                let mut case_ids = Vec::new();
                for (i, slot) in self.days[d].slots().iter().enumerate() {
                    if slot.lab() == lab {
                        if let Some(occupant) = slot.occupant() {
                            slot_indices.push(i);
                            case_ids.push(occupant);
                        }
                    }
                }
                if case_ids.len() <= 1 {
                    continue;
                }

                let descending = n % 2 == 0;
                case_ids.sort_by(|&a, &b| {
                    let ka = self.cases[a].reorder_key(attribute);
                    let kb = self.cases[b].reorder_key(attribute);
                    let ord = match (ka, kb) {
                        (Some(x), Some(y)) => x.sort_cmp(&y),
                        (None, None) => std::cmp::Ordering::Equal,
                        (None, Some(_)) => std::cmp::Ordering::Less,
                        (Some(_), None) => std::cmp::Ordering::Greater,
                    };
                    if descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                });

                for (&slot_index, &case_id) in slot_indices.iter().zip(case_ids.iter()) {
                    self.days[d].slot_mut(slot_index).set_occupant(case_id);
                    self.cases[case_id].reassign_slot(slot_index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_initialization() {
        let counts = ScheduleCounts::new(&["risk".to_string(), "duration".to_string()]);
        assert_eq!(counts.get(UNSCHEDULED_CASES), 0);
        assert_eq!(counts.get(&forced_over_counter("risk")), 0);
        assert_eq!(counts.get(FORCED_OVER_ALL_CASES), 0);
    }

    #[test]
    fn test_single_attr_has_no_over_all_counter() {
        let mut counts = ScheduleCounts::new(&["risk".to_string()]);
        assert_eq!(
            counts.add(FORCED_OVER_ALL_CASES, 1).unwrap_err(),
            ConfigError::UnknownCounter(FORCED_OVER_ALL_CASES.to_string())
        );
    }

    #[test]
    fn test_unknown_counter_is_fatal() {
        let mut counts = ScheduleCounts::new(&[]);
        assert!(counts.add("nonsense_counter", 1).is_err());
        assert!(counts.add(UNSCHEDULED_CASES, 2).is_ok());
        assert_eq!(counts.get(UNSCHEDULED_CASES), 2);
    }
}
