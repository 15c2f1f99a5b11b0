//! Placement strategies
//!
//! Three interchangeable policies place an arrival batch onto the board.
//! All share the same eligibility matching and randomized window scan; they
//! differ in the capacity rules applied at the moment of placement and in
//! the fallback taken when no compliant slot exists:
//!
//! - [`StrategyKind::RandomFit`]: no capacity rules; first empty eligible
//!   slot wins, with an added-slot fallback.
//! - [`StrategyKind::AggregateCapFit`]: one overall point budget per day;
//!   over-budget candidates become backups, forced onto the day with the
//!   most free points when nothing fits.
//! - [`StrategyKind::SplitCapFit`]: independent per-attribute budgets plus
//!   the overall one; backups are bucketed by which priority attribute
//!   still holds, and forcing walks the buckets in priority order.
//!
//! Placement outcomes (unscheduled, added-slot, forced) are business
//! results recorded on the board's counters, never errors. The only error
//! path out of a strategy is incrementing a counter the configuration
//! never initialized.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::models::{AttendingId, Board, Case, CaseId, LabId};
use crate::rng::RngManager;

mod aggregate_cap;
mod random_fit;
mod split_cap;

/// Selector for the placement strategy of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    RandomFit,
    AggregateCapFit,
    SplitCapFit,
}

/// Place one arrival batch onto the board with the chosen strategy.
///
/// Cases are attempted strictly in batch order; each placement mutates
/// capacity state seen by every later case. The shuffle generator drives
/// all day and slot ordering decisions.
///
/// # Errors
/// [`ConfigError::UnknownCounter`] when an outcome counter required by the
/// strategy was not initialized from the active point attributes.
pub fn place(
    kind: StrategyKind,
    board: &mut Board,
    batch: &[CaseId],
    rng: &mut RngManager,
) -> Result<(), ConfigError> {
    match kind {
        StrategyKind::RandomFit => random_fit::place(board, batch, rng),
        StrategyKind::AggregateCapFit => aggregate_cap::place(board, batch, rng),
        StrategyKind::SplitCapFit => split_cap::place(board, batch, rng),
    }
}

/// First board-day index of a case's placement window.
fn window_start(board: &Board, case_id: CaseId) -> usize {
    board.case(case_id).arrival_day() + board.lead_days()
}

/// Shuffled day offsets covering the placement window.
fn shuffled_offsets(window: usize, rng: &mut RngManager) -> Vec<usize> {
    let mut offsets: Vec<usize> = (0..window).collect();
    rng.shuffle(&mut offsets);
    offsets
}

/// Shuffled slot indices of one day.
fn shuffled_slots(board: &Board, day_index: usize, rng: &mut RngManager) -> Vec<usize> {
    let mut order: Vec<usize> = (0..board.day(day_index).slots().len()).collect();
    rng.shuffle(&mut order);
    order
}

/// First attending of a slot eligible to take the case, if any.
///
/// With a requested attending, only a name match counts; otherwise the
/// attending must be qualified for the case's procedure and the slot's lab
/// must accept that procedure on this weekday.
fn eligible_attending(
    board: &Board,
    day_index: usize,
    slot_index: usize,
    case_id: CaseId,
) -> Option<AttendingId> {
    let day = board.day(day_index);
    let slot = &day.slots()[slot_index];
    let case = board.case(case_id);

    match case.attending() {
        Some(requested) => slot
            .attendings()
            .iter()
            .copied()
            .find(|&a| board.roster().attending(a).name() == requested),
        None => {
            if !board
                .roster()
                .lab(slot.lab())
                .allows_procedure(day.weekday(), case.procedure())
            {
                return None;
            }
            slot.attendings()
                .iter()
                .copied()
                .find(|&a| board.roster().attending(a).can_perform(case.procedure()))
        }
    }
}

/// Record a completed placement's date in the reporting statistics.
fn note_if_in_range(board: &mut Board, day_index: usize) {
    let date = board.day(day_index).date();
    if board.in_reporting_range(date) {
        board.note_weekday_placement(date);
    }
}

/// Find the best day and lab on which to append an overflow slot.
///
/// Scans every window day in ascending order; per day, collects labs with
/// at least one eligible slot (first-seen order, first matching attending
/// kept) and sums the metric over their occupants. Picks the lab with the
/// strictly lowest total per day, then the day with the strictly lowest
/// total overall, so the earliest day wins ties.
fn best_added_slot<F>(
    board: &Board,
    case_id: CaseId,
    start: usize,
    window: usize,
    metric: F,
) -> Option<(usize, LabId, AttendingId)>
where
    F: Fn(&Case) -> f64,
{
    let mut best: Option<(f64, usize, LabId, AttendingId)> = None;

    for n in 0..window {
        let day_index = start + n;
        if day_index >= board.n_days() {
            continue;
        }

        let mut labs: Vec<(LabId, AttendingId, f64)> = Vec::new();
        for (s, slot) in board.day(day_index).slots().iter().enumerate() {
            if let Some(attending) = eligible_attending(board, day_index, s, case_id) {
                let points = slot
                    .occupant()
                    .map(|c| metric(board.case(c)))
                    .unwrap_or(0.0);
                match labs.iter_mut().find(|(lab, _, _)| *lab == slot.lab()) {
                    Some(entry) => entry.2 += points,
                    None => labs.push((slot.lab(), attending, points)),
                }
            }
        }

        let mut day_best: Option<(LabId, AttendingId, f64)> = None;
        for &(lab, attending, points) in &labs {
            let better = match day_best {
                None => true,
                Some((_, _, best_points)) => points < best_points,
            };
            if better {
                day_best = Some((lab, attending, points));
            }
        }

        if let Some((lab, attending, points)) = day_best {
            let better = match best {
                None => true,
                Some((best_points, _, _, _)) => points < best_points,
            };
            if better {
                best = Some((points, day_index, lab, attending));
            }
        }
    }

    best.map(|(_, day_index, lab, attending)| (day_index, lab, attending))
}
