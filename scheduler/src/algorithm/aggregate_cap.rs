//! Aggregate-point-capped placement
//!
//! Like random-fit, but a slot is only accepted if the case's total points
//! still fit the day's overall budget. Over-budget candidates are kept as
//! backups, one per day. When the scan exhausts the window: with no
//! backups, an overflow slot is appended on the lab with the lowest
//! occupant point total; with backups, the case is forced onto the backup
//! day with the most free points, exceeding the limit.

use std::collections::BTreeMap;

use crate::config::ConfigError;
use crate::models::{
    AttendingId, Board, CaseId, ADDED_SLOT_CASES, TOTAL_FORCED_CASES, UNSCHEDULED_CASES,
};
use crate::rng::RngManager;

use super::{
    best_added_slot, eligible_attending, note_if_in_range, shuffled_offsets, shuffled_slots,
    window_start,
};

pub(super) fn place(
    board: &mut Board,
    batch: &[CaseId],
    rng: &mut RngManager,
) -> Result<(), ConfigError> {
    let window = board.window_days();

    for &case_id in batch {
        let start = window_start(board, case_id);
        let offsets = shuffled_offsets(window, rng);

        // Over-budget but eligible candidates, one per day; later
        // candidates on the same day overwrite earlier ones.
        let mut backups: BTreeMap<usize, (usize, AttendingId)> = BTreeMap::new();

        'scan: for &j in &offsets {
            let day_index = start + j;
            if day_index >= board.n_days() {
                continue;
            }
            for s in shuffled_slots(board, day_index, rng) {
                if !board.day(day_index).slots()[s].is_empty() {
                    continue;
                }
                if let Some(attending) = eligible_attending(board, day_index, s, case_id) {
                    if board.overall_cap_admit(day_index, case_id) {
                        board.place(case_id, day_index, s, attending);
                        note_if_in_range(board, day_index);
                        break 'scan;
                    }
                    backups.insert(day_index, (s, attending));
                }
            }
        }

        if board.case(case_id).is_scheduled() {
            continue;
        }

        if backups.is_empty() {
            // Nothing empty and eligible anywhere: append a slot on the
            // lab carrying the fewest total points.
            match best_added_slot(board, case_id, start, window, |c| c.total_points()) {
                Some((day_index, lab, attending)) => {
                    let slot_index = board.append_slot(day_index, lab, attending);
                    board.place(case_id, day_index, slot_index, attending);

                    let date = board.day(day_index).date();
                    if board.in_reporting_range(date) {
                        board.counts_mut().add(ADDED_SLOT_CASES, 1)?;
                        board.note_weekday_placement(date);
                    }
                }
                None => {
                    board.counts_mut().add(UNSCHEDULED_CASES, 1)?;
                }
            }
        } else {
            // Force onto the backup day with the most free points;
            // earliest day wins ties. Forced placements consume no budget.
            let mut days = backups.keys().copied();
            let mut best_day = match days.next() {
                Some(day) => day,
                None => continue,
            };
            let mut best_free = board.free_points(best_day);
            for day in days {
                let free = board.free_points(day);
                if free > best_free {
                    best_day = day;
                    best_free = free;
                }
            }

            if let Some(&(slot_index, attending)) = backups.get(&best_day) {
                board.place(case_id, best_day, slot_index, attending);

                let date = board.day(best_day).date();
                if board.in_reporting_range(date) {
                    board.counts_mut().add(TOTAL_FORCED_CASES, 1)?;
                    board.note_weekday_placement(date);
                }
            }
        }
    }
    Ok(())
}
