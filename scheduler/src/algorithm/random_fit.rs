//! Unconstrained random-fit placement
//!
//! Places each case into the first empty eligible slot found in a
//! randomized scan of its window. A second randomized pass considers
//! occupied slots too: an occupied slot whose lab and attending would have
//! matched earns the lab an appended overflow slot. Only when no eligible
//! lab/attending pairing exists anywhere in the window is the case left
//! unscheduled.

use crate::config::ConfigError;
use crate::models::{Board, CaseId, ADDED_SLOT_CASES, UNSCHEDULED_CASES};
use crate::rng::RngManager;

use super::{eligible_attending, note_if_in_range, shuffled_offsets, shuffled_slots, window_start};

pub(super) fn place(
    board: &mut Board,
    batch: &[CaseId],
    rng: &mut RngManager,
) -> Result<(), ConfigError> {
    let window = board.window_days();

    for &case_id in batch {
        let start = window_start(board, case_id);
        let mut offsets = shuffled_offsets(window, rng);

        // First pass: empty eligible slots only.
        'first: for &j in &offsets {
            let day_index = start + j;
            if day_index >= board.n_days() {
                continue;
            }
            for s in shuffled_slots(board, day_index, rng) {
                if !board.day(day_index).slots()[s].is_empty() {
                    continue;
                }
                if let Some(attending) = eligible_attending(board, day_index, s, case_id) {
                    board.place(case_id, day_index, s, attending);
                    note_if_in_range(board, day_index);
                    break 'first;
                }
            }
        }

        if board.case(case_id).is_scheduled() {
            continue;
        }

        // Second pass: any slot whose lab/attending would have matched
        // earns the lab an appended overflow slot on that day.
        rng.shuffle(&mut offsets);
        'second: for &j in &offsets {
            let day_index = start + j;
            if day_index >= board.n_days() {
                continue;
            }
            for s in shuffled_slots(board, day_index, rng) {
                if let Some(attending) = eligible_attending(board, day_index, s, case_id) {
                    let lab = board.day(day_index).slots()[s].lab();
                    let slot_index = board.append_slot(day_index, lab, attending);
                    board.place(case_id, day_index, slot_index, attending);

                    let date = board.day(day_index).date();
                    if board.in_reporting_range(date) {
                        board.counts_mut().add(ADDED_SLOT_CASES, 1)?;
                        board.note_weekday_placement(date);
                    }
                    break 'second;
                }
            }
        }

        if !board.case(case_id).is_scheduled() {
            board.counts_mut().add(UNSCHEDULED_CASES, 1)?;
        }
    }
    Ok(())
}
