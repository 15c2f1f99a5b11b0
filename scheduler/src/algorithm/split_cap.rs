//! Per-attribute split-capped placement
//!
//! Every active point attribute carries its own budget, scoped to the day
//! or to the lab, on top of the overall rules. A slot is accepted only if
//! all attribute budgets would hold. Rejected candidates are bucketed by
//! the first priority attribute whose budget alone still holds; candidates
//! violating every priority attribute land in a catch-all bucket. Forcing
//! walks the priority buckets in order and stops at the first non-empty
//! one; lower-priority buckets are never revisited before the catch-all.

use std::collections::BTreeMap;

use crate::config::{AddedSlotAttribute, ConfigError};
use crate::models::{
    forced_over_counter, AttendingId, Board, Case, CaseId, ADDED_SLOT_CASES,
    FORCED_OVER_ALL_CASES, TOTAL_FORCED_CASES, UNSCHEDULED_CASES,
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
    let importance_order = board.importance_order().to_vec();
    let active_attrs = board.active_attrs().to_vec();
    let added_slot_attribute = board.added_slot_attribute().clone();

    for &case_id in batch {
        let start = window_start(board, case_id);
        let offsets = shuffled_offsets(window, rng);

        // One backup bucket per priority attribute plus a catch-all for
        // candidates violating every priority attribute; each keeps one
        // candidate per day, later ones overwriting earlier ones.
        let mut buckets: Vec<BTreeMap<usize, (usize, AttendingId)>> =
            vec![BTreeMap::new(); importance_order.len()];
        let mut catch_all: BTreeMap<usize, (usize, AttendingId)> = BTreeMap::new();

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
                    let lab = board.day(day_index).slots()[s].lab();
                    if board.split_caps_ok(day_index, lab, case_id) {
                        board.place(case_id, day_index, s, attending);
                        note_if_in_range(board, day_index);
                        break 'scan;
                    }
                    let bucket = importance_order
                        .iter()
                        .position(|attr| board.attribute_cap_ok(day_index, lab, case_id, attr));
                    match bucket {
                        Some(rank) => {
                            buckets[rank].insert(day_index, (s, attending));
                        }
                        None => {
                            catch_all.insert(day_index, (s, attending));
                        }
                    }
                }
            }
        }

        if board.case(case_id).is_scheduled() {
            continue;
        }

        let total_backups =
            catch_all.len() + buckets.iter().map(BTreeMap::len).sum::<usize>();

        if total_backups == 0 {
            // Nothing empty and eligible anywhere: append a slot on the
            // lab carrying the least of the designated metric.
            let metric: Box<dyn Fn(&Case) -> f64> = match &added_slot_attribute {
                AddedSlotAttribute::Overall => Box::new(|c: &Case| c.total_points()),
                AddedSlotAttribute::Attribute(name) => {
                    let name = name.clone();
                    Box::new(move |c: &Case| c.attribute_point(&name))
                }
            };
            match best_added_slot(board, case_id, start, window, metric) {
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
            continue;
        }

        // Force from the first non-empty priority bucket, earliest day
        // first, recording every attribute budget the placement breaks.
        let mut forced = false;
        for bucket in &buckets {
            if let Some((&day_index, &(slot_index, attending))) = bucket.iter().next() {
                let lab = board.day(day_index).slots()[slot_index].lab();
                let violated: Vec<String> = active_attrs
                    .iter()
                    .filter(|attr| !board.attribute_cap_ok(day_index, lab, case_id, attr))
                    .cloned()
                    .collect();

                board.place(case_id, day_index, slot_index, attending);

                let date = board.day(day_index).date();
                if board.in_reporting_range(date) {
                    board.note_weekday_placement(date);
                    for attr in &violated {
                        board.counts_mut().add(&forced_over_counter(attr), 1)?;
                    }
                    board.counts_mut().add(TOTAL_FORCED_CASES, 1)?;
                }
                forced = true;
                break;
            }
        }

        if !forced {
            if let Some((&day_index, &(slot_index, attending))) = catch_all.iter().next() {
                board.place(case_id, day_index, slot_index, attending);

                let date = board.day(day_index).date();
                if board.in_reporting_range(date) {
                    board.note_weekday_placement(date);
                    board.counts_mut().add(FORCED_OVER_ALL_CASES, 1)?;
                    board.counts_mut().add(TOTAL_FORCED_CASES, 1)?;
                }
            }
        }
    }
    Ok(())
}
