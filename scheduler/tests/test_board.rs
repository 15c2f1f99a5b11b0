//! Board construction, capacity queries, and the reorder pass.

use case_scheduler_core_rs::models::Roster;
use case_scheduler_core_rs::{
    ArrivalDistribution, ArrivalProcess, Board, Case, CaseRecord, LabConfig, LabDaySchedule,
    PointSystemConfig, SimulationConfig, StrategyKind,
};
use chrono::{NaiveDate, Weekday};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monday_lab(name: &str, slots: usize) -> LabConfig {
    LabConfig {
        name: name.to_string(),
        days: vec![LabDaySchedule {
            weekday: Weekday::Mon,
            attendings: vec!["Dr. Adams".to_string()],
            procedures: vec!["A".to_string()],
            slots,
        }],
    }
}

fn sim_config(warmup_weeks: usize, window_weeks: usize) -> SimulationConfig {
    SimulationConfig {
        start_date: date(2026, 1, 5),
        end_date: date(2026, 1, 16),
        arrivals: ArrivalProcess {
            distribution: ArrivalDistribution::Uniform { min: 1, max: 1 },
            lead_weeks: 0,
            window_weeks,
            warmup_weeks,
        },
        algorithm: StrategyKind::RandomFit,
        points: PointSystemConfig::default(),
        reorder_attribute: None,
        iterations: 1,
        run_seed: 42,
    }
}

fn board(slots: usize) -> Board {
    let config = sim_config(1, 1);
    let labs = vec![monday_lab("Lab 1", slots)];
    let roster = Roster::build(&labs, &config.points).unwrap();
    Board::new(&config, roster).unwrap()
}

fn case(severity: f64) -> Case {
    let mut r = CaseRecord::new();
    r.insert("procedure", "A");
    r.insert("severity", severity);
    Case::new(r, &PointSystemConfig::default(), 0).unwrap()
}

#[test]
fn test_horizon_spans_warmup_and_window() {
    let b = board(2);
    // 2025-12-29 (start - 1 week) through 2026-01-23 (end + 1 week)
    assert_eq!(b.board_start_date(), date(2025, 12, 29));
    assert_eq!(b.n_days(), 26);
    assert_eq!(b.day(0).date(), date(2025, 12, 29));
    assert_eq!(b.day(25).date(), date(2026, 1, 23));
}

#[test]
fn test_only_open_weekdays_get_slots() {
    let b = board(2);
    // Mondays sit at offsets 0, 7, 14, 21 from the board start.
    for (i, day) in b.days().iter().enumerate() {
        let expected = if i % 7 == 0 { 2 } else { 0 };
        assert_eq!(day.slots().len(), expected, "day {i}");
    }
}

#[test]
fn test_reporting_range() {
    let b = board(2);
    assert!(!b.in_reporting_range(date(2025, 12, 29)));
    assert!(b.in_reporting_range(date(2026, 1, 5)));
    assert!(b.in_reporting_range(date(2026, 1, 16)));
    assert!(!b.in_reporting_range(date(2026, 1, 17)));
}

#[test]
fn test_place_binds_attending_and_is_monotonic() {
    let mut b = board(2);
    let id = b.admit_case(case(1.0));
    b.place(id, 0, 0, 0);

    let placed = b.case(id);
    assert!(placed.is_scheduled());
    assert_eq!(placed.attending(), Some("Dr. Adams"));
    let assignment = placed.assignment().unwrap();
    assert_eq!(assignment.date, date(2025, 12, 29));
    assert_eq!(assignment.slot_index, 0);
    assert_eq!(b.day(0).slots()[0].occupant(), Some(id));
}

#[test]
fn test_append_slot_extends_a_day() {
    let mut b = board(1);
    assert_eq!(b.day(0).slots().len(), 1);
    let slot_index = b.append_slot(0, 0, 0);
    assert_eq!(slot_index, 1);
    assert_eq!(b.day(0).slots().len(), 2);
    assert!(b.day(0).slots()[1].is_empty());
}

#[test]
fn test_reorder_sorts_first_lab_descending() {
    let mut b = board(3);
    for (slot, severity) in [(0, 1.0), (1, 3.0), (2, 2.0)] {
        let id = b.admit_case(case(severity));
        b.place(id, 0, slot, 0);
    }

    b.reorder_within_days("severity");

    let severities: Vec<f64> = b
        .day(0)
        .slots()
        .iter()
        .map(|s| {
            let id = s.occupant().unwrap();
            b.case(id).reorder_key("severity").unwrap().as_f64().unwrap()
        })
        .collect();
    assert_eq!(severities, vec![3.0, 2.0, 1.0]);

    // Case-side assignments track the move.
    for (i, slot) in b.day(0).slots().iter().enumerate() {
        let id = slot.occupant().unwrap();
        assert_eq!(b.case(id).assignment().unwrap().slot_index, i);
        assert!(b.case(id).is_scheduled());
    }
}

#[test]
fn test_reorder_alternates_direction_across_labs() {
    // First lab of the day sorts descending, second ascending.
    let config = sim_config(1, 1);
    let labs = vec![monday_lab("Lab 1", 2), monday_lab("Lab 2", 2)];
    let roster = Roster::build(&labs, &config.points).unwrap();
    let mut b = Board::new(&config, roster).unwrap();

    // Slots 0-1 belong to Lab 1, slots 2-3 to Lab 2.
    for (slot, severity) in [(0, 1.0), (1, 2.0), (2, 4.0), (3, 3.0)] {
        let id = b.admit_case(case(severity));
        b.place(id, 0, slot, 0);
    }

    b.reorder_within_days("severity");

    let severities: Vec<f64> = b
        .day(0)
        .slots()
        .iter()
        .map(|s| {
            let id = s.occupant().unwrap();
            b.case(id).reorder_key("severity").unwrap().as_f64().unwrap()
        })
        .collect();
    assert_eq!(severities, vec![2.0, 1.0, 3.0, 4.0]);

    // Occupants stay within their original lab.
    for (i, slot) in b.day(0).slots().iter().enumerate() {
        assert_eq!(slot.lab(), if i < 2 { 0 } else { 1 });
        let id = slot.occupant().unwrap();
        assert_eq!(b.case(id).assignment().unwrap().slot_index, i);
    }
}

#[test]
fn test_reorder_is_idempotent() {
    let mut once = board(3);
    for (slot, severity) in [(0, 2.0), (1, 1.0), (2, 3.0)] {
        let id = once.admit_case(case(severity));
        once.place(id, 0, slot, 0);
    }
    let mut twice = once.clone();

    once.reorder_within_days("severity");
    twice.reorder_within_days("severity");
    twice.reorder_within_days("severity");

    let occupants = |b: &Board| -> Vec<Option<usize>> {
        b.day(0).slots().iter().map(|s| s.occupant()).collect()
    };
    assert_eq!(occupants(&once), occupants(&twice));
}

#[test]
fn test_reorder_single_case_is_a_no_op() {
    let mut b = board(3);
    let id = b.admit_case(case(2.0));
    b.place(id, 0, 1, 0);

    b.reorder_within_days("severity");
    assert_eq!(b.day(0).slots()[1].occupant(), Some(id));
}
