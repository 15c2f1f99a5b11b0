//! Arrival loop and Monte Carlo driver
//!
//! [`Scheduler`] is the thin binding of one arrival batch, the board, and
//! the chosen strategy. [`Simulation`] drives the full run: for each
//! iteration it builds a fresh board, replays the arrival process
//! day-by-day (weekends excluded), hands each batch to the scheduler the
//! moment it arrives, optionally reorders same-day placements afterwards,
//! and finally averages every outcome counter across iterations.
//!
//! Determinism: each iteration owns two generators, one for shuffles (the
//! pre-arrival queue shuffle and every day/slot shuffle inside the
//! strategies) and one for arrival-count draws, both derived from the run
//! seed and the iteration index. A given (run seed, iteration) pair
//! therefore reproduces byte-identical placements and counters, and
//! iterations are independent of each other.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::algorithm::{self, StrategyKind};
use crate::config::{ConfigError, LabConfig, SimulationConfig};
use crate::models::{
    is_weekend, weekday_index, Board, Case, CaseId, CaseRecord, Roster, WEEKDAY_NAMES,
};
use crate::rng::{derive_seed, RngManager};

/// Binds one arrival batch, the board, and the chosen strategy.
pub struct Scheduler<'a> {
    board: &'a mut Board,
    strategy: StrategyKind,
}

impl<'a> Scheduler<'a> {
    pub fn new(board: &'a mut Board, strategy: StrategyKind) -> Self {
        Self { board, strategy }
    }

    pub fn board(&self) -> &Board {
        self.board
    }

    /// Place the batch with the bound strategy.
    pub fn populate(&mut self, batch: &[CaseId], rng: &mut RngManager) -> Result<(), ConfigError> {
        algorithm::place(self.strategy, self.board, batch, rng)
    }
}

/// Result of one independent iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationOutcome {
    pub iteration: usize,

    /// The populated board, queryable for placements and counters
    pub board: Board,
}

/// Cross-iteration aggregation of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub iterations: usize,

    /// Arithmetic mean of every outcome counter across iterations
    pub mean_counts: BTreeMap<String, f64>,

    /// Mean in-range placements per weekday (Monday = 0)
    pub mean_weekday_placements: [f64; 7],
}

/// A full run: every iteration's board plus the aggregate summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub outcomes: Vec<IterationOutcome>,
    pub summary: RunSummary,
}

/// The Monte Carlo driver for one configuration and case list
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    roster: Roster,
    records: Vec<CaseRecord>,
}

impl Simulation {
    /// Validate the configuration and case records and build the shared
    /// roster. A malformed configuration or record aborts here, before any
    /// scheduling begins.
    pub fn new(
        config: SimulationConfig,
        labs: &[LabConfig],
        records: Vec<CaseRecord>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let roster = Roster::build(labs, &config.points)?;

        // Trial-construct every case so missing or non-numeric fields
        // surface up front rather than mid-iteration.
        for record in &records {
            let case = Case::new(record.clone(), &config.points, 0)?;
            if let Some(attribute) = &config.reorder_attribute {
                if case.reorder_key(attribute).is_none() {
                    return Err(ConfigError::UnknownReorderAttribute(attribute.clone()));
                }
            }
        }

        Ok(Self {
            config,
            roster,
            records,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Run every iteration and aggregate the outcome counters.
    pub fn run(&self) -> Result<RunResult, ConfigError> {
        let mut outcomes = Vec::with_capacity(self.config.iterations);
        for iteration in 0..self.config.iterations {
            let outcome = self.run_iteration(iteration)?;
            info!(
                "finished scheduling iteration {} of {}",
                iteration + 1,
                self.config.iterations
            );
            outcomes.push(outcome);
        }
        let summary = summarize(&outcomes);
        Ok(RunResult { outcomes, summary })
    }

    /// Run one independent, fully-seeded iteration.
    pub fn run_iteration(&self, iteration: usize) -> Result<IterationOutcome, ConfigError> {
        let seed = self.config.run_seed;
        let mut shuffle_rng = RngManager::new(derive_seed(seed, iteration as u64, "shuffle"));
        let mut arrival_rng = RngManager::new(derive_seed(seed, iteration as u64, "arrivals"));

        let mut board = Board::new(&self.config, self.roster.clone())?;

        let mut queue: Vec<usize> = (0..self.records.len()).collect();
        shuffle_rng.shuffle(&mut queue);

        // Arrivals stop where a case's full lead + window would overrun
        // the board horizon.
        let padding = (self.config.arrivals.lead_weeks + self.config.arrivals.window_weeks) * 7;
        let arrival_days = board.n_days().saturating_sub(padding);

        let mut next = 0;
        for day_number in 0..arrival_days {
            let date = board.board_start_date() + Duration::days(day_number as i64);
            let weekday = weekday_index(date.weekday());
            if is_weekend(weekday) {
                continue;
            }

            let count = self.config.arrivals.distribution.sample(&mut arrival_rng);
            let end = (next + count).min(queue.len());
            let mut batch = Vec::with_capacity(end - next);
            for &record_index in &queue[next..end] {
                let case = Case::new(
                    self.records[record_index].clone(),
                    &self.config.points,
                    day_number,
                )?;
                batch.push(board.admit_case(case));
            }
            next = end;
            debug!(
                "{} cases arrived on {} {}",
                batch.len(),
                WEEKDAY_NAMES[weekday],
                date
            );

            Scheduler::new(&mut board, self.config.algorithm)
                .populate(&batch, &mut shuffle_rng)?;
        }

        if let Some(attribute) = &self.config.reorder_attribute {
            debug!("rearranging cases within days by {attribute}");
            board.reorder_within_days(attribute);
        }

        Ok(IterationOutcome { iteration, board })
    }
}

/// Mean of every counter and the weekday distribution across iterations.
fn summarize(outcomes: &[IterationOutcome]) -> RunSummary {
    let mut summary = RunSummary {
        iterations: outcomes.len(),
        ..Default::default()
    };
    if outcomes.is_empty() {
        return summary;
    }
    let n = outcomes.len() as f64;

    for outcome in outcomes {
        for (name, value) in outcome.board.counts().iter() {
            *summary.mean_counts.entry(name.clone()).or_insert(0.0) += *value as f64;
        }
        for (w, count) in outcome.board.weekday_placements().iter().enumerate() {
            summary.mean_weekday_placements[w] += *count as f64;
        }
    }
    for value in summary.mean_counts.values_mut() {
        *value /= n;
    }
    for value in &mut summary.mean_weekday_placements {
        *value /= n;
    }
    summary
}
