//! Case Scheduler Core - Rust Engine
//!
//! Monte Carlo simulator for constrained-capacity case scheduling with
//! deterministic execution.
//!
//! # Architecture
//!
//! - **config**: Parsed run configuration (arrivals, point system, labs)
//! - **models**: Domain types (Lab, Attending, Slot, Day, Board, Case)
//! - **algorithm**: The three placement strategies
//! - **scheduler**: Arrival loop and Monte Carlo driver
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded, per-iteration generators)
//! 2. A case's `scheduled` flag never reverts once set
//! 3. Placement failures are counted outcomes, never errors

// Module declarations
pub mod algorithm;
pub mod config;
pub mod models;
pub mod rng;
pub mod scheduler;

// Re-exports for convenience
pub use algorithm::StrategyKind;
pub use config::{
    AddedSlotAttribute, ArrivalDistribution, ArrivalProcess, CapScope, ConfigError, IgnoreRule,
    LabConfig, LabDaySchedule, PointAttributeConfig, PointLevel, PointSystemConfig,
    SimulationConfig, WeekdayLimits,
};
pub use models::{
    Assignment, AttrValue, Attending, Board, Case, CaseId, CaseRecord, Day, Lab, Roster,
    ScheduleCounts, Slot,
};
pub use rng::{derive_seed, RngManager};
pub use scheduler::{IterationOutcome, RunResult, RunSummary, Scheduler, Simulation};
