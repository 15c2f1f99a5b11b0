//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, deterministic random number generation.
//! CRITICAL: All randomness in the scheduler MUST go through this module.
//!
//! Each Monte Carlo iteration carries two independent generators, one for
//! shuffling (case order, day order, slot order) and one for arrival-count
//! draws. Both are derived deterministically from the run seed and the
//! iteration index via [`derive_seed`], so a `(run seed, iteration)` pair
//! always replays the exact same schedule.

mod seed;
mod xorshift;

pub use seed::derive_seed;
pub use xorshift::RngManager;
