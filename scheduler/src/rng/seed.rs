//! Seed derivation for independent random streams
//!
//! Every iteration needs generators that are (a) reproducible from the run
//! seed and the iteration index alone and (b) statistically independent of
//! each other. Hashing `(run_seed, iteration, stream name)` with SHA-256
//! gives both without any process-wide generator state.

use sha2::{Digest, Sha256};

/// Derive a 64-bit seed for a named random stream of one iteration.
///
/// # Arguments
/// * `run_seed` - Top-level seed for the whole run
/// * `iteration` - Zero-based iteration index
/// * `stream` - Stream label, e.g. `"shuffle"` or `"arrivals"`
///
/// # Example
/// ```
/// use case_scheduler_core_rs::rng::derive_seed;
///
/// let a = derive_seed(42, 0, "shuffle");
/// let b = derive_seed(42, 0, "arrivals");
/// assert_ne!(a, b);
/// assert_eq!(a, derive_seed(42, 0, "shuffle"));
/// ```
pub fn derive_seed(run_seed: u64, iteration: u64, stream: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(run_seed.to_le_bytes());
    hasher.update(iteration.to_le_bytes());
    hasher.update(stream.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
