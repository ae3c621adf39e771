//! Per-trial seed derivation
//!
//! Seeds come from an xxHash64-style mix of the `(terminal_count,
//! trial_index)` pair, reduced modulo 2³². The mapping is fixed: the same pair
//! yields the same seed on every platform and every run.

use rand::rngs::StdRng;
use rand::SeedableRng;

const PRIME_1: u64 = 11_400_714_785_074_694_791;
const PRIME_2: u64 = 14_029_467_366_897_019_727;
const PRIME_5: u64 = 2_870_177_450_012_600_261;

/// Length salt mixed in after the lanes
const LENGTH_SALT: u64 = 3_527_539;

/// Returned instead of an all-ones digest
const ALL_ONES_SUBSTITUTE: u64 = 1_546_275_796;

/// 64-bit digest of an integer pair
pub fn pair_digest(a: u64, b: u64) -> u64 {
    let mut acc = PRIME_5;
    for lane in [a, b] {
        acc = acc.wrapping_add(lane.wrapping_mul(PRIME_2));
        acc = acc.rotate_left(31);
        acc = acc.wrapping_mul(PRIME_1);
    }
    acc = acc.wrapping_add(2 ^ (PRIME_5 ^ LENGTH_SALT));

    if acc == u64::MAX {
        ALL_ONES_SUBSTITUTE
    } else {
        acc
    }
}

/// Seed for trial `trial_index` at `terminal_count` terminals
pub fn trial_seed(terminal_count: usize, trial_index: u32) -> u32 {
    // Digest is read as signed and reduced with a non-negative remainder
    let signed = pair_digest(terminal_count as u64, trial_index as u64) as i64;
    signed.rem_euclid(1 << 32) as u32
}

/// Trial-scoped generator; no global RNG state is involved
pub fn trial_rng(terminal_count: usize, trial_index: u32) -> StdRng {
    StdRng::seed_from_u64(trial_seed(terminal_count, trial_index) as u64)
}
