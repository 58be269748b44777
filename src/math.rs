//! Shared fixed-point arithmetic
//!
//! All reward, boost and vesting math is integer-only. Any computation that
//! favors a user rounds down, so the four components cannot drift against
//! each other or against the supply they draw from.

use odra::casper_types::U256;

/// Scale of the cumulative reward-per-token accumulator.
pub const PRECISION: u128 = 1_000_000_000_000_000_000_000_000_000_000;

/// Basis points divisor. 10000 bps = 1x.
pub const BPS_DIVISOR: u64 = 10_000;

/// Milliseconds per day. Block time on Casper is in milliseconds.
pub const MS_PER_DAY: u64 = 86_400_000;

/// `a * b / d`, rounding down. Callers must rule out `d == 0`.
pub fn mul_div_down(a: U256, b: U256, d: U256) -> U256 {
    a * b / d
}

/// Apply a basis-points factor to an amount, rounding down.
pub fn apply_bps(amount: U256, bps: u64) -> U256 {
    amount * U256::from(bps) / U256::from(BPS_DIVISOR)
}
