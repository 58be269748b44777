//! Ember Reward Management (Odra)
//!
//! This crate implements an incentive-token economy on Casper using the Odra framework.
//! - EMBER: transferable reward token
//! - esEMBER: escrowed reward token, deployed in private transfer mode
//! - RewardTracker: staking ledger with time-based loyalty boost
//! - RewardDistributor: streams reward tokens into the tracker over time
//! - Vester: converts escrowed tokens into reward tokens linearly, backed by staked collateral

#![cfg_attr(target_arch = "wasm32", no_std)]

extern crate alloc;

pub mod external;
pub mod math;
pub mod reward_distributor;
pub mod reward_tracker;
pub mod tokens;
pub mod vester;
