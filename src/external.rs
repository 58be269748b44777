//! External contract interfaces
//!
//! Interfaces for contracts this crate calls but does not define: the
//! minimal CEP-18 surface used when sweeping arbitrary tokens a contract
//! ended up holding, and the hook surface a side reward pool must expose to
//! be registered with the RewardTracker.

use odra::casper_types::U256;
use odra::prelude::*;

/// Minimal CEP-18 surface for sweeping foreign token balances.
#[odra::external_contract]
pub trait ForeignToken {
    /// Balance held by an address.
    fn balance_of(&self, owner: Address) -> U256;

    /// Transfer tokens from the calling contract to a recipient.
    fn transfer(&mut self, recipient: Address, amount: U256);
}

/// Hooks the RewardTracker forwards to registered extra-reward pools so a
/// side pool can mirror stake weights and pay its own token on claim.
#[odra::external_contract]
pub trait ExtraRewardPool {
    /// Called after an account's staked principal increases.
    fn stake(&mut self, account: Address, amount: U256);

    /// Called after an account's staked principal decreases.
    fn withdraw(&mut self, account: Address, amount: U256);

    /// Called when an account claims from the tracker.
    fn get_reward(&mut self, account: Address);
}
