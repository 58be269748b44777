//! Time-based reward emission
//!
//! Streams the reward token to the RewardTracker at a configurable rate per
//! millisecond of block time. The tracker pulls `distribute` at the top of
//! every mutating call; payout is capped to the distributor's funded balance
//! and the clock always advances, so an unfunded interval is dropped rather
//! than carried forward.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::external::ForeignTokenContractRef;
use crate::reward_tracker::RewardTrackerContractRef;
use crate::tokens::IncentiveTokenContractRef;

/// Events for the RewardDistributor contract
pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    #[odra::event]
    pub struct Distribute {
        pub amount: U256,
    }

    #[odra::event]
    pub struct TokensPerIntervalChange {
        pub amount: U256,
    }

    #[odra::event]
    pub struct TokensWithdrawn {
        pub token: Address,
        pub to: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct OwnershipTransferred {
        pub old_owner: Option<Address>,
        pub new_owner: Address,
    }
}

/// Errors for distribution operations
#[odra::odra_error]
pub enum DistributorError {
    Unauthorized = 101,
}

/// Emission engine paying the reward token into the tracker over time.
#[odra::module(
    events = [
        events::Distribute,
        events::TokensPerIntervalChange,
        events::TokensWithdrawn,
        events::OwnershipTransferred
    ],
    errors = DistributorError
)]
pub struct RewardDistributor {
    reward_token: Var<Address>,
    reward_tracker: Var<Address>,
    tokens_per_interval: Var<U256>,
    last_distribution_time: Var<u64>,
    owner: Var<Address>,
}

#[odra::module]
impl RewardDistributor {
    /// Initialize the distributor. The emission clock starts at deployment.
    pub fn init(&mut self, reward_token: Address, reward_tracker: Address, tokens_per_interval: U256) {
        self.reward_token.set(reward_token);
        self.reward_tracker.set(reward_tracker);
        self.tokens_per_interval.set(tokens_per_interval);
        self.last_distribution_time.set(self.env().get_block_time());
        self.owner.set(self.env().caller());
    }

    /// Emission accrued since the last distribution: rate x elapsed time
    pub fn pending_rewards(&self) -> U256 {
        let last = self.last_distribution_time.get_or_default();
        let now = self.env().get_block_time();
        if now <= last {
            return U256::zero();
        }
        self.tokens_per_interval.get_or_default() * U256::from(now - last)
    }

    /// Pay pending emission into the tracker, capped to the funded balance.
    /// Callable only by the tracker; the clock advances unconditionally.
    pub fn distribute(&mut self) -> U256 {
        let caller = self.env().caller();
        if Some(caller) != self.reward_tracker.get() {
            self.env().revert(DistributorError::Unauthorized);
        }
        self.distribute_pending()
    }

    /// Reset the emission clock without paying out (administrator only).
    /// Used after funding so the first distribution is not a retroactive
    /// spike covering the unfunded period.
    pub fn update_last_distribution_time(&mut self) {
        self.require_owner();
        self.last_distribution_time.set(self.env().get_block_time());
    }

    /// Change the emission rate (administrator only). The tracker is settled
    /// first so the elapsed interval is paid at the old rate.
    pub fn set_tokens_per_interval(&mut self, amount: U256) {
        self.require_owner();
        let tracker = self.reward_tracker.get().expect("reward tracker not set");
        RewardTrackerContractRef::new(self.env().clone(), tracker).update_rewards();
        self.tokens_per_interval.set(amount);
        self.env()
            .emit_event(events::TokensPerIntervalChange { amount });
    }

    /// Emergency sweep of any token to an arbitrary recipient
    /// (administrator only)
    pub fn withdraw_token(&mut self, token: Address, to: Address, amount: U256) {
        self.require_owner();
        let mut token_ref = ForeignTokenContractRef::new(self.env().clone(), token);
        token_ref.transfer(to, amount);
        self.env()
            .emit_event(events::TokensWithdrawn { token, to, amount });
    }

    /// Hand control to a new administrator (administrator only)
    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.require_owner();
        let old_owner = self.owner.get();
        self.owner.set(new_owner);
        self.env().emit_event(events::OwnershipTransferred {
            old_owner,
            new_owner,
        });
    }

    // ==========================================
    // View Functions
    // ==========================================

    /// Emission rate in tokens per millisecond of block time
    pub fn tokens_per_interval(&self) -> U256 {
        self.tokens_per_interval.get_or_default()
    }

    /// Block time of the last distribution (or clock reset)
    pub fn last_distribution_time(&self) -> u64 {
        self.last_distribution_time.get_or_default()
    }

    /// Reward token address
    pub fn reward_token(&self) -> Option<Address> {
        self.reward_token.get()
    }

    /// Tracker the emission is paid into
    pub fn reward_tracker(&self) -> Option<Address> {
        self.reward_tracker.get()
    }

    /// Current administrator
    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }

    // ==========================================
    // Internal Functions
    // ==========================================

    fn require_owner(&self) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(DistributorError::Unauthorized);
        }
    }

    fn distribute_pending(&mut self) -> U256 {
        let pending = self.pending_rewards();
        self.last_distribution_time.set(self.env().get_block_time());
        if pending.is_zero() {
            return U256::zero();
        }

        let token_addr = self.reward_token.get().expect("reward token not set");
        let tracker = self.reward_tracker.get().expect("reward tracker not set");
        let mut token = IncentiveTokenContractRef::new(self.env().clone(), token_addr);

        // A shortfall is dropped, not rolled forward.
        let amount = pending.min(token.balance_of(self.env().self_address()));
        if !amount.is_zero() {
            token.transfer(tracker, amount);
            self.env().emit_event(events::Distribute { amount });
        }
        amount
    }
}
