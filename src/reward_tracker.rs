//! Staking ledger with boosted reward accrual
//!
//! Stakers deposit the escrow token and accrue the reward token streamed in
//! by the RewardDistributor. Accrual runs through a cumulative
//! reward-per-token index held at `PRECISION` scale over boost-weighted
//! stake: an account's weight is its principal scaled by a loyalty
//! multiplier that grows with uninterrupted stake duration. Long stakers
//! take a larger share of the same emission; the emission itself is never
//! amplified. Emission arriving while nothing is staked is banked and folded
//! into the index on the first settle with stake present.

use alloc::vec::Vec;
use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::external::{ExtraRewardPoolContractRef, ForeignTokenContractRef};
use crate::math::{self, BPS_DIVISOR, MS_PER_DAY, PRECISION};
use crate::reward_distributor::RewardDistributorContractRef;
use crate::tokens::IncentiveTokenContractRef;

// Boost defaults: 2x reached after 90 days, streaks shorter than 7 days
// earn no boost.
const DEFAULT_MAX_BOOST: u64 = 2;
const DEFAULT_MAX_BOOST_TIME: u64 = 90 * MS_PER_DAY;
const DEFAULT_MIN_LOCK_TIME: u64 = 7 * MS_PER_DAY;

/// Events for the RewardTracker contract
pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    #[odra::event]
    pub struct Staked {
        pub account: Address,
        pub amount: U256,
        pub new_staked: U256,
    }

    #[odra::event]
    pub struct Unstaked {
        pub account: Address,
        pub amount: U256,
        pub new_staked: U256,
    }

    #[odra::event]
    pub struct RewardsClaimed {
        pub account: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct DistributorSet {
        pub distributor: Address,
    }

    #[odra::event]
    pub struct ExtraRewardAdded {
        pub pool: Address,
    }

    #[odra::event]
    pub struct BoostParametersUpdated {
        pub max_boost: u64,
        pub max_boost_time: u64,
        pub min_lock_time: u64,
    }

    #[odra::event]
    pub struct OwnershipTransferred {
        pub old_owner: Option<Address>,
        pub new_owner: Address,
    }

    #[odra::event]
    pub struct TokensRecovered {
        pub token: Address,
        pub to: Address,
        pub amount: U256,
    }
}

/// Errors for staking operations
#[odra::odra_error]
pub enum TrackerError {
    Unauthorized = 1,
    InsufficientStake = 2,
    ZeroAmount = 3,
}

/// Staking ledger accruing distributor emission with a loyalty boost.
#[odra::module(
    events = [
        events::Staked,
        events::Unstaked,
        events::RewardsClaimed,
        events::DistributorSet,
        events::ExtraRewardAdded,
        events::BoostParametersUpdated,
        events::OwnershipTransferred,
        events::TokensRecovered
    ],
    errors = TrackerError
)]
pub struct RewardTracker {
    // Token references
    stake_token: Var<Address>,
    reward_token: Var<Address>,
    distributor: Var<Address>,

    // Per-account state
    staked_amounts: Mapping<Address, U256>,
    boosted_amounts: Mapping<Address, U256>,
    stake_ts: Mapping<Address, u64>, // 0 = no active streak
    previous_cumulated: Mapping<Address, U256>,
    claimable_rewards: Mapping<Address, U256>,

    // Global accrual state
    total_staked: Var<U256>,
    total_boosted: Var<U256>,
    cumulative_reward_per_token: Var<U256>,
    undistributed_rewards: Var<U256>,

    // Boost parameters
    max_boost: Var<u64>,
    max_boost_time: Var<u64>,
    min_lock_time: Var<u64>,

    // Side pools notified on stake/withdraw/claim
    extra_rewards: Var<Vec<Address>>,

    // Admin
    owner: Var<Address>,
}

#[odra::module]
impl RewardTracker {
    /// Initialize the tracker for a stake token and a reward token.
    pub fn init(&mut self, stake_token: Address, reward_token: Address) {
        self.stake_token.set(stake_token);
        self.reward_token.set(reward_token);
        self.total_staked.set(U256::zero());
        self.total_boosted.set(U256::zero());
        self.cumulative_reward_per_token.set(U256::zero());
        self.undistributed_rewards.set(U256::zero());
        self.max_boost.set(DEFAULT_MAX_BOOST);
        self.max_boost_time.set(DEFAULT_MAX_BOOST_TIME);
        self.min_lock_time.set(DEFAULT_MIN_LOCK_TIME);
        self.extra_rewards.set(Vec::new());
        self.owner.set(self.env().caller());
    }

    // ==========================================
    // User Functions
    // ==========================================

    /// Stake tokens. Requires a prior approval on the stake token.
    /// A top-up keeps the existing boost streak; only a deposit from zero
    /// principal starts a new one.
    pub fn deposit(&mut self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(TrackerError::ZeroAmount);
        }
        let caller = self.env().caller();
        self.update_account(caller);

        let stake_addr = self.stake_token.get().expect("stake token not set");
        let mut stake = IncentiveTokenContractRef::new(self.env().clone(), stake_addr);
        stake.transfer_from(caller, self.env().self_address(), amount);

        let staked = self.staked_amounts.get(&caller).unwrap_or_default();
        if staked.is_zero() {
            self.stake_ts.set(&caller, self.env().get_block_time());
        }
        let new_staked = staked + amount;
        self.staked_amounts.set(&caller, new_staked);
        self.total_staked
            .set(self.total_staked.get_or_default() + amount);
        self.refresh_boosted(caller, new_staked);

        self.notify_stake(caller, amount);
        self.env().emit_event(events::Staked {
            account: caller,
            amount,
            new_staked,
        });
    }

    /// Unstake tokens. A withdrawal down to zero principal resets the boost
    /// streak.
    pub fn withdraw(&mut self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(TrackerError::ZeroAmount);
        }
        let caller = self.env().caller();
        self.update_account(caller);

        let staked = self.staked_amounts.get(&caller).unwrap_or_default();
        if amount > staked {
            self.env().revert(TrackerError::InsufficientStake);
        }
        let new_staked = staked - amount;
        self.staked_amounts.set(&caller, new_staked);
        self.total_staked
            .set(self.total_staked.get_or_default() - amount);
        if new_staked.is_zero() {
            self.stake_ts.set(&caller, 0);
        }
        self.refresh_boosted(caller, new_staked);

        let stake_addr = self.stake_token.get().expect("stake token not set");
        let mut stake = IncentiveTokenContractRef::new(self.env().clone(), stake_addr);
        stake.transfer(caller, amount);

        self.notify_withdraw(caller, amount);
        self.env().emit_event(events::Unstaked {
            account: caller,
            amount,
            new_staked,
        });
    }

    /// Pay out the caller's accrued reward tokens.
    pub fn claim(&mut self) -> U256 {
        let caller = self.env().caller();
        self.update_account(caller);

        let amount = self.claimable_rewards.get(&caller).unwrap_or_default();
        if !amount.is_zero() {
            self.claimable_rewards.set(&caller, U256::zero());
            let reward_addr = self.reward_token.get().expect("reward token not set");
            let mut reward = IncentiveTokenContractRef::new(self.env().clone(), reward_addr);
            reward.transfer(caller, amount);
        }

        self.notify_get_reward(caller);
        self.env().emit_event(events::RewardsClaimed {
            account: caller,
            amount,
        });
        amount
    }

    /// Settle global accrual state: pull distributor emission and fold it
    /// into the cumulative index. Permissionless; also poked by the
    /// distributor on rate changes.
    pub fn update_rewards(&mut self) {
        self.update_global();
    }

    // ==========================================
    // View Functions
    // ==========================================

    /// Staked principal of an account
    pub fn staked_amount(&self, account: Address) -> U256 {
        self.staked_amounts.get(&account).unwrap_or_default()
    }

    /// Sum of all staked principal
    pub fn total_staked(&self) -> U256 {
        self.total_staked.get_or_default()
    }

    /// Claimable reward of an account, including the distributor's pending
    /// emission capped to its funded balance (read-only mirror of settle)
    pub fn claimable(&self, account: Address) -> U256 {
        let mut pool = self.undistributed_rewards.get_or_default();
        if let Some(dist_addr) = self.distributor.get() {
            let dist = RewardDistributorContractRef::new(self.env().clone(), dist_addr);
            let reward_addr = self.reward_token.get().expect("reward token not set");
            let reward = IncentiveTokenContractRef::new(self.env().clone(), reward_addr);
            pool = pool + dist.pending_rewards().min(reward.balance_of(dist_addr));
        }

        let total_boosted = self.total_boosted.get_or_default();
        let mut cum = self.cumulative_reward_per_token.get_or_default();
        if !pool.is_zero() && !total_boosted.is_zero() {
            cum = cum + pool * U256::from(PRECISION) / total_boosted;
        }

        let mut amount = self.claimable_rewards.get(&account).unwrap_or_default();
        let boosted = self.boosted_amounts.get(&account).unwrap_or_default();
        let prev = self.previous_cumulated.get(&account).unwrap_or_default();
        if cum > prev && !boosted.is_zero() {
            amount = amount + math::mul_div_down(boosted, cum - prev, U256::from(PRECISION));
        }
        amount
    }

    /// Current boost multiplier of an account in basis points (10000 = 1x)
    pub fn boost_multiplier(&self, account: Address) -> u64 {
        let ts = self.stake_ts.get(&account).unwrap_or_default();
        if ts == 0 {
            return BPS_DIVISOR;
        }
        let duration = self.env().get_block_time().saturating_sub(ts);
        let min_lock = self.min_lock_time.get_or_default();
        if duration < min_lock {
            return BPS_DIVISOR;
        }
        let max_boost = self.max_boost.get_or_default();
        if max_boost <= 1 {
            return BPS_DIVISOR;
        }
        let span = self.max_boost_time.get_or_default().saturating_sub(min_lock);
        if span == 0 {
            return max_boost.saturating_mul(BPS_DIVISOR);
        }
        let progress = (duration - min_lock).min(span);
        let gain =
            (max_boost as u128 - 1) * BPS_DIVISOR as u128 * progress as u128 / span as u128;
        BPS_DIVISOR + gain as u64
    }

    /// Block time at which the account's current streak started (0 = none)
    pub fn stake_timestamp(&self, account: Address) -> u64 {
        self.stake_ts.get(&account).unwrap_or_default()
    }

    /// Reward distributor address
    pub fn distributor(&self) -> Option<Address> {
        self.distributor.get()
    }

    /// Maximum boost multiplier (plain factor, 2 = 2x)
    pub fn max_boost(&self) -> u64 {
        self.max_boost.get_or_default()
    }

    /// Stake duration at which the maximum boost is reached (ms)
    pub fn max_boost_time(&self) -> u64 {
        self.max_boost_time.get_or_default()
    }

    /// Stake duration below which no boost accrues (ms)
    pub fn min_lock_time(&self) -> u64 {
        self.min_lock_time.get_or_default()
    }

    /// Stake token address
    pub fn stake_token(&self) -> Option<Address> {
        self.stake_token.get()
    }

    /// Reward token address
    pub fn reward_token(&self) -> Option<Address> {
        self.reward_token.get()
    }

    /// Registered extra-reward pools
    pub fn extra_rewards(&self) -> Vec<Address> {
        self.extra_rewards.get_or_default()
    }

    /// Cumulative reward per boost-weighted staked token (PRECISION scale)
    pub fn cumulative_reward_per_token(&self) -> U256 {
        self.cumulative_reward_per_token.get_or_default()
    }

    /// Current administrator
    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }

    // ==========================================
    // Admin Functions
    // ==========================================

    /// Point the tracker at a reward distributor (administrator only).
    /// The previous distributor is settled first so no accrued emission is
    /// attributed to the new one.
    pub fn set_reward_distributor(&mut self, distributor: Address) {
        self.require_owner();
        self.update_global();
        self.distributor.set(distributor);
        self.env().emit_event(events::DistributorSet { distributor });
    }

    /// Register a side pool to be notified on stake, withdraw and claim
    /// (administrator only)
    pub fn add_extra_reward(&mut self, pool: Address) {
        self.require_owner();
        let mut pools = self.extra_rewards.get_or_default();
        pools.push(pool);
        self.extra_rewards.set(pools);
        self.env().emit_event(events::ExtraRewardAdded { pool });
    }

    /// Update the boost curve (administrator only). Existing weights adjust
    /// lazily as accounts settle.
    pub fn update_boost_parameters(&mut self, max_boost: u64, max_boost_time: u64, min_lock_time: u64) {
        self.require_owner();
        self.update_global();
        self.max_boost.set(max_boost);
        self.max_boost_time.set(max_boost_time);
        self.min_lock_time.set(min_lock_time);
        self.env().emit_event(events::BoostParametersUpdated {
            max_boost,
            max_boost_time,
            min_lock_time,
        });
    }

    /// Sweep token balances held by this contract to the administrator
    /// (administrator only)
    pub fn recover_token(&mut self, tokens: Vec<Address>) {
        self.require_owner();
        let to = self.env().caller();
        let self_address = self.env().self_address();
        for token in tokens {
            let mut token_ref = ForeignTokenContractRef::new(self.env().clone(), token);
            let amount = token_ref.balance_of(self_address);
            if !amount.is_zero() {
                token_ref.transfer(to, amount);
                self.env()
                    .emit_event(events::TokensRecovered { token, to, amount });
            }
        }
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
    // Internal Functions
    // ==========================================

    fn require_owner(&self) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(TrackerError::Unauthorized);
        }
    }

    // Pull new emission and fold it, plus anything banked, into the
    // cumulative index. With no boosted stake the pool stays banked.
    fn update_global(&mut self) -> U256 {
        let block_reward = match self.distributor.get() {
            Some(addr) => {
                RewardDistributorContractRef::new(self.env().clone(), addr).distribute()
            }
            None => U256::zero(),
        };
        let pool = self.undistributed_rewards.get_or_default() + block_reward;
        let total_boosted = self.total_boosted.get_or_default();
        let mut cum = self.cumulative_reward_per_token.get_or_default();
        if !pool.is_zero() {
            if total_boosted.is_zero() {
                self.undistributed_rewards.set(pool);
            } else {
                cum = cum + pool * U256::from(PRECISION) / total_boosted;
                self.cumulative_reward_per_token.set(cum);
                self.undistributed_rewards.set(U256::zero());
            }
        }
        cum
    }

    // Settle one account against the updated index and refresh its boost
    // weight to the current block time.
    fn update_account(&mut self, account: Address) {
        let cum = self.update_global();
        let boosted = self.boosted_amounts.get(&account).unwrap_or_default();
        let prev = self.previous_cumulated.get(&account).unwrap_or_default();
        if cum > prev && !boosted.is_zero() {
            let reward = math::mul_div_down(boosted, cum - prev, U256::from(PRECISION));
            if !reward.is_zero() {
                let claimable = self.claimable_rewards.get(&account).unwrap_or_default();
                self.claimable_rewards.set(&account, claimable + reward);
            }
        }
        self.previous_cumulated.set(&account, cum);
        let staked = self.staked_amounts.get(&account).unwrap_or_default();
        self.refresh_boosted(account, staked);
    }

    // Re-weight an account after its principal or multiplier changed.
    fn refresh_boosted(&mut self, account: Address, staked: U256) {
        let old = self.boosted_amounts.get(&account).unwrap_or_default();
        let new = math::apply_bps(staked, self.boost_multiplier(account));
        if new != old {
            self.boosted_amounts.set(&account, new);
            self.total_boosted
                .set(self.total_boosted.get_or_default() - old + new);
        }
    }

    fn notify_stake(&mut self, account: Address, amount: U256) {
        for pool in self.extra_rewards.get_or_default() {
            ExtraRewardPoolContractRef::new(self.env().clone(), pool).stake(account, amount);
        }
    }

    fn notify_withdraw(&mut self, account: Address, amount: U256) {
        for pool in self.extra_rewards.get_or_default() {
            ExtraRewardPoolContractRef::new(self.env().clone(), pool).withdraw(account, amount);
        }
    }

    fn notify_get_reward(&mut self, account: Address) {
        for pool in self.extra_rewards.get_or_default() {
            ExtraRewardPoolContractRef::new(self.env().clone(), pool).get_reward(account);
        }
    }
}
