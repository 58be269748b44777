//! Linear vesting of escrowed tokens into reward tokens
//!
//! An account deposits esEMBER and converts it into EMBER linearly over a
//! fixed duration. Open conversion is capped by the account's staked
//! principal in the RewardTracker times a collateral ratio. On claim the
//! vester pays EMBER from its own funded balance and burns the matching
//! esEMBER it holds, so the escrow supply shrinks by exactly the converted
//! amount. Withdrawing pays out whatever is claimable and returns the
//! unvested remainder.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::external::ForeignTokenContractRef;
use crate::math;
use crate::reward_tracker::RewardTrackerContractRef;
use crate::tokens::IncentiveTokenContractRef;

/// Events for the Vester contract
pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    #[odra::event]
    pub struct VestDeposited {
        pub account: Address,
        pub amount: U256,
        pub new_deposited: U256,
    }

    #[odra::event]
    pub struct VestClaimed {
        pub account: Address,
        pub amount: U256,
    }

    #[odra::event]
    pub struct VestWithdrawn {
        pub account: Address,
        pub claimed: U256,
        pub refunded: U256,
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

/// Errors for vesting operations
#[odra::odra_error]
pub enum VesterError {
    Unauthorized = 201,
    ZeroAmount = 202,
    ExceedsVestableCap = 203,
    NothingDeposited = 204,
}

/// Escrow-to-reward conversion engine backed by staked collateral.
#[odra::module(
    events = [
        events::VestDeposited,
        events::VestClaimed,
        events::VestWithdrawn,
        events::TokensWithdrawn,
        events::OwnershipTransferred
    ],
    errors = VesterError
)]
pub struct Vester {
    es_token: Var<Address>,
    reward_token: Var<Address>,
    reward_tracker: Var<Address>,
    vesting_duration: Var<u64>,    // ms
    collateral_ratio: Var<u64>,    // basis points, 10000 = 1x staked principal

    deposited: Mapping<Address, U256>,
    claimed: Mapping<Address, U256>,
    vesting_start: Mapping<Address, u64>,

    owner: Var<Address>,
}

#[odra::module]
impl Vester {
    /// Initialize the vester with a fixed duration and collateral ratio.
    pub fn init(
        &mut self,
        vesting_duration: u64,
        collateral_ratio: u64,
        es_token: Address,
        reward_tracker: Address,
        reward_token: Address,
    ) {
        self.vesting_duration.set(vesting_duration);
        self.collateral_ratio.set(collateral_ratio);
        self.es_token.set(es_token);
        self.reward_tracker.set(reward_tracker);
        self.reward_token.set(reward_token);
        self.owner.set(self.env().caller());
    }

    // ==========================================
    // User Functions
    // ==========================================

    /// Deposit escrow tokens for vesting. Requires a prior approval on the
    /// escrow token. The outstanding position (deposited minus claimed) may
    /// not exceed the staked-collateral cap. The first deposit of a position
    /// starts its schedule; a top-up joins the existing one.
    pub fn deposit(&mut self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(VesterError::ZeroAmount);
        }
        let caller = self.env().caller();
        let deposited = self.deposited.get(&caller).unwrap_or_default();
        let claimed = self.claimed.get(&caller).unwrap_or_default();
        if deposited + amount - claimed > self.max_vestable(caller) {
            self.env().revert(VesterError::ExceedsVestableCap);
        }

        let es_addr = self.es_token.get().expect("escrow token not set");
        let mut es = IncentiveTokenContractRef::new(self.env().clone(), es_addr);
        es.transfer_from(caller, self.env().self_address(), amount);

        if deposited.is_zero() {
            self.vesting_start.set(&caller, self.env().get_block_time());
        }
        let new_deposited = deposited + amount;
        self.deposited.set(&caller, new_deposited);
        self.env().emit_event(events::VestDeposited {
            account: caller,
            amount,
            new_deposited,
        });
    }

    /// Convert the currently vested, unclaimed portion: pays reward tokens
    /// and consumes the equivalent escrow. A fully claimed position closes.
    pub fn claim(&mut self) -> U256 {
        let caller = self.env().caller();
        let amount = self.claimable(caller);
        if !amount.is_zero() {
            self.pay_out(caller, amount);
            self.claimed
                .set(&caller, self.claimed.get(&caller).unwrap_or_default() + amount);
        }

        let deposited = self.deposited.get(&caller).unwrap_or_default();
        if !deposited.is_zero() && self.claimed.get(&caller).unwrap_or_default() == deposited {
            self.close_position(caller);
        }
        self.env().emit_event(events::VestClaimed {
            account: caller,
            amount,
        });
        amount
    }

    /// Cancel the position: pay out whatever is claimable, return the
    /// unvested escrow principal and clear the position.
    pub fn withdraw(&mut self) {
        let caller = self.env().caller();
        let deposited = self.deposited.get(&caller).unwrap_or_default();
        if deposited.is_zero() {
            self.env().revert(VesterError::NothingDeposited);
        }

        let payout = self.claimable(caller);
        if !payout.is_zero() {
            self.pay_out(caller, payout);
        }

        let refund = deposited - self.claimed.get(&caller).unwrap_or_default() - payout;
        if !refund.is_zero() {
            let es_addr = self.es_token.get().expect("escrow token not set");
            let mut es = IncentiveTokenContractRef::new(self.env().clone(), es_addr);
            es.transfer(caller, refund);
        }
        self.close_position(caller);
        self.env().emit_event(events::VestWithdrawn {
            account: caller,
            claimed: payout,
            refunded: refund,
        });
    }

    // ==========================================
    // View Functions
    // ==========================================

    /// Amount currently convertible: vested so far minus already claimed
    pub fn claimable(&self, account: Address) -> U256 {
        self.vested_of(account) - self.claimed.get(&account).unwrap_or_default()
    }

    /// Portion of the deposit vested so far (floor of the linear schedule)
    pub fn vested_of(&self, account: Address) -> U256 {
        let deposited = self.deposited.get(&account).unwrap_or_default();
        if deposited.is_zero() {
            return U256::zero();
        }
        let duration = self.vesting_duration.get_or_default();
        if duration == 0 {
            return deposited;
        }
        let start = self.vesting_start.get(&account).unwrap_or_default();
        let elapsed = self.env().get_block_time().saturating_sub(start).min(duration);
        math::mul_div_down(deposited, U256::from(elapsed), U256::from(duration))
    }

    /// Ceiling on an account's outstanding position: staked principal times
    /// the collateral ratio
    pub fn max_vestable(&self, account: Address) -> U256 {
        let tracker_addr = self.reward_tracker.get().expect("reward tracker not set");
        let tracker = RewardTrackerContractRef::new(self.env().clone(), tracker_addr);
        math::apply_bps(
            tracker.staked_amount(account),
            self.collateral_ratio.get_or_default(),
        )
    }

    /// Total escrow deposited by an account (including claimed portions)
    pub fn deposited_of(&self, account: Address) -> U256 {
        self.deposited.get(&account).unwrap_or_default()
    }

    /// Amount already converted by an account
    pub fn claimed_of(&self, account: Address) -> U256 {
        self.claimed.get(&account).unwrap_or_default()
    }

    /// Block time at which the account's schedule started (0 = no position)
    pub fn vesting_start_of(&self, account: Address) -> u64 {
        self.vesting_start.get(&account).unwrap_or_default()
    }

    /// Schedule length in milliseconds
    pub fn vesting_duration(&self) -> u64 {
        self.vesting_duration.get_or_default()
    }

    /// Collateral ratio in basis points
    pub fn collateral_ratio(&self) -> u64 {
        self.collateral_ratio.get_or_default()
    }

    /// Escrow token address
    pub fn es_token(&self) -> Option<Address> {
        self.es_token.get()
    }

    /// Reward token address
    pub fn reward_token(&self) -> Option<Address> {
        self.reward_token.get()
    }

    /// Tracker providing the collateral view
    pub fn reward_tracker(&self) -> Option<Address> {
        self.reward_tracker.get()
    }

    /// Current administrator
    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }

    // ==========================================
    // Admin Functions
    // ==========================================

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
    // Internal Functions
    // ==========================================

    fn require_owner(&self) {
        if self.owner.get() != Some(self.env().caller()) {
            self.env().revert(VesterError::Unauthorized);
        }
    }

    // Burn the escrow backing a conversion and pay the reward token.
    // The vester holds handler rights on the escrow ledger.
    fn pay_out(&mut self, account: Address, amount: U256) {
        let es_addr = self.es_token.get().expect("escrow token not set");
        let mut es = IncentiveTokenContractRef::new(self.env().clone(), es_addr);
        es.burn(self.env().self_address(), amount);

        let reward_addr = self.reward_token.get().expect("reward token not set");
        let mut reward = IncentiveTokenContractRef::new(self.env().clone(), reward_addr);
        reward.transfer(account, amount);
    }

    fn close_position(&mut self, account: Address) {
        self.deposited.set(&account, U256::zero());
        self.claimed.set(&account, U256::zero());
        self.vesting_start.set(&account, 0);
    }
}
