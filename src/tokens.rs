//! Incentive token ledger: EMBER and esEMBER
//!
//! One CEP-18 module deployed twice:
//! - EMBER: transferable reward token
//! - esEMBER: escrowed variant, deployed in private transfer mode so that
//!   only movements touching a registered handler are possible
//!
//! Minting is quota-based: the administrator grants each minter a remaining
//! allowance and a mint is credited up to that allowance, never beyond it.
//! Handlers may burn from any account and bypass the transfer restriction.

use alloc::string::String;
use alloc::vec::Vec;
use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;
use odra_modules::cep18::events::{
    Burn, DecreaseAllowance, IncreaseAllowance, Mint, SetAllowance, Transfer, TransferFrom,
};
use odra_modules::cep18::storage::{
    Cep18AllowancesStorage, Cep18BalancesStorage, Cep18DecimalsStorage, Cep18NameStorage,
    Cep18SymbolStorage, Cep18TotalSupplyStorage,
};

use crate::external::ForeignTokenContractRef;

/// Token decimals, shared by both deployed instances.
const DECIMALS: u8 = 18;

/// Configuration events beyond the CEP-18 set
pub mod events {
    use odra::casper_types::U256;
    use odra::prelude::*;

    #[odra::event]
    pub struct MinterSet {
        pub account: Address,
        pub allowance: U256,
    }

    #[odra::event]
    pub struct HandlerSet {
        pub account: Address,
        pub active: bool,
    }

    #[odra::event]
    pub struct PrivateTransferModeSet {
        pub enabled: bool,
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

/// Errors for token operations (aligned with CEP-18 codes where applicable)
#[odra::odra_error]
pub enum TokenError {
    InsufficientBalance = 60001,
    InsufficientAllowance = 60002,
    CannotTargetSelfUser = 60003,
    Unauthorized = 60004,
}

/// Quota-minted CEP-18 token with handler roles and an optional
/// private transfer mode.
#[odra::module(
    events = [
        Mint,
        Burn,
        SetAllowance,
        IncreaseAllowance,
        DecreaseAllowance,
        Transfer,
        TransferFrom,
        events::MinterSet,
        events::HandlerSet,
        events::PrivateTransferModeSet,
        events::OwnershipTransferred,
        events::TokensRecovered
    ],
    errors = TokenError
)]
pub struct IncentiveToken {
    name: SubModule<Cep18NameStorage>,
    symbol: SubModule<Cep18SymbolStorage>,
    decimals: SubModule<Cep18DecimalsStorage>,
    total_supply: SubModule<Cep18TotalSupplyStorage>,
    balances: SubModule<Cep18BalancesStorage>,
    allowances: SubModule<Cep18AllowancesStorage>,
    owner: Var<Address>,
    minters: Mapping<Address, U256>,
    handlers: Mapping<Address, bool>,
    in_private_transfer_mode: Var<bool>,
}

#[odra::module]
impl IncentiveToken {
    /// Initialize the token. The deployer becomes the administrator.
    pub fn init(&mut self, name: String, symbol: String, in_private_transfer_mode: bool) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(DECIMALS);
        self.total_supply.set(U256::zero());
        self.balances.init();
        self.allowances.init();
        self.owner.set(self.env().caller());
        self.in_private_transfer_mode.set(in_private_transfer_mode);
    }

    /// Token name
    pub fn name(&self) -> String {
        self.name.get()
    }

    /// Token symbol
    pub fn symbol(&self) -> String {
        self.symbol.get()
    }

    /// Token decimals
    pub fn decimals(&self) -> u8 {
        self.decimals.get()
    }

    /// Total supply
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get()
    }

    /// Balance of an address
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).unwrap_or_default()
    }

    /// Allowance from owner to spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get_or_default(&owner, &spender)
    }

    /// Remaining mint quota of an address
    pub fn minter(&self, account: Address) -> U256 {
        self.minters.get(&account).unwrap_or_default()
    }

    /// Whether an address holds handler rights
    pub fn is_handler(&self, account: Address) -> bool {
        self.handlers.get(&account).unwrap_or_default()
    }

    /// Whether transfers are restricted to handler-mediated movements
    pub fn in_private_transfer_mode(&self) -> bool {
        self.in_private_transfer_mode.get_or_default()
    }

    /// Current administrator
    pub fn owner(&self) -> Option<Address> {
        self.owner.get()
    }

    /// Transfer tokens
    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        let sender = self.env().caller();
        if sender == recipient {
            self.env().revert(TokenError::CannotTargetSelfUser);
        }
        self.assert_transfer_allowed(&sender, &recipient);
        self.raw_transfer(&sender, &recipient, &amount);
        self.env().emit_event(Transfer {
            sender,
            recipient,
            amount,
        });
    }

    /// Approve spender
    pub fn approve(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        if owner == spender {
            self.env().revert(TokenError::CannotTargetSelfUser);
        }
        self.allowances.set(&owner, &spender, amount);
        self.env().emit_event(SetAllowance {
            owner,
            spender,
            allowance: amount,
        });
    }

    /// Increase allowance
    pub fn increase_allowance(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        if owner == spender {
            self.env().revert(TokenError::CannotTargetSelfUser);
        }
        let allowance = self.allowances.get_or_default(&owner, &spender);
        let new_allowance = allowance.saturating_add(amount);
        self.allowances.set(&owner, &spender, new_allowance);
        self.env().emit_event(IncreaseAllowance {
            owner,
            spender,
            allowance: new_allowance,
            inc_by: amount,
        });
    }

    /// Decrease allowance
    pub fn decrease_allowance(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        if owner == spender {
            self.env().revert(TokenError::CannotTargetSelfUser);
        }
        let allowance = self.allowances.get_or_default(&owner, &spender);
        let new_allowance = allowance.saturating_sub(amount);
        self.allowances.set(&owner, &spender, new_allowance);
        self.env().emit_event(DecreaseAllowance {
            owner,
            spender,
            allowance: new_allowance,
            decr_by: amount,
        });
    }

    /// Transfer from (with allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        if owner == recipient {
            self.env().revert(TokenError::CannotTargetSelfUser);
        }
        if amount.is_zero() {
            return;
        }
        self.assert_transfer_allowed(&owner, &recipient);
        let spender = self.env().caller();
        let allowance = self.allowances.get_or_default(&owner, &spender);
        if allowance < amount {
            self.env().revert(TokenError::InsufficientAllowance);
        }
        self.allowances.set(&owner, &spender, allowance - amount);
        self.raw_transfer(&owner, &recipient, &amount);
        self.env().emit_event(TransferFrom {
            spender,
            owner,
            recipient,
            amount,
        });
    }

    /// Mint tokens against the caller's remaining quota.
    /// Credits `min(amount, remaining quota)`; the excess is truncated, not
    /// rejected. A caller with no quota left is not a minter.
    pub fn mint(&mut self, to: Address, amount: U256) {
        let caller = self.env().caller();
        let quota = self.minters.get(&caller).unwrap_or_default();
        if quota.is_zero() {
            self.env().revert(TokenError::Unauthorized);
        }
        let credited = amount.min(quota);
        self.minters.set(&caller, quota - credited);
        self.raw_mint(&to, &credited);
    }

    /// Burn tokens from an account (handler only)
    pub fn burn(&mut self, from: Address, amount: U256) {
        let caller = self.env().caller();
        if !self.handlers.get(&caller).unwrap_or_default() {
            self.env().revert(TokenError::Unauthorized);
        }
        self.raw_burn(&from, &amount);
    }

    /// Set an account's remaining mint quota (administrator only)
    pub fn set_minter(&mut self, account: Address, allowance: U256) {
        self.require_owner();
        self.minters.set(&account, allowance);
        self.env().emit_event(events::MinterSet { account, allowance });
    }

    /// Grant or revoke handler rights (administrator only)
    pub fn set_handler(&mut self, account: Address, active: bool) {
        self.require_owner();
        self.handlers.set(&account, active);
        self.env().emit_event(events::HandlerSet { account, active });
    }

    /// Toggle the transfer restriction (administrator only)
    pub fn set_in_private_transfer_mode(&mut self, enabled: bool) {
        self.require_owner();
        self.in_private_transfer_mode.set(enabled);
        self.env()
            .emit_event(events::PrivateTransferModeSet { enabled });
    }

    /// Sweep foreign token balances held by this contract to the
    /// administrator (administrator only)
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
            self.env().revert(TokenError::Unauthorized);
        }
    }

    // In private transfer mode a movement must touch a handler on either end.
    fn assert_transfer_allowed(&self, sender: &Address, recipient: &Address) {
        if self.in_private_transfer_mode.get_or_default()
            && !self.handlers.get(sender).unwrap_or_default()
            && !self.handlers.get(recipient).unwrap_or_default()
        {
            self.env().revert(TokenError::Unauthorized);
        }
    }

    // Internal transfer
    fn raw_transfer(&mut self, sender: &Address, recipient: &Address, amount: &U256) {
        let balance = self.balances.get(sender).unwrap_or_default();
        if balance < *amount {
            self.env().revert(TokenError::InsufficientBalance);
        }
        if !amount.is_zero() {
            self.balances.subtract(sender, *amount);
            self.balances.add(recipient, *amount);
        }
    }

    // Internal mint
    fn raw_mint(&mut self, owner: &Address, amount: &U256) {
        self.total_supply.add(*amount);
        self.balances.add(owner, *amount);
        self.env().emit_event(Mint {
            recipient: owner.clone(),
            amount: *amount,
        });
    }

    // Internal burn
    fn raw_burn(&mut self, owner: &Address, amount: &U256) {
        let balance = self.balances.get(owner).unwrap_or_default();
        if balance < *amount {
            self.env().revert(TokenError::InsufficientBalance);
        }
        self.balances.subtract(owner, *amount);
        self.total_supply.subtract(*amount);
        self.env().emit_event(Burn {
            owner: owner.clone(),
            amount: *amount,
        });
    }
}
