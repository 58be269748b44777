//! Incentive token tests
//!
//! Quota-gated minting, handler burn rights, the private transfer mode and
//! the administrator surface of the token ledger.

use odra::casper_types::U256;
use odra::host::{Deployer, HostRef};
use odra::prelude::*;

use ember_casper::tokens::{IncentiveToken, IncentiveTokenHostRef, IncentiveTokenInitArgs};

// ==========================================
// Helpers
// ==========================================

fn deploy_token(env: &odra::host::HostEnv, private_mode: bool) -> IncentiveTokenHostRef {
    let admin = env.get_account(0);
    env.set_caller(admin);
    IncentiveToken::deploy(
        env,
        IncentiveTokenInitArgs {
            name: "Ember".to_string(),
            symbol: "EMBER".to_string(),
            in_private_transfer_mode: private_mode,
        },
    )
}

// ==========================================
// Ownership & Metadata
// ==========================================

#[test]
fn test_deployer_is_owner() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    assert_eq!(token.owner(), Some(env.get_account(0)));
}

#[test]
fn test_name_and_symbol() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    assert_eq!(token.name(), "Ember");
    assert_eq!(token.symbol(), "EMBER");
    assert_eq!(token.decimals(), 18);
    assert_eq!(token.total_supply(), U256::zero());
}

#[test]
fn test_transfer_ownership_moves_admin_gates() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let new_owner = env.get_account(1);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.transfer_ownership(new_owner);
    assert_eq!(token_ref.owner(), Some(new_owner));

    env.set_caller(new_owner);
    token_ref.set_minter(new_owner, U256::from(100u64));
    assert_eq!(token_ref.minter(new_owner), U256::from(100u64));
}

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_old_owner_loses_admin_gates() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let old_owner = env.get_account(0);
    let new_owner = env.get_account(1);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.transfer_ownership(new_owner);

    env.set_caller(old_owner);
    token_ref.set_minter(old_owner, U256::from(100u64));
}

// ==========================================
// Handler & Minter Configuration
// ==========================================

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_set_handler_by_non_owner_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let bad_actor = env.get_account(2);

    env.set_caller(bad_actor);
    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_handler(bad_actor, true);
}

#[test]
fn test_set_handler_by_owner() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let user = env.get_account(1);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_handler(user, true);
    assert!(token_ref.is_handler(user));

    token_ref.set_handler(user, false);
    assert!(!token_ref.is_handler(user));
}

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_set_minter_by_non_owner_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let bad_actor = env.get_account(2);

    env.set_caller(bad_actor);
    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_minter(bad_actor, U256::from(10_000u64));
}

#[test]
fn test_set_minter_by_owner() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let user = env.get_account(1);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_minter(user, U256::from(10_000u64));
    assert_eq!(token_ref.minter(user), U256::from(10_000u64));
}

// ==========================================
// Minting
// ==========================================

#[test]
fn test_mint_truncates_to_remaining_quota() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let user = env.get_account(1);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_minter(user, U256::from(100_000u64));

    env.set_caller(user);
    token_ref.mint(user, U256::from(10_000u64));
    assert_eq!(token_ref.balance_of(user), U256::from(10_000u64));

    // The second mint asks for more than the remaining quota and is
    // credited exactly the remainder.
    token_ref.mint(user, U256::from(100_002u64));
    assert_eq!(token_ref.balance_of(user), U256::from(100_000u64));
    assert_eq!(token_ref.total_supply(), U256::from(100_000u64));
    assert_eq!(token_ref.minter(user), U256::zero());
}

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_mint_without_quota_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let bad_actor = env.get_account(2);

    env.set_caller(bad_actor);
    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.mint(bad_actor, U256::from(100u64));
}

// ==========================================
// Burning
// ==========================================

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_burn_by_non_handler_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let bad_actor = env.get_account(2);
    let user = env.get_account(1);

    env.set_caller(bad_actor);
    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.burn(user, U256::from(100u64));
}

#[test]
fn test_burn_by_handler() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let user = env.get_account(1);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_handler(user, true);
    token_ref.set_minter(user, U256::from(100_000u64));

    env.set_caller(user);
    token_ref.mint(user, U256::from(10_000u64));
    token_ref.burn(user, U256::from(100u64));
    assert_eq!(token_ref.balance_of(user), U256::from(9_900u64));
    assert_eq!(token_ref.total_supply(), U256::from(9_900u64));
}

#[test]
#[should_panic(expected = "InsufficientBalance")]
fn test_burn_exceeding_balance_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let user = env.get_account(1);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_handler(user, true);
    token_ref.set_minter(user, U256::from(1_000u64));

    env.set_caller(user);
    token_ref.mint(user, U256::from(1_000u64));
    token_ref.burn(user, U256::from(1_001u64));
}

// ==========================================
// Transfers & Allowances
// ==========================================

#[test]
fn test_transfer() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let user1 = env.get_account(1);
    let user2 = env.get_account(2);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_minter(user1, U256::from(1_000u64));

    env.set_caller(user1);
    token_ref.mint(user1, U256::from(1_000u64));
    token_ref.transfer(user2, U256::from(400u64));
    assert_eq!(token_ref.balance_of(user1), U256::from(600u64));
    assert_eq!(token_ref.balance_of(user2), U256::from(400u64));
}

#[test]
#[should_panic(expected = "InsufficientBalance")]
fn test_transfer_exceeding_balance_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let user1 = env.get_account(1);
    let user2 = env.get_account(2);

    env.set_caller(user1);
    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.transfer(user2, U256::from(1u64));
}

#[test]
fn test_transfer_from_with_allowance() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let user1 = env.get_account(1);
    let user2 = env.get_account(2);
    let spender = env.get_account(3);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_minter(user1, U256::from(1_000u64));

    env.set_caller(user1);
    token_ref.mint(user1, U256::from(1_000u64));
    token_ref.approve(spender, U256::from(500u64));

    env.set_caller(spender);
    token_ref.transfer_from(user1, user2, U256::from(300u64));
    assert_eq!(token_ref.balance_of(user2), U256::from(300u64));
    assert_eq!(token_ref.allowance(user1, spender), U256::from(200u64));
}

#[test]
#[should_panic(expected = "InsufficientAllowance")]
fn test_transfer_from_without_allowance_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let user1 = env.get_account(1);
    let user2 = env.get_account(2);
    let spender = env.get_account(3);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_minter(user1, U256::from(1_000u64));

    env.set_caller(user1);
    token_ref.mint(user1, U256::from(1_000u64));

    env.set_caller(spender);
    token_ref.transfer_from(user1, user2, U256::from(300u64));
}

// ==========================================
// Private Transfer Mode
// ==========================================

#[test]
fn test_set_in_private_transfer_mode() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_in_private_transfer_mode(true);
    assert!(token_ref.in_private_transfer_mode());
}

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_set_in_private_transfer_mode_by_non_owner_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let bad_actor = env.get_account(2);

    env.set_caller(bad_actor);
    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_in_private_transfer_mode(true);
}

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_private_mode_blocks_non_handler_transfer() {
    let env = odra_test::env();
    let token = deploy_token(&env, true);
    let user1 = env.get_account(1);
    let user2 = env.get_account(2);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_minter(user1, U256::from(1_000u64));

    env.set_caller(user1);
    token_ref.mint(user1, U256::from(1_000u64));
    token_ref.transfer(user2, U256::from(100u64));
}

#[test]
fn test_private_mode_allows_handler_recipient() {
    let env = odra_test::env();
    let token = deploy_token(&env, true);
    let user1 = env.get_account(1);
    let handler = env.get_account(2);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_minter(user1, U256::from(1_000u64));
    token_ref.set_handler(handler, true);

    env.set_caller(user1);
    token_ref.mint(user1, U256::from(1_000u64));
    token_ref.transfer(handler, U256::from(100u64));
    assert_eq!(token_ref.balance_of(handler), U256::from(100u64));
}

#[test]
fn test_private_mode_allows_handler_sender() {
    let env = odra_test::env();
    let token = deploy_token(&env, true);
    let handler = env.get_account(1);
    let user2 = env.get_account(2);

    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.set_minter(handler, U256::from(1_000u64));
    token_ref.set_handler(handler, true);

    env.set_caller(handler);
    token_ref.mint(handler, U256::from(1_000u64));
    token_ref.transfer(user2, U256::from(100u64));
    assert_eq!(token_ref.balance_of(user2), U256::from(100u64));
}

// ==========================================
// Token Recovery
// ==========================================

#[test]
fn test_recover_token_sweeps_foreign_balance() {
    let env = odra_test::env();
    let admin = env.get_account(0);
    let token = deploy_token(&env, false);
    let stray = deploy_token(&env, false);
    let user = env.get_account(1);

    // A stray token balance ends up held by the token contract.
    let mut stray_ref = IncentiveTokenHostRef::new(stray.address(), env.clone());
    env.set_caller(admin);
    stray_ref.set_minter(user, U256::from(1_000u64));
    env.set_caller(user);
    stray_ref.mint(token.address(), U256::from(1_000u64));

    env.set_caller(admin);
    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.recover_token(vec![stray.address()]);
    assert_eq!(stray_ref.balance_of(admin), U256::from(1_000u64));
    assert_eq!(stray_ref.balance_of(token.address()), U256::zero());
}

#[test]
#[should_panic(expected = "Unauthorized")]
fn test_recover_token_by_non_owner_reverts() {
    let env = odra_test::env();
    let token = deploy_token(&env, false);
    let stray = deploy_token(&env, false);
    let bad_actor = env.get_account(2);

    env.set_caller(bad_actor);
    let mut token_ref = IncentiveTokenHostRef::new(token.address(), env.clone());
    token_ref.recover_token(vec![stray.address()]);
}
