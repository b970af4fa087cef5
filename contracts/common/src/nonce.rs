//! # Per-sender Creation Nonces
//!
//! Each sender owns an independent, strictly-monotonic counter in persistent
//! storage. Contracts mix the value returned by [`get_and_increment_nonce`]
//! into content hashes so that two identifiers minted for the same inputs in
//! the same ledger close never collide.
//!
//! ```ignore
//! let nonce = nonce::get_and_increment_nonce(&env, &requester)?;
//! let id = env.crypto().sha256(&(patient, requester, nonce).to_xdr(&env));
//! ```

use soroban_sdk::{contracttype, Address, Env};

use crate::CommonError;

// ── Storage key ──────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
enum NonceKey {
    Nonce(Address),
}

// ── TTL constants (mirror common convention) ─────────────────────────────────

const TTL_THRESHOLD: u32 = 5_184_000;
const TTL_EXTEND_TO: u32 = 10_368_000;

// ── Internal helpers ─────────────────────────────────────────────────────────

fn nonce_key(sender: &Address) -> NonceKey {
    NonceKey::Nonce(sender.clone())
}

fn load_nonce(env: &Env, sender: &Address) -> u64 {
    env.storage()
        .persistent()
        .get(&nonce_key(sender))
        .unwrap_or(0u64)
}

fn store_nonce(env: &Env, sender: &Address, value: u64) {
    let key = nonce_key(sender);
    env.storage().persistent().set(&key, &value);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Return the current nonce for `sender` without modifying state.
///
/// New senders always start at `0`.
pub fn current_nonce(env: &Env, sender: &Address) -> u64 {
    load_nonce(env, sender)
}

/// Read the current nonce, advance the stored counter and return the value
/// that was read.
///
/// Returns [`CommonError::NonceOverflow`] if the counter would exceed `u64::MAX`.
pub fn get_and_increment_nonce(env: &Env, sender: &Address) -> Result<u64, CommonError> {
    let current = load_nonce(env, sender);
    let next = current.checked_add(1).ok_or(CommonError::NonceOverflow)?;
    store_nonce(env, sender, next);
    Ok(current)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::{contract, contractimpl, testutils::Address as _, Env};

    #[contract]
    pub struct TestContract;

    #[contractimpl]
    impl TestContract {}

    fn with_contract_env<F: FnOnce(&Env)>(f: F) {
        let env = Env::default();
        let contract_id = env.register(TestContract, ());
        env.as_contract(&contract_id, || {
            f(&env);
        });
    }

    #[test]
    fn new_sender_starts_at_zero() {
        with_contract_env(|env| {
            let sender = Address::generate(env);
            assert_eq!(current_nonce(env, &sender), 0);
        });
    }

    #[test]
    fn current_nonce_is_read_only() {
        with_contract_env(|env| {
            let sender = Address::generate(env);
            assert_eq!(current_nonce(env, &sender), 0);
            assert_eq!(current_nonce(env, &sender), 0);
        });
    }

    #[test]
    fn get_and_increment_returns_current_then_advances() {
        with_contract_env(|env| {
            let sender = Address::generate(env);
            assert_eq!(get_and_increment_nonce(env, &sender).unwrap(), 0);
            assert_eq!(get_and_increment_nonce(env, &sender).unwrap(), 1);
            assert_eq!(get_and_increment_nonce(env, &sender).unwrap(), 2);
            assert_eq!(current_nonce(env, &sender), 3);
        });
    }

    #[test]
    fn exhausted_counter_overflows() {
        with_contract_env(|env| {
            let sender = Address::generate(env);
            store_nonce(env, &sender, u64::MAX);
            let err = get_and_increment_nonce(env, &sender).unwrap_err();
            assert_eq!(err, CommonError::NonceOverflow);
            assert_eq!(current_nonce(env, &sender), u64::MAX);
        });
    }

    #[test]
    fn senders_have_independent_counters() {
        with_contract_env(|env| {
            let alice = Address::generate(env);
            let bob = Address::generate(env);
            get_and_increment_nonce(env, &alice).unwrap();
            get_and_increment_nonce(env, &alice).unwrap();
            assert_eq!(current_nonce(env, &alice), 2);
            assert_eq!(current_nonce(env, &bob), 0);
            get_and_increment_nonce(env, &bob).unwrap();
            assert_eq!(current_nonce(env, &bob), 1);
        });
    }
}
