use crate::{events, ContractError, ADMIN};
use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Types ─────────────────────────────────────────────────────

/// Defines the scope of the pause mechanism
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PauseScope {
    /// Halts every write endpoint
    Global,
    /// Halts a single write endpoint, named by its short symbol
    Function(Symbol),
}

// ── Storage Keys ─────────────────────────────────────────────

pub fn global_pause_key() -> Symbol {
    symbol_short!("P_GLOB")
}

pub fn function_pause_key(func: &Symbol) -> (Symbol, Symbol) {
    (symbol_short!("P_FUNC"), func.clone())
}

// ── Core Logistics ───────────────────────────────────────────

pub fn is_paused(env: &Env, scope: &PauseScope) -> bool {
    let global = env
        .storage()
        .instance()
        .get(&global_pause_key())
        .unwrap_or(false);
    match scope {
        PauseScope::Global => global,
        PauseScope::Function(func_name) => {
            global
                || env
                    .storage()
                    .instance()
                    .get(&function_pause_key(func_name))
                    .unwrap_or(false)
        }
    }
}

/// Fails with `Paused` when either the whole contract or `scope` is halted.
pub fn require_not_paused(env: &Env, scope: &PauseScope) -> Result<(), ContractError> {
    if is_paused(env, scope) {
        return Err(ContractError::Paused);
    }
    Ok(())
}

fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
    let admin: Address = env
        .storage()
        .instance()
        .get(&ADMIN)
        .ok_or(ContractError::NotInitialized)?;
    if *caller != admin {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

fn set_flag(env: &Env, scope: &PauseScope, value: bool) {
    match scope {
        PauseScope::Global => {
            env.storage().instance().set(&global_pause_key(), &value);
        }
        PauseScope::Function(func_name) => {
            env.storage()
                .instance()
                .set(&function_pause_key(func_name), &value);
        }
    }
}

/// Engages the circuit breaker for `scope`. Admin only.
pub fn pause_contract(env: &Env, caller: &Address, scope: PauseScope) -> Result<(), ContractError> {
    require_admin(env, caller)?;
    set_flag(env, &scope, true);
    events::publish_contract_paused(env, caller.clone(), scope);
    Ok(())
}

pub fn resume_contract(
    env: &Env,
    caller: &Address,
    scope: PauseScope,
) -> Result<(), ContractError> {
    require_admin(env, caller)?;
    set_flag(env, &scope, false);
    events::publish_contract_resumed(env, caller.clone(), scope);
    Ok(())
}
