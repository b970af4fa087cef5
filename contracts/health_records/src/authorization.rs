use soroban_sdk::{contracttype, Address, Env};

use crate::errors::report;
use crate::grant_ledger;
use crate::ContractError;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum DenyReason {
    /// The pair has never held a grant.
    NoGrant = 1,
    /// The newest grant of the pair expired or was revoked.
    Expired = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

/// Decides whether `requester` may act on `patient`'s records.
///
/// Only the grant ledger is consulted. An accepted request without a
/// visible live grant is still a denial.
pub fn authorize(
    env: &Env,
    patient: &Address,
    requester: &Address,
) -> Result<AccessDecision, ContractError> {
    if grant_ledger::has_live_grant(env, patient, requester)? {
        return Ok(AccessDecision::Allow);
    }

    let reason = match grant_ledger::current_grant(env, patient, requester)? {
        Some(_) => DenyReason::Expired,
        None => DenyReason::NoGrant,
    };
    Ok(AccessDecision::Deny(reason))
}

/// Gate for record operations. Patients always reach their own data;
/// anybody else needs [`authorize`] to allow.
pub fn require_access(
    env: &Env,
    patient: &Address,
    caller: &Address,
    resource: &str,
) -> Result<(), ContractError> {
    if caller == patient {
        return Ok(());
    }

    match authorize(env, patient, caller)? {
        AccessDecision::Allow => Ok(()),
        AccessDecision::Deny(_) => Err(report(
            env,
            ContractError::AccessDenied,
            Some(caller.clone()),
            resource,
        )),
    }
}
