#![no_std]
//! Patient health records gated by consent-derived access grants.
//!
//! A professional files an access request, the patient answers it, and an
//! accepted request becomes a time-bounded grant. Every record read or write
//! made on someone else's behalf is checked against the grant ledger first.

pub mod authorization;
pub mod circuit_breaker;
pub mod consent;
pub mod errors;
pub mod events;
pub mod grant_ledger;
pub mod query;
pub mod record_store;
pub mod request_ledger;
pub mod validation;

use soroban_sdk::{contract, contractimpl, symbol_short, Address, BytesN, Env, String, Symbol, Vec};

pub use authorization::{AccessDecision, DenyReason};
pub use circuit_breaker::PauseScope;
pub use consent::{AccessRequestInput, Decision};
pub use errors::{ContractError, ErrorCategory, ErrorSeverity};
pub use grant_ledger::AccessGrant;
pub use query::{Condition, Query, QueryField, QueryOp};
pub use record_store::{HealthRecord, NewRecord};
pub use request_ledger::{AccessRequest, RequestStatus};

/// Storage keys for the contract
const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Function scopes accepted by [`PauseScope::Function`].
pub const FN_REQUEST_ACCESS: Symbol = symbol_short!("REQ_ACC");
pub const FN_ANSWER_REQUEST: Symbol = symbol_short!("ANS_REQ");
pub const FN_REVOKE_ACCESS: Symbol = symbol_short!("REV_ACC");
pub const FN_ADD_RECORD: Symbol = symbol_short!("ADD_REC");

fn extend_ttl_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

#[contract]
pub struct HealthRecordsContract;

#[contractimpl]
impl HealthRecordsContract {
    /// Initialize the contract with an admin address
    pub fn initialize(env: Env, admin: Address) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);
        extend_ttl_instance(&env);

        events::publish_initialized(&env, admin);

        Ok(())
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    /// Contract version
    pub fn version() -> u32 {
        1
    }

    // ======================== Circuit Breaker ========================

    pub fn pause_contract(
        env: Env,
        caller: Address,
        scope: PauseScope,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        circuit_breaker::pause_contract(&env, &caller, scope)
    }

    pub fn resume_contract(
        env: Env,
        caller: Address,
        scope: PauseScope,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        circuit_breaker::resume_contract(&env, &caller, scope)
    }

    pub fn is_paused(env: Env, scope: PauseScope) -> bool {
        circuit_breaker::is_paused(&env, &scope)
    }

    // ======================== Consent Workflow ========================

    /// File a request for access to `patient`'s records. Returns the new
    /// request id.
    pub fn request_access(
        env: Env,
        requester: Address,
        patient: Address,
        input: AccessRequestInput,
    ) -> Result<BytesN<32>, ContractError> {
        circuit_breaker::require_not_paused(&env, &PauseScope::Function(FN_REQUEST_ACCESS))?;
        requester.require_auth();
        consent::request_access(&env, &patient, &requester, input)
    }

    /// Accept or deny a pending request. Accepting issues the grant.
    pub fn answer_request(
        env: Env,
        patient: Address,
        request_id: BytesN<32>,
        decision: Decision,
        confirmed_expiration: Option<u64>,
    ) -> Result<AccessRequest, ContractError> {
        circuit_breaker::require_not_paused(&env, &PauseScope::Function(FN_ANSWER_REQUEST))?;
        patient.require_auth();
        consent::answer_request(&env, &patient, &request_id, decision, confirmed_expiration)
    }

    /// Expire `requester`'s live grant on `patient`'s records. Returns
    /// `false` when there was nothing to revoke.
    pub fn revoke_access(
        env: Env,
        patient: Address,
        requester: Address,
    ) -> Result<bool, ContractError> {
        circuit_breaker::require_not_paused(&env, &PauseScope::Function(FN_REVOKE_ACCESS))?;
        patient.require_auth();
        consent::revoke_access(&env, &patient, &requester)
    }

    pub fn revoke_access_by_request(
        env: Env,
        patient: Address,
        request_id: BytesN<32>,
    ) -> Result<bool, ContractError> {
        circuit_breaker::require_not_paused(&env, &PauseScope::Function(FN_REVOKE_ACCESS))?;
        patient.require_auth();
        let revoked = consent::revoke_access_by_request(&env, &patient, &request_id);
        Ok(revoked)
    }

    pub fn get_request(env: Env, request_id: BytesN<32>) -> Result<AccessRequest, ContractError> {
        request_ledger::get_request(&env, &request_id).ok_or_else(|| {
            errors::report(&env, ContractError::RequestNotFound, None, "get_request")
        })
    }

    pub fn find_pending_request(
        env: Env,
        patient: Address,
        requester: Address,
    ) -> Result<Option<AccessRequest>, ContractError> {
        request_ledger::find_pending(&env, &patient, &requester)
    }

    pub fn list_requests_for_patient(
        env: Env,
        patient: Address,
        query: Query,
    ) -> Result<Vec<AccessRequest>, ContractError> {
        request_ledger::list_for_patient(&env, &patient, &query)
    }

    pub fn list_requests_for_requester(
        env: Env,
        requester: Address,
        query: Query,
    ) -> Result<Vec<AccessRequest>, ContractError> {
        request_ledger::list_for_requester(&env, &requester, &query)
    }

    pub fn list_grants_for_patient(
        env: Env,
        patient: Address,
        query: Query,
    ) -> Result<Vec<AccessGrant>, ContractError> {
        grant_ledger::list_for_patient(&env, &patient, &query)
    }

    pub fn list_grants_for_requester(
        env: Env,
        requester: Address,
        query: Query,
    ) -> Result<Vec<AccessGrant>, ContractError> {
        grant_ledger::list_for_requester(&env, &requester, &query)
    }

    /// Newest grant of the pair, live or not.
    pub fn get_grant(
        env: Env,
        patient: Address,
        requester: Address,
    ) -> Result<Option<AccessGrant>, ContractError> {
        grant_ledger::current_grant(&env, &patient, &requester)
    }

    /// Authorization decision for `requester` on `patient`'s records.
    pub fn check_access(
        env: Env,
        patient: Address,
        requester: Address,
    ) -> Result<AccessDecision, ContractError> {
        authorization::authorize(&env, &patient, &requester)
    }

    // ======================== Health Records ========================

    /// Append a record to `patient`'s history. `caller` is recorded as the
    /// author and must be the patient or hold a live grant.
    pub fn add_record(
        env: Env,
        caller: Address,
        patient: Address,
        input: NewRecord,
    ) -> Result<(), ContractError> {
        circuit_breaker::require_not_paused(&env, &PauseScope::Function(FN_ADD_RECORD))?;
        caller.require_auth();

        validation::validate_record_id(&input.record_id)?;
        validation::validate_text(&input.description)?;
        validation::validate_name(&input.author_name)?;
        validation::validate_text(&input.specialty)?;
        validation::validate_text(&input.record_type)?;
        validation::validate_name(&input.organization)?;

        authorization::require_access(&env, &patient, &caller, "add_record")?;

        let record = HealthRecord {
            record_id: input.record_id,
            patient: patient.clone(),
            description: input.description,
            created_at: env.ledger().timestamp(),
            event_date: input.event_date,
            author: caller.clone(),
            author_name: input.author_name,
            specialty: input.specialty,
            record_type: input.record_type,
            organization: input.organization,
        };
        record_store::put_record(&env, &record)?;

        events::publish_record_added(&env, record.record_id, patient, caller);

        Ok(())
    }

    pub fn get_history(
        env: Env,
        caller: Address,
        patient: Address,
    ) -> Result<Vec<HealthRecord>, ContractError> {
        caller.require_auth();
        authorization::require_access(&env, &patient, &caller, "get_history")?;
        record_store::get_history(&env, &patient)
    }

    pub fn get_record_by_id(
        env: Env,
        caller: Address,
        patient: Address,
        record_id: String,
    ) -> Result<HealthRecord, ContractError> {
        caller.require_auth();
        authorization::require_access(&env, &patient, &caller, "get_record_by_id")?;
        record_store::get_record_by_id(&env, &patient, &record_id).map_err(|err| {
            errors::report(&env, err, Some(caller), "get_record_by_id")
        })
    }

    pub fn get_record_count(env: Env, patient: Address) -> u32 {
        record_store::record_count(&env, &patient)
    }
}


#[cfg(test)]
mod test_pause;
