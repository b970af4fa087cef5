use crate::circuit_breaker::PauseScope;
use crate::consent::Decision;
use crate::errors::ErrorContext;
use crate::request_ledger::RequestStatus;
use soroban_sdk::{symbol_short, Address, BytesN, Env, String};

/// Event published when the contract is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub timestamp: u64,
}

/// Event published when a professional asks for access to a patient's records.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessRequestedEvent {
    pub request_id: BytesN<32>,
    pub patient: Address,
    pub requester: Address,
    pub requested_expiration: u64,
    pub timestamp: u64,
}

/// Event published when a patient answers a pending request.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestAnsweredEvent {
    pub request_id: BytesN<32>,
    pub patient: Address,
    pub requester: Address,
    pub decision: Decision,
    pub status: RequestStatus,
    pub timestamp: u64,
}

/// Event published when an accepted request turns into a grant.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessGrantedEvent {
    pub request_id: BytesN<32>,
    pub patient: Address,
    pub requester: Address,
    pub expires_at: u64,
    pub timestamp: u64,
}

/// Event published when a live grant is cut short.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessRevokedEvent {
    pub request_id: BytesN<32>,
    pub patient: Address,
    pub requester: Address,
    pub timestamp: u64,
}

/// Event published when a health record is appended to a patient's history.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordAddedEvent {
    pub record_id: String,
    pub patient: Address,
    pub author: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractPausedEvent {
    pub caller: Address,
    pub scope: PauseScope,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractResumedEvent {
    pub caller: Address,
    pub scope: PauseScope,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, admin: Address) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        admin,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an event when a new access request is filed.
/// Topics carry both parties so either side can index its inbox.
pub fn publish_access_requested(
    env: &Env,
    request_id: BytesN<32>,
    patient: Address,
    requester: Address,
    requested_expiration: u64,
) {
    let topics = (symbol_short!("REQ_NEW"), patient.clone(), requester.clone());
    let data = AccessRequestedEvent {
        request_id,
        patient,
        requester,
        requested_expiration,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_request_answered(
    env: &Env,
    request_id: BytesN<32>,
    patient: Address,
    requester: Address,
    decision: Decision,
    status: RequestStatus,
) {
    let topics = (symbol_short!("REQ_ANS"), patient.clone(), requester.clone());
    let data = RequestAnsweredEvent {
        request_id,
        patient,
        requester,
        decision,
        status,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an event when a grant is issued.
/// This event includes the originating request and the fixed expiration.
pub fn publish_access_granted(
    env: &Env,
    request_id: BytesN<32>,
    patient: Address,
    requester: Address,
    expires_at: u64,
) {
    let topics = (symbol_short!("ACC_GRT"), patient.clone(), requester.clone());
    let data = AccessGrantedEvent {
        request_id,
        patient,
        requester,
        expires_at,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_access_revoked(
    env: &Env,
    request_id: BytesN<32>,
    patient: Address,
    requester: Address,
) {
    let topics = (symbol_short!("ACC_REV"), patient.clone(), requester.clone());
    let data = AccessRevokedEvent {
        request_id,
        patient,
        requester,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_record_added(env: &Env, record_id: String, patient: Address, author: Address) {
    let topics = (symbol_short!("REC_ADD"), patient.clone(), author.clone());
    let data = RecordAddedEvent {
        record_id,
        patient,
        author,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_contract_paused(env: &Env, caller: Address, scope: PauseScope) {
    let topics = (symbol_short!("PAUSED"), caller.clone());
    let data = ContractPausedEvent {
        caller,
        scope,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_contract_resumed(env: &Env, caller: Address, scope: PauseScope) {
    let topics = (symbol_short!("RESUMED"), caller.clone());
    let data = ContractResumedEvent {
        caller,
        scope,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an error event for monitoring and indexing.
/// The payload carries the error code, category, severity, message, user,
/// resource id, retryable flag and timestamp.
pub fn publish_error(env: &Env, error_code: u32, context: ErrorContext) {
    let topics = (
        symbol_short!("ERROR"),
        context.category.clone(),
        context.severity.clone(),
    );
    let data = (
        error_code,
        context.category,
        context.severity,
        context.message,
        context.user,
        context.resource_id,
        context.retryable,
        context.timestamp,
    );
    env.events().publish(topics, data);
}
