//! Consent workflow: request → answer → grant, plus revocation.
//!
//! This is the only module that writes to both the request ledger and the
//! grant ledger inside one call, and it always writes the request ledger
//! first. A failure between the two therefore leaves an accepted request
//! without a grant, which the authorization check treats as a denial.

use soroban_sdk::{contracttype, Address, BytesN, Env, String};

use crate::errors::report;
use crate::grant_ledger::{self, AccessGrant};
use crate::request_ledger::{self, AccessRequest, RequestStatus};
use crate::{events, validation, ContractError};

/// Patient's answer to a pending request.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Decision {
    Accept = 1,
    Deny = 2,
}

/// Caller-supplied part of an access request.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessRequestInput {
    pub patient_name: String,
    pub requester_name: String,
    pub description: String,
    pub proposed_expiration: u64,
}

pub fn request_access(
    env: &Env,
    patient: &Address,
    requester: &Address,
    input: AccessRequestInput,
) -> Result<BytesN<32>, ContractError> {
    if patient == requester {
        return Err(ContractError::InvalidInput);
    }
    validation::validate_name(&input.patient_name)?;
    validation::validate_name(&input.requester_name)?;
    validation::validate_text(&input.description)?;

    let now = env.ledger().timestamp();
    validation::validate_expiration(now, input.proposed_expiration)?;

    let pending = request_ledger::find_pending(env, patient, requester)?;
    if pending.is_some() || grant_ledger::has_live_grant(env, patient, requester)? {
        return Err(report(
            env,
            ContractError::DuplicateRequest,
            Some(requester.clone()),
            "request_access",
        ));
    }

    let request = AccessRequest {
        request_id: request_ledger::next_request_id(env, patient, requester)?,
        patient: patient.clone(),
        patient_name: input.patient_name,
        requester: requester.clone(),
        requester_name: input.requester_name,
        description: input.description,
        status: RequestStatus::Pending,
        created_at: now,
        status_changed_at: now,
        requested_expiration: input.proposed_expiration,
    };
    request_ledger::create_request(env, &request)?;

    events::publish_access_requested(
        env,
        request.request_id.clone(),
        request.patient,
        request.requester,
        request.requested_expiration,
    );

    Ok(request.request_id)
}

/// Answers a pending request addressed to `patient`.
///
/// On [`Decision::Accept`] the grant expires at `confirmed_expiration` when
/// given, otherwise at the request's proposed expiration. Every check runs
/// before the first write.
pub fn answer_request(
    env: &Env,
    patient: &Address,
    request_id: &BytesN<32>,
    decision: Decision,
    confirmed_expiration: Option<u64>,
) -> Result<AccessRequest, ContractError> {
    let request = request_ledger::get_request(env, request_id)
        .filter(|request| request.patient == *patient)
        .ok_or_else(|| {
            report(
                env,
                ContractError::RequestNotFound,
                Some(patient.clone()),
                "answer_request",
            )
        })?;

    if request.status != RequestStatus::Pending {
        return Err(ContractError::InvalidTransition);
    }

    let now = env.ledger().timestamp();
    let answered = match decision {
        Decision::Deny => {
            request_ledger::update_status(env, request_id, RequestStatus::Denied, now)?
        }
        Decision::Accept => {
            let expires_at = confirmed_expiration.unwrap_or(request.requested_expiration);
            validation::validate_expiration(now, expires_at)?;
            if grant_ledger::has_live_grant(env, &request.patient, &request.requester)? {
                return Err(ContractError::GrantAlreadyExists);
            }

            let accepted =
                request_ledger::update_status(env, request_id, RequestStatus::Accepted, now)?;
            let grant = grant_ledger::issue_grant(env, &accepted, expires_at)?;
            events::publish_access_granted(
                env,
                grant.request_id,
                grant.patient,
                grant.requester,
                grant.expires_at,
            );
            accepted
        }
    };

    events::publish_request_answered(
        env,
        answered.request_id.clone(),
        answered.patient.clone(),
        answered.requester.clone(),
        decision,
        answered.status,
    );

    Ok(answered)
}

fn announce_revocation(env: &Env, grant: &AccessGrant) {
    events::publish_access_revoked(
        env,
        grant.request_id.clone(),
        grant.patient.clone(),
        grant.requester.clone(),
    );
}

/// Cuts the pair's live grant short. The originating request keeps its
/// `Accepted` status. Returns whether a grant was revoked.
pub fn revoke_access(
    env: &Env,
    patient: &Address,
    requester: &Address,
) -> Result<bool, ContractError> {
    let revoked = grant_ledger::revoke(env, patient, requester)?;
    if let Some(grant) = &revoked {
        announce_revocation(env, grant);
    }
    Ok(revoked.is_some())
}

pub fn revoke_access_by_request(env: &Env, patient: &Address, request_id: &BytesN<32>) -> bool {
    let revoked = grant_ledger::revoke_by_request(env, patient, request_id);
    if let Some(grant) = &revoked {
        announce_revocation(env, grant);
    }
    revoked.is_some()
}
