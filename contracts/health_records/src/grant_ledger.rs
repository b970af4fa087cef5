use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, String, Symbol, Vec};

use crate::query::{Query, QueryField, Queryable};
use crate::request_ledger::AccessRequest;
use crate::ContractError;

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Time-bounded authorization derived from an accepted request.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessGrant {
    pub request_id: BytesN<32>,
    pub patient: Address,
    pub patient_name: String,
    pub requester: Address,
    pub requester_name: String,
    pub created_at: u64,
    pub expires_at: u64,
}

impl AccessGrant {
    pub fn is_live(&self, now: u64) -> bool {
        self.expires_at > now
    }
}

impl Queryable for AccessGrant {
    fn field_value(&self, field: &QueryField) -> Option<u64> {
        match field {
            QueryField::CreatedAt => Some(self.created_at),
            QueryField::Expiration => Some(self.expires_at),
            QueryField::Status | QueryField::StatusChangedAt => None,
        }
    }
}

pub fn grant_key(request_id: &BytesN<32>) -> (Symbol, BytesN<32>) {
    (symbol_short!("GRANT"), request_id.clone())
}

/// Points at the newest grant of a pair. Older grants of the pair are
/// already expired, since issuance is refused while one is live and
/// expirations are never extended.
pub fn pair_key(patient: &Address, requester: &Address) -> (Symbol, Address, Address) {
    (symbol_short!("GRT_PAIR"), patient.clone(), requester.clone())
}

pub fn patient_index_key(patient: &Address) -> (Symbol, Address) {
    (symbol_short!("PAT_GRT"), patient.clone())
}

pub fn requester_index_key(requester: &Address) -> (Symbol, Address) {
    (symbol_short!("RQR_GRT"), requester.clone())
}

fn store(env: &Env, grant: &AccessGrant) {
    let key = grant_key(&grant.request_id);
    env.storage().persistent().set(&key, grant);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn append_id(env: &Env, key: &(Symbol, Address), request_id: &BytesN<32>) {
    let mut ids: Vec<BytesN<32>> = env
        .storage()
        .persistent()
        .get(key)
        .unwrap_or(Vec::new(env));
    ids.push_back(request_id.clone());
    env.storage().persistent().set(key, &ids);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn get_grant(env: &Env, request_id: &BytesN<32>) -> Option<AccessGrant> {
    env.storage().persistent().get(&grant_key(request_id))
}

/// Newest grant for the pair regardless of expiry.
pub fn current_grant(
    env: &Env,
    patient: &Address,
    requester: &Address,
) -> Result<Option<AccessGrant>, ContractError> {
    let pointer: Option<BytesN<32>> = env
        .storage()
        .persistent()
        .get(&pair_key(patient, requester));
    match pointer {
        Some(id) => get_grant(env, &id)
            .map(Some)
            .ok_or(ContractError::StorageError),
        None => Ok(None),
    }
}

pub fn live_grant(
    env: &Env,
    patient: &Address,
    requester: &Address,
) -> Result<Option<AccessGrant>, ContractError> {
    let now = env.ledger().timestamp();
    let current = current_grant(env, patient, requester)?;
    Ok(current.filter(|grant| grant.is_live(now)))
}

/// The single authorization predicate: a grant for the pair with
/// `expires_at > now`.
pub fn has_live_grant(
    env: &Env,
    patient: &Address,
    requester: &Address,
) -> Result<bool, ContractError> {
    Ok(live_grant(env, patient, requester)?.is_some())
}

/// Issues the grant for an accepted request. Fails with
/// [`ContractError::GrantAlreadyExists`] when the pair already holds a live
/// grant.
pub fn issue_grant(
    env: &Env,
    request: &AccessRequest,
    expires_at: u64,
) -> Result<AccessGrant, ContractError> {
    if has_live_grant(env, &request.patient, &request.requester)? {
        return Err(ContractError::GrantAlreadyExists);
    }
    if get_grant(env, &request.request_id).is_some() {
        return Err(ContractError::GrantAlreadyExists);
    }

    let grant = AccessGrant {
        request_id: request.request_id.clone(),
        patient: request.patient.clone(),
        patient_name: request.patient_name.clone(),
        requester: request.requester.clone(),
        requester_name: request.requester_name.clone(),
        created_at: env.ledger().timestamp(),
        expires_at,
    };

    store(env, &grant);

    let pair = pair_key(&grant.patient, &grant.requester);
    env.storage().persistent().set(&pair, &grant.request_id);
    env.storage()
        .persistent()
        .extend_ttl(&pair, TTL_THRESHOLD, TTL_EXTEND_TO);

    append_id(env, &patient_index_key(&grant.patient), &grant.request_id);
    let requester_key = requester_index_key(&grant.requester);
    append_id(env, &requester_key, &grant.request_id);

    Ok(grant)
}

fn expire_now(env: &Env, mut grant: AccessGrant) -> AccessGrant {
    grant.expires_at = env.ledger().timestamp();
    store(env, &grant);
    grant
}

/// Expires the live grant of the pair. Returns the revoked grant, or `None`
/// when there was nothing live to revoke.
pub fn revoke(
    env: &Env,
    patient: &Address,
    requester: &Address,
) -> Result<Option<AccessGrant>, ContractError> {
    let live = live_grant(env, patient, requester)?;
    Ok(live.map(|grant| expire_now(env, grant)))
}

/// Expires the grant derived from `request_id` if it belongs to `patient`
/// and is still live.
pub fn revoke_by_request(
    env: &Env,
    patient: &Address,
    request_id: &BytesN<32>,
) -> Option<AccessGrant> {
    let now = env.ledger().timestamp();
    get_grant(env, request_id)
        .filter(|grant| grant.patient == *patient && grant.is_live(now))
        .map(|grant| expire_now(env, grant))
}

fn list(
    env: &Env,
    key: &(Symbol, Address),
    query: &Query,
) -> Result<Vec<AccessGrant>, ContractError> {
    let ids: Vec<BytesN<32>> = env
        .storage()
        .persistent()
        .get(key)
        .unwrap_or(Vec::new(env));
    let mut out = Vec::new(env);
    for id in ids.iter() {
        let grant = get_grant(env, &id).ok_or(ContractError::StorageError)?;
        if query.matches(&grant) {
            out.push_back(grant);
        }
    }
    Ok(out)
}

pub fn list_for_patient(
    env: &Env,
    patient: &Address,
    query: &Query,
) -> Result<Vec<AccessGrant>, ContractError> {
    list(env, &patient_index_key(patient), query)
}

pub fn list_for_requester(
    env: &Env,
    requester: &Address,
    query: &Query,
) -> Result<Vec<AccessGrant>, ContractError> {
    list(env, &requester_index_key(requester), query)
}
