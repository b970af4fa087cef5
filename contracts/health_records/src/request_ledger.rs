use common::nonce;
use soroban_sdk::{
    contracttype, symbol_short, xdr::ToXdr, Address, BytesN, Env, IntoVal, String, Symbol, Val, Vec,
};

use crate::grant_ledger;
use crate::query::{Query, QueryField, Queryable};
use crate::ContractError;

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Lifecycle of an access request. `Accepted` and `Denied` are terminal.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RequestStatus {
    Pending = 0,
    Accepted = 1,
    Denied = 2,
}

/// A professional's solicitation to read a patient's records.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessRequest {
    pub request_id: BytesN<32>,
    pub patient: Address,
    pub patient_name: String,
    pub requester: Address,
    pub requester_name: String,
    pub description: String,
    pub status: RequestStatus,
    pub created_at: u64,
    pub status_changed_at: u64,
    pub requested_expiration: u64,
}

impl AccessRequest {
    /// A request blocks a new one for the same pair while it is pending, or
    /// accepted and the grant derived from it is still live. An accepted
    /// request whose grant is not visible falls back to its proposed window.
    pub fn is_outstanding(&self, env: &Env, now: u64) -> bool {
        match self.status {
            RequestStatus::Pending => true,
            RequestStatus::Accepted => grant_ledger::get_grant(env, &self.request_id)
                .map(|grant| grant.is_live(now))
                .unwrap_or(self.requested_expiration > now),
            RequestStatus::Denied => false,
        }
    }
}

impl Queryable for AccessRequest {
    fn field_value(&self, field: &QueryField) -> Option<u64> {
        match field {
            QueryField::Status => Some(self.status as u64),
            QueryField::CreatedAt => Some(self.created_at),
            QueryField::StatusChangedAt => Some(self.status_changed_at),
            QueryField::Expiration => Some(self.requested_expiration),
        }
    }
}

pub fn request_key(request_id: &BytesN<32>) -> (Symbol, BytesN<32>) {
    (symbol_short!("REQ"), request_id.clone())
}

/// Points at the newest request of a pair. Only that one can be
/// outstanding, since creation is refused while one is.
pub fn pair_key(patient: &Address, requester: &Address) -> (Symbol, Address, Address) {
    (symbol_short!("REQ_PAIR"), patient.clone(), requester.clone())
}

pub fn patient_index_key(patient: &Address) -> (Symbol, Address) {
    (symbol_short!("PAT_REQ"), patient.clone())
}

pub fn requester_index_key(requester: &Address) -> (Symbol, Address) {
    (symbol_short!("RQR_REQ"), requester.clone())
}

fn load_ids(env: &Env, key: &(Symbol, Address)) -> Vec<BytesN<32>> {
    env.storage()
        .persistent()
        .get(key)
        .unwrap_or(Vec::new(env))
}

fn put_and_extend<K, V>(env: &Env, key: &K, value: &V)
where
    K: IntoVal<Env, Val>,
    V: IntoVal<Env, Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn append_id(env: &Env, key: &(Symbol, Address), request_id: &BytesN<32>) {
    let mut ids = load_ids(env, key);
    ids.push_back(request_id.clone());
    put_and_extend(env, key, &ids);
}

fn load_all(env: &Env, ids: Vec<BytesN<32>>) -> Result<Vec<AccessRequest>, ContractError> {
    let mut requests = Vec::new(env);
    for id in ids.iter() {
        requests.push_back(get_request(env, &id).ok_or(ContractError::StorageError)?);
    }
    Ok(requests)
}

/// Derives a fresh request id as `sha256(xdr(patient, requester, nonce))`.
/// The nonce is the requester's creation counter, so ids minted in the same
/// ledger close stay distinct.
pub fn next_request_id(
    env: &Env,
    patient: &Address,
    requester: &Address,
) -> Result<BytesN<32>, ContractError> {
    let nonce = nonce::get_and_increment_nonce(env, requester)?;
    let preimage = (patient.clone(), requester.clone(), nonce).to_xdr(env);
    Ok(env.crypto().sha256(&preimage).into())
}

pub fn get_request(env: &Env, request_id: &BytesN<32>) -> Option<AccessRequest> {
    env.storage().persistent().get(&request_key(request_id))
}

/// Most recent request filed for the pair, if any.
pub fn latest_for_pair(
    env: &Env,
    patient: &Address,
    requester: &Address,
) -> Result<Option<AccessRequest>, ContractError> {
    let pointer: Option<BytesN<32>> = env
        .storage()
        .persistent()
        .get(&pair_key(patient, requester));
    match pointer {
        Some(id) => get_request(env, &id)
            .map(Some)
            .ok_or(ContractError::StorageError),
        None => Ok(None),
    }
}

pub fn find_pending(
    env: &Env,
    patient: &Address,
    requester: &Address,
) -> Result<Option<AccessRequest>, ContractError> {
    Ok(latest_for_pair(env, patient, requester)?
        .filter(|request| request.status == RequestStatus::Pending))
}

pub fn create_request(env: &Env, request: &AccessRequest) -> Result<(), ContractError> {
    let now = env.ledger().timestamp();
    if let Some(existing) = latest_for_pair(env, &request.patient, &request.requester)? {
        if existing.is_outstanding(env, now) {
            return Err(ContractError::DuplicateRequest);
        }
    }
    let key = request_key(&request.request_id);
    if env.storage().persistent().has(&key) {
        return Err(ContractError::DuplicateRequest);
    }

    put_and_extend(env, &key, request);
    put_and_extend(
        env,
        &pair_key(&request.patient, &request.requester),
        &request.request_id,
    );
    append_id(
        env,
        &patient_index_key(&request.patient),
        &request.request_id,
    );
    append_id(
        env,
        &requester_index_key(&request.requester),
        &request.request_id,
    );

    Ok(())
}

/// Moves a pending request to a terminal status.
pub fn update_status(
    env: &Env,
    request_id: &BytesN<32>,
    new_status: RequestStatus,
    timestamp: u64,
) -> Result<AccessRequest, ContractError> {
    let mut request = get_request(env, request_id)
        .ok_or(ContractError::RequestNotFound)?;
    if request.status != RequestStatus::Pending || new_status == RequestStatus::Pending {
        return Err(ContractError::InvalidTransition);
    }

    request.status = new_status;
    request.status_changed_at = timestamp;
    put_and_extend(env, &request_key(request_id), &request);

    Ok(request)
}

pub fn list_for_patient(
    env: &Env,
    patient: &Address,
    query: &Query,
) -> Result<Vec<AccessRequest>, ContractError> {
    let requests = load_all(env, load_ids(env, &patient_index_key(patient)))?;
    Ok(filter(env, requests, query))
}

pub fn list_for_requester(
    env: &Env,
    requester: &Address,
    query: &Query,
) -> Result<Vec<AccessRequest>, ContractError> {
    let requests = load_all(env, load_ids(env, &requester_index_key(requester)))?;
    Ok(filter(env, requests, query))
}

fn filter(env: &Env, requests: Vec<AccessRequest>, query: &Query) -> Vec<AccessRequest> {
    let mut out = Vec::new(env);
    for request in requests.iter() {
        if query.matches(&request) {
            out.push_back(request);
        }
    }
    out
}
