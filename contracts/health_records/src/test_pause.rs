#![cfg(test)]

use crate::{
    circuit_breaker::PauseScope, AccessRequestInput, ContractError, Decision,
    HealthRecordsContract, HealthRecordsContractClient, NewRecord, FN_ADD_RECORD,
    FN_ANSWER_REQUEST,
};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    Address, Env, String,
};

const NOW: u64 = 1_700_000_000;

fn setup_test() -> (Env, HealthRecordsContractClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(NOW);

    let contract_id = env.register(HealthRecordsContract, ());
    let client = HealthRecordsContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.initialize(&admin);

    (env, client, admin)
}

fn request(env: &Env) -> AccessRequestInput {
    AccessRequestInput {
        patient_name: String::from_str(env, "Pat"),
        requester_name: String::from_str(env, "Doc"),
        description: String::from_str(env, "follow-up"),
        proposed_expiration: NOW + 86_400,
    }
}

fn record(env: &Env, record_id: &str) -> NewRecord {
    NewRecord {
        record_id: String::from_str(env, record_id),
        description: String::from_str(env, "note"),
        event_date: NOW,
        author_name: String::from_str(env, "Doc"),
        specialty: String::from_str(env, "General"),
        record_type: String::from_str(env, "Note"),
        organization: String::from_str(env, "Clinic"),
    }
}

#[test]
fn test_global_pause() {
    let (env, client, admin) = setup_test();

    let patient = Address::generate(&env);
    let doctor = Address::generate(&env);

    // Admin pauses globally
    client.pause_contract(&admin, &PauseScope::Global);
    assert!(client.is_paused(&PauseScope::Global));

    let res = client.try_request_access(&doctor, &patient, &request(&env));
    assert_eq!(res.unwrap_err().unwrap(), ContractError::Paused);

    // Global pause covers every function scope
    assert!(client.is_paused(&PauseScope::Function(FN_ADD_RECORD)));

    client.resume_contract(&admin, &PauseScope::Global);

    // Should now succeed
    client.request_access(&doctor, &patient, &request(&env));
}

#[test]
fn test_granular_pause() {
    let (env, client, admin) = setup_test();

    let patient = Address::generate(&env);
    let doctor = Address::generate(&env);

    let request_id = client.request_access(&doctor, &patient, &request(&env));
    client.answer_request(&patient, &request_id, &Decision::Accept, &None);

    // Admin pauses ONLY `ADD_REC`
    let add_rec_scope = PauseScope::Function(FN_ADD_RECORD);
    client.pause_contract(&admin, &add_rec_scope);

    let res = client.try_add_record(&doctor, &patient, &record(&env, "r1"));
    assert_eq!(res.unwrap_err().unwrap(), ContractError::Paused);

    // Reads and other writes are unaffected
    assert_eq!(client.get_history(&doctor, &patient).len(), 0);
    assert!(!client.is_paused(&PauseScope::Function(FN_ANSWER_REQUEST)));
    assert!(client.revoke_access(&patient, &doctor));

    client.resume_contract(&admin, &add_rec_scope);
    client.add_record(&patient, &patient, &record(&env, "r1"));
    assert_eq!(client.get_record_count(&patient), 1);
}

#[test]
fn test_pause_requires_admin() {
    let (env, client, _admin) = setup_test();

    let intruder = Address::generate(&env);
    let res = client.try_pause_contract(&intruder, &PauseScope::Global);
    assert_eq!(res.unwrap_err().unwrap(), ContractError::Unauthorized);
    assert!(!client.is_paused(&PauseScope::Global));

    let res = client.try_resume_contract(&intruder, &PauseScope::Global);
    assert_eq!(res.unwrap_err().unwrap(), ContractError::Unauthorized);
}

#[test]
fn test_pause_before_initialize() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(HealthRecordsContract, ());
    let client = HealthRecordsContractClient::new(&env, &contract_id);

    let someone = Address::generate(&env);
    let res = client.try_pause_contract(&someone, &PauseScope::Global);
    assert_eq!(res.unwrap_err().unwrap(), ContractError::NotInitialized);
}
