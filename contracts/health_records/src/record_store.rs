use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

use crate::ContractError;

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// Immutable unit of medical data, scoped to one patient.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HealthRecord {
    pub record_id: String,
    pub patient: Address,
    pub description: String,
    /// Ledger time of the write.
    pub created_at: u64,
    /// Clinical event time as reported by the author.
    pub event_date: u64,
    pub author: Address,
    pub author_name: String,
    pub specialty: String,
    pub record_type: String,
    pub organization: String,
}

/// Caller-supplied part of a record; the contract fills in the patient,
/// author and write time.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewRecord {
    pub record_id: String,
    pub description: String,
    pub event_date: u64,
    pub author_name: String,
    pub specialty: String,
    pub record_type: String,
    pub organization: String,
}

pub fn record_key(patient: &Address, record_id: &String) -> (Symbol, Address, String) {
    (symbol_short!("HREC"), patient.clone(), record_id.clone())
}

pub fn patient_index_key(patient: &Address) -> (Symbol, Address) {
    (symbol_short!("PAT_REC"), patient.clone())
}

fn load_index(env: &Env, patient: &Address) -> Vec<String> {
    env.storage()
        .persistent()
        .get(&patient_index_key(patient))
        .unwrap_or(Vec::new(env))
}

/// Persists a record under `(patient, record_id)`. Existing records are
/// never overwritten.
pub fn put_record(env: &Env, record: &HealthRecord) -> Result<(), ContractError> {
    let key = record_key(&record.patient, &record.record_id);
    if env.storage().persistent().has(&key) {
        return Err(ContractError::DuplicateRecord);
    }

    env.storage().persistent().set(&key, record);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    let index_key = patient_index_key(&record.patient);
    let mut index = load_index(env, &record.patient);
    index.push_back(record.record_id.clone());
    env.storage().persistent().set(&index_key, &index);
    env.storage()
        .persistent()
        .extend_ttl(&index_key, TTL_THRESHOLD, TTL_EXTEND_TO);

    Ok(())
}

/// Returns every record of `patient` in write order. Callers that need
/// clinical order sort on `event_date`.
///
/// An index entry without a stored record is reported as
/// [`ContractError::StorageError`] rather than skipped.
pub fn get_history(env: &Env, patient: &Address) -> Result<Vec<HealthRecord>, ContractError> {
    let mut records = Vec::new(env);
    for record_id in load_index(env, patient).iter() {
        let record: HealthRecord = env
            .storage()
            .persistent()
            .get(&record_key(patient, &record_id))
            .ok_or(ContractError::StorageError)?;
        records.push_back(record);
    }
    Ok(records)
}

pub fn get_record_by_id(
    env: &Env,
    patient: &Address,
    record_id: &String,
) -> Result<HealthRecord, ContractError> {
    env.storage()
        .persistent()
        .get(&record_key(patient, record_id))
        .ok_or(ContractError::RecordNotFound)
}

pub fn record_count(env: &Env, patient: &Address) -> u32 {
    load_index(env, patient).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HealthRecordsContract;
    use soroban_sdk::testutils::Address as _;

    fn sample(env: &Env, patient: &Address, id: &str, event_date: u64) -> HealthRecord {
        HealthRecord {
            record_id: String::from_str(env, id),
            patient: patient.clone(),
            description: String::from_str(env, "blood panel"),
            created_at: env.ledger().timestamp(),
            event_date,
            author: Address::generate(env),
            author_name: String::from_str(env, "Dr. Ana Costa"),
            specialty: String::from_str(env, "Cardiology"),
            record_type: String::from_str(env, "LabResult"),
            organization: String::from_str(env, "Hospital São João"),
        }
    }

    #[test]
    fn test_put_then_get_returns_identical_record() {
        let env = Env::default();
        let contract_id = env.register(HealthRecordsContract, ());
        env.as_contract(&contract_id, || {
            let patient = Address::generate(&env);
            let record = sample(&env, &patient, "rec-1", 42);
            put_record(&env, &record).unwrap();

            let stored = get_record_by_id(&env, &patient, &record.record_id).unwrap();
            assert_eq!(stored, record);
        });
    }

    #[test]
    fn test_duplicate_record_rejected_and_original_kept() {
        let env = Env::default();
        let contract_id = env.register(HealthRecordsContract, ());
        env.as_contract(&contract_id, || {
            let patient = Address::generate(&env);
            let first = sample(&env, &patient, "rec-1", 1);
            put_record(&env, &first).unwrap();

            let mut second = sample(&env, &patient, "rec-1", 2);
            second.description = String::from_str(&env, "overwrite attempt");
            assert_eq!(
                put_record(&env, &second),
                Err(ContractError::DuplicateRecord)
            );

            assert_eq!(
                get_record_by_id(&env, &patient, &first.record_id).unwrap(),
                first
            );
            assert_eq!(record_count(&env, &patient), 1);
        });
    }

    #[test]
    fn test_same_record_id_is_scoped_per_patient() {
        let env = Env::default();
        let contract_id = env.register(HealthRecordsContract, ());
        env.as_contract(&contract_id, || {
            let alice = Address::generate(&env);
            let bob = Address::generate(&env);
            put_record(&env, &sample(&env, &alice, "rec-1", 1)).unwrap();
            put_record(&env, &sample(&env, &bob, "rec-1", 1)).unwrap();

            assert_eq!(get_history(&env, &alice).unwrap().len(), 1);
            assert_eq!(get_history(&env, &bob).unwrap().len(), 1);
        });
    }

    #[test]
    fn test_history_empty_for_unknown_patient() {
        let env = Env::default();
        let contract_id = env.register(HealthRecordsContract, ());
        env.as_contract(&contract_id, || {
            let patient = Address::generate(&env);
            assert_eq!(get_history(&env, &patient).unwrap().len(), 0);
            assert_eq!(
                get_record_by_id(&env, &patient, &String::from_str(&env, "missing")),
                Err(ContractError::RecordNotFound)
            );
        });
    }

    #[test]
    fn test_dangling_index_entry_is_a_storage_error() {
        let env = Env::default();
        let contract_id = env.register(HealthRecordsContract, ());
        env.as_contract(&contract_id, || {
            let patient = Address::generate(&env);
            let record = sample(&env, &patient, "rec-1", 1);
            put_record(&env, &record).unwrap();
            env.storage()
                .persistent()
                .remove(&record_key(&patient, &record.record_id));

            assert_eq!(
                get_history(&env, &patient),
                Err(ContractError::StorageError)
            );
        });
    }
}
