use common::CommonError;
use soroban_sdk::{contracterror, contracttype, log, Address, Env, String};

use crate::events;

/// Error categories for classifying different types of errors
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Validation errors: invalid input parameters or format errors
    Validation = 1,
    /// Authorization errors: missing or expired access grants
    Authorization = 2,
    /// Not found errors: resource lookup failures
    NotFound = 3,
    /// State conflict errors: duplicates and illegal state transitions
    StateConflict = 4,
    /// Storage errors: inconsistent or unreadable ledger state
    Storage = 5,
    /// System errors: contract-level issues like pausing
    System = 6,
}

/// Error severity levels indicating the impact and urgency of errors
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorSeverity {
    /// Low severity: caller mistakes, informational
    Low = 1,
    /// Medium severity: rejected access or conflicting workflow calls
    Medium = 2,
    /// High severity: storage inconsistencies requiring attention
    High = 3,
    /// Critical severity: system-level halts
    Critical = 4,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ErrorContext {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub message: String,
    pub user: Option<Address>,
    pub resource_id: Option<String>,
    pub timestamp: u64,
    pub retryable: bool,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    AccessDenied = 4,
    RecordNotFound = 5,
    RequestNotFound = 6,
    InvalidInput = 7,
    InvalidExpiration = 8,
    DuplicateRecord = 9,
    DuplicateRequest = 10,
    GrantAlreadyExists = 11,
    InvalidTransition = 12,
    Paused = 13,
    StorageError = 14,
    NonceOverflow = 15,
}

impl ContractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContractError::NotInitialized
            | ContractError::AlreadyInitialized
            | ContractError::InvalidInput
            | ContractError::InvalidExpiration => ErrorCategory::Validation,
            ContractError::Unauthorized | ContractError::AccessDenied => {
                ErrorCategory::Authorization
            }
            ContractError::RecordNotFound | ContractError::RequestNotFound => {
                ErrorCategory::NotFound
            }
            ContractError::DuplicateRecord
            | ContractError::DuplicateRequest
            | ContractError::GrantAlreadyExists
            | ContractError::InvalidTransition => ErrorCategory::StateConflict,
            ContractError::StorageError | ContractError::NonceOverflow => ErrorCategory::Storage,
            ContractError::Paused => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ContractError::NotInitialized
            | ContractError::AlreadyInitialized
            | ContractError::InvalidInput
            | ContractError::InvalidExpiration
            | ContractError::RecordNotFound
            | ContractError::RequestNotFound
            | ContractError::DuplicateRecord => ErrorSeverity::Low,
            ContractError::Unauthorized
            | ContractError::AccessDenied
            | ContractError::DuplicateRequest
            | ContractError::InvalidTransition => ErrorSeverity::Medium,
            ContractError::GrantAlreadyExists
            | ContractError::StorageError
            | ContractError::NonceOverflow => ErrorSeverity::High,
            ContractError::Paused => ErrorSeverity::Critical,
        }
    }

    /// Nothing is retried inside the contract; this only tells the host
    /// whether resubmitting the same call could succeed.
    pub fn retryable(&self) -> bool {
        matches!(self, ContractError::Paused | ContractError::StorageError)
    }

    pub fn message(&self) -> &'static str {
        match self {
            ContractError::NotInitialized => "Contract has not been initialized",
            ContractError::AlreadyInitialized => "Contract is already initialized",
            ContractError::Unauthorized => "Caller is not authorized for this operation",
            ContractError::AccessDenied => "No live access grant for this patient",
            ContractError::RecordNotFound => "Health record not found",
            ContractError::RequestNotFound => "Access request not found",
            ContractError::InvalidInput => "Invalid input parameters provided",
            ContractError::InvalidExpiration => "Expiration is in the past or out of range",
            ContractError::DuplicateRecord => "Record with this ID already exists",
            ContractError::DuplicateRequest => "Outstanding request or live grant already exists",
            ContractError::GrantAlreadyExists => "A live grant already exists for this pair",
            ContractError::InvalidTransition => "Request has already been answered",
            ContractError::Paused => "Contract operations are currently paused",
            ContractError::StorageError => "Stored ledger state is inconsistent",
            ContractError::NonceOverflow => "Request nonce space exhausted",
        }
    }
}

impl From<CommonError> for ContractError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::NonceOverflow => ContractError::NonceOverflow,
        }
    }
}

/// Creates an ErrorContext from an error and optional user/resource information.
pub fn create_error_context(
    env: &Env,
    error: ContractError,
    user: Option<Address>,
    resource_id: Option<String>,
) -> ErrorContext {
    ErrorContext {
        category: error.category(),
        severity: error.severity(),
        message: String::from_str(env, error.message()),
        user,
        resource_id,
        timestamp: env.ledger().timestamp(),
        retryable: error.retryable(),
    }
}

/// Writes a diagnostic log line and publishes an `ERROR` event for `error`,
/// then hands the error back so call sites can `return Err(report(..))`.
pub fn report(
    env: &Env,
    error: ContractError,
    user: Option<Address>,
    resource: &str,
) -> ContractError {
    log!(env, "contract error", error as u32);
    let context = create_error_context(env, error, user, Some(String::from_str(env, resource)));
    events::publish_error(env, error as u32, context);
    error
}
