use soroban_sdk::String;

use crate::ContractError;

const MIN_NAME_LEN: u32 = 2;
const MAX_NAME_LEN: u32 = 64;

const MIN_ID_LEN: u32 = 1;
const MAX_ID_LEN: u32 = 64;

const MIN_TEXT_LEN: u32 = 1;
const MAX_TEXT_LEN: u32 = 512;

pub const MIN_GRANT_SECONDS: u64 = 3600; // 1 hour
pub const MAX_GRANT_SECONDS: u64 = 157_680_000; // 5 years

/// Copies a Soroban string into `buf` and checks every byte with `accept`.
/// Fails when the length falls outside `min..=max`.
fn check_bytes(
    value: &String,
    min: u32,
    max: u32,
    buf: &mut [u8],
    accept: fn(u8) -> bool,
) -> Result<(), ContractError> {
    let len = value.len();
    if !(min..=max).contains(&len) || len as usize > buf.len() {
        return Err(ContractError::InvalidInput);
    }

    let bytes = &mut buf[..len as usize];
    value.copy_into_slice(bytes);

    if bytes.iter().all(|&b| accept(b)) {
        Ok(())
    } else {
        Err(ContractError::InvalidInput)
    }
}

/// Validate a person or organization name.
/// Printable ASCII and multi-byte UTF-8 sequences are accepted, so names
/// like "João Conceição" pass. The length bound counts bytes.
pub fn validate_name(name: &String) -> Result<(), ContractError> {
    let mut buf = [0u8; MAX_NAME_LEN as usize];
    check_bytes(name, MIN_NAME_LEN, MAX_NAME_LEN, &mut buf, |b| {
        (32..=126).contains(&b) || b >= 0x80
    })
}

/// Validate a caller-supplied record identifier.
/// Identifiers become part of storage keys, so they are restricted to
/// `[A-Za-z0-9_.:-]`.
pub fn validate_record_id(id: &String) -> Result<(), ContractError> {
    let mut buf = [0u8; MAX_ID_LEN as usize];
    check_bytes(id, MIN_ID_LEN, MAX_ID_LEN, &mut buf, |b| {
        b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':')
    })
}

/// Validate free text such as descriptions, specialties and record types.
/// UTF-8 continuation bytes are allowed; ASCII control characters are not.
pub fn validate_text(text: &String) -> Result<(), ContractError> {
    let mut buf = [0u8; MAX_TEXT_LEN as usize];
    check_bytes(text, MIN_TEXT_LEN, MAX_TEXT_LEN, &mut buf, |b| {
        b >= 32 && b != 127
    })
}

/// Validate an absolute grant expiration against the current ledger time.
/// The resulting lifetime must be at least an hour and at most five years.
pub fn validate_expiration(now: u64, expires_at: u64) -> Result<(), ContractError> {
    if expires_at <= now {
        return Err(ContractError::InvalidExpiration);
    }
    let lifetime = expires_at.saturating_sub(now);
    if !(MIN_GRANT_SECONDS..=MAX_GRANT_SECONDS).contains(&lifetime) {
        return Err(ContractError::InvalidExpiration);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use soroban_sdk::Env;

    #[test]
    fn test_validate_name() {
        let env = Env::default();

        assert_eq!(
            validate_name(&String::from_str(&env, "Dr. Ana Costa")),
            Ok(())
        );
        assert_eq!(
            validate_name(&String::from_str(&env, "João Conceição")),
            Ok(())
        );
        assert_eq!(
            validate_name(&String::from_str(&env, "Hospital São João")),
            Ok(())
        );

        // Too short
        assert_eq!(
            validate_name(&String::from_str(&env, "A")),
            Err(ContractError::InvalidInput)
        );

        // Too long
        let long_name = "A".repeat(65);
        assert_eq!(
            validate_name(&String::from_str(&env, &long_name)),
            Err(ContractError::InvalidInput)
        );

        // Non-printable
        assert_eq!(
            validate_name(&String::from_str(&env, "Ana\nCosta")),
            Err(ContractError::InvalidInput)
        );
        assert_eq!(
            validate_name(&String::from_str(&env, "Ana\u{7f}Costa")),
            Err(ContractError::InvalidInput)
        );

        // The bound counts bytes: 32 two-byte characters fill it exactly
        let accented = "ã".repeat(32);
        assert_eq!(
            validate_name(&String::from_str(&env, &accented)),
            Ok(())
        );
        let too_long = "ã".repeat(33);
        assert_eq!(
            validate_name(&String::from_str(&env, &too_long)),
            Err(ContractError::InvalidInput)
        );
    }

    #[test]
    fn test_validate_record_id() {
        let env = Env::default();

        assert_eq!(
            validate_record_id(&String::from_str(&env, "rec-2024.01:7")),
            Ok(())
        );
        assert_eq!(
            validate_record_id(&String::from_str(&env, "")),
            Err(ContractError::InvalidInput)
        );
        assert_eq!(
            validate_record_id(&String::from_str(&env, "rec 1")),
            Err(ContractError::InvalidInput)
        );
        assert_eq!(
            validate_record_id(&String::from_str(&env, "rec/../1")),
            Err(ContractError::InvalidInput)
        );
        let long_id = "r".repeat(65);
        assert_eq!(
            validate_record_id(&String::from_str(&env, &long_id)),
            Err(ContractError::InvalidInput)
        );
    }

    #[test]
    fn test_validate_text() {
        let env = Env::default();

        assert_eq!(
            validate_text(&String::from_str(&env, "annual checkup")),
            Ok(())
        );
        assert_eq!(
            validate_text(&String::from_str(&env, "consulta de rotina, cardiologia")),
            Ok(())
        );
        assert_eq!(validate_text(&String::from_str(&env, "avaliação")), Ok(()));
        assert_eq!(
            validate_text(&String::from_str(&env, "")),
            Err(ContractError::InvalidInput)
        );
        assert_eq!(
            validate_text(&String::from_str(&env, "tab\there")),
            Err(ContractError::InvalidInput)
        );
        let long_text = "x".repeat(513);
        assert_eq!(
            validate_text(&String::from_str(&env, &long_text)),
            Err(ContractError::InvalidInput)
        );
    }

    #[test]
    fn test_validate_expiration() {
        let now = 1_000_000;

        assert_eq!(validate_expiration(now, now + 3600), Ok(()));
        assert_eq!(validate_expiration(now, now + 30 * 86_400), Ok(()));
        assert_eq!(validate_expiration(now, now + MAX_GRANT_SECONDS), Ok(()));

        // Already passed or exactly now
        assert_eq!(
            validate_expiration(now, now),
            Err(ContractError::InvalidExpiration)
        );
        assert_eq!(
            validate_expiration(now, now - 1),
            Err(ContractError::InvalidExpiration)
        );

        // Lifetime out of range
        assert_eq!(
            validate_expiration(now, now + 3599),
            Err(ContractError::InvalidExpiration)
        );
        assert_eq!(
            validate_expiration(now, now + MAX_GRANT_SECONDS + 1),
            Err(ContractError::InvalidExpiration)
        );
    }
}
