//! Password hashing policy and login/timezone shape validation.

use crate::domain::error::DomainError;
use crate::domain::timezone;

pub const MIN_PASSWORD_LENGTH: usize = 5;
/// Width of the password column; a bcrypt hash is exactly this long.
pub const MAX_HASH_LENGTH: usize = 60;
pub const MIN_LOGIN_LENGTH: usize = 3;
pub const MAX_LOGIN_LENGTH: usize = 30;

/// Reject passwords that are too short to be hashed.
pub fn validate_password(plain: &str) -> Result<(), DomainError> {
    if plain.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::password_too_short(MIN_PASSWORD_LENGTH));
    }
    Ok(())
}

/// Salted bcrypt hash of `plain` at the given cost.
pub fn hash_password(plain: &str, cost: u32) -> Result<String, DomainError> {
    validate_password(plain)?;

    let hashed = bcrypt::hash(plain, cost)
        .map_err(|e| DomainError::unexpected(format!("failed to hash password: {e}")))?;
    if hashed.len() > MAX_HASH_LENGTH {
        return Err(DomainError::unexpected("failed to hash password"));
    }
    Ok(hashed)
}

/// Check `plain` against a stored hash. Mismatches and malformed hashes look the same.
pub fn verify_password(hash: &str, plain: &str) -> Result<(), DomainError> {
    match bcrypt::verify(plain, hash) {
        Ok(true) => Ok(()),
        _ => Err(DomainError::incorrect_credentials()),
    }
}

/// Login length is measured in Unicode code points.
pub fn validate_login(login: &str) -> Result<(), DomainError> {
    let len = login.chars().count();
    if !(MIN_LOGIN_LENGTH..=MAX_LOGIN_LENGTH).contains(&len) {
        return Err(DomainError::invalid_login_length(
            MIN_LOGIN_LENGTH,
            MAX_LOGIN_LENGTH,
        ));
    }
    Ok(())
}

pub fn validate_timezone(name: &str) -> Result<(), DomainError> {
    timezone::parse_zone(name)
        .map(|_| ())
        .map_err(|_| DomainError::invalid_timezone(name))
}

/// Runs the bcrypt work on the blocking pool so request threads stay responsive.
#[derive(Debug, Clone, Copy)]
pub struct CredentialManager {
    cost: u32,
}

impl Default for CredentialManager {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl CredentialManager {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, plain: String) -> Result<String, DomainError> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash_password(&plain, cost))
            .await
            .map_err(|e| DomainError::unexpected(format!("hashing task failed: {e}")))?
    }

    pub async fn verify(&self, hash: String, plain: String) -> Result<(), DomainError> {
        tokio::task::spawn_blocking(move || verify_password(&hash, &plain))
            .await
            .map_err(|e| DomainError::unexpected(format!("verification task failed: {e}")))?
    }
}
