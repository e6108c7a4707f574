//! Password hashing for user rows.
//!
//! Hashes are argon2 PHC strings with a random salt, so the same password
//! never hashes to the same string twice.

use argon2::{
    Argon2,
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::{LedgerError, ResultLedger};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Hash `password` for storage.
pub fn hash_password(password: &str) -> ResultLedger<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(LedgerError::InvalidArgument(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| LedgerError::internal(format!("password hashing failed: {err}")))
}

/// Whether `password` matches the stored `hashed_password`.
pub fn check_password(password: &str, hashed_password: &str) -> ResultLedger<bool> {
    let parsed = PasswordHash::new(hashed_password)
        .map_err(|err| LedgerError::internal(format!("stored password hash is invalid: {err}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(LedgerError::internal(format!(
            "password verification failed: {err}"
        ))),
    }
}
