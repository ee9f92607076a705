/// Password Hashing and Verification
///
/// bcrypt at the library's default cost. The salt is generated per call
/// and embedded in the digest, so nothing else needs to be stored.
///
/// bcrypt only reads the first 72 bytes of its input. Longer passwords are
/// refused on both paths so two passwords sharing a 72-byte prefix never
/// verify against each other.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::PasswordError;

/// Longest password bcrypt hashes without truncation
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password using bcrypt
///
/// # Errors
/// - `PasswordError::TooLong` for passwords over `MAX_PASSWORD_BYTES`
/// - `PasswordError::Hashing` if the computation itself fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::TooLong(MAX_PASSWORD_BYTES));
    }
    hash(password, DEFAULT_COST).map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Verify a password against its bcrypt digest
///
/// # Errors
/// Returns `PasswordError::Mismatch` when the password does not reproduce
/// the digest, or when the digest cannot be parsed at all
pub fn verify_password(password: &str, digest: &str) -> Result<(), PasswordError> {
    // No stored digest was made from more than 72 bytes
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::Mismatch);
    }

    match verify(password, digest) {
        Ok(true) => Ok(()),
        Ok(false) => Err(PasswordError::Mismatch),
        Err(e) => {
            tracing::warn!("Stored password digest could not be verified: {}", e);
            Err(PasswordError::Mismatch)
        }
    }
}
