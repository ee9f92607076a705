/// Refresh Token Generation
///
/// Refresh tokens are opaque: 32 bytes from the OS CSPRNG, hex-encoded.
/// Owner, expiry and revocation live only in the `refresh_tokens` table
/// and are looked up by exact string match.

use chrono::Duration;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use std::fmt;

use crate::error::EntropyError;

const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// Lifetime of a refresh token from the moment it is issued
pub fn refresh_token_ttl() -> Duration {
    Duration::days(REFRESH_TOKEN_TTL_DAYS)
}

const REFRESH_TOKEN_BYTES: usize = 32;

/// An opaque, persisted, revocable refresh token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Wrap a raw bearer credential that is expected to be a refresh token
    pub fn from_bearer(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generate a new cryptographically secure refresh token
///
/// # Errors
/// Returns `EntropyError` if the OS random source cannot be read
pub fn generate_refresh_token() -> Result<RefreshToken, EntropyError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| EntropyError(e.to_string()))?;

    Ok(RefreshToken(hex::encode(bytes)))
}
