/// JWT Token Generation and Validation
///
/// Access tokens are HS256 JWTs keyed by the shared signing secret.
/// They are never persisted: validity is signature + expiry + issuer.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::error::TokenError;

const ACCESS_TOKEN_TTL_SECONDS: i64 = 60 * 60;

/// Lifetime of every access token
pub fn access_token_ttl() -> Duration {
    Duration::seconds(ACCESS_TOKEN_TTL_SECONDS)
}

/// A signed, stateless access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw bearer credential that is expected to be an access token
    pub fn from_bearer(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issue a new access token for a user
///
/// # Arguments
/// * `user_id` - User's UUID, stored as the subject
/// * `secret` - HMAC signing secret
/// * `validity` - How long the token stays valid
///
/// # Errors
/// Returns `TokenError::Signing` if encoding fails
pub fn issue_access_token(
    user_id: Uuid,
    secret: &str,
    validity: Duration,
) -> Result<AccessToken, TokenError> {
    let claims = Claims::new(user_id, validity);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map(AccessToken)
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Validate an access token and return the user it was issued to
///
/// Checks structure, signature, expiry (no leeway), issuer and subject,
/// in that order.
pub fn validate_access_token(token: &AccessToken, secret: &str) -> Result<Uuid, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let claims = decode::<Claims>(
        token.as_str(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidIssuer => TokenError::WrongIssuer,
        _ => {
            tracing::debug!("Rejected structurally invalid JWT: {}", e);
            TokenError::Malformed
        }
    })?;

    claims.user_id()
}
