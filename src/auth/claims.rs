/// JWT Claims structure
///
/// Registered claims only (RFC 7519). The payload is base64 plaintext,
/// so nothing secret ever goes in here.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

/// Issuer stamped into and required from every access token
pub const ISSUER: &str = "chirpy";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as hyphenated UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp, UTC)
    pub iat: i64,
    /// Expiration time (Unix timestamp, UTC)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `user_id` valid for `validity` from now
    pub fn new(user_id: Uuid, validity: Duration) -> Self {
        let now = Utc::now();
        Self {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
        }
    }

    /// Parse the subject back into a user ID
    ///
    /// # Errors
    /// Returns `TokenError::MalformedSubject` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::MalformedSubject)
    }
}
