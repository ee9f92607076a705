/// Credential Extraction
///
/// Pulls the raw credential out of `Authorization: <scheme> <credential>`.
/// Nothing here validates the credential itself.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::CredentialError;

/// Authorization schemes the service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Access and refresh tokens
    Bearer,
    /// Shared secret of the payment webhook
    ApiKey,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Bearer => "Bearer",
            Scheme::ApiKey => "ApiKey",
        }
    }
}

/// Extract the credential for `scheme` from the request headers
///
/// The header is split on the first space only; the scheme comparison is
/// case-sensitive.
///
/// # Errors
/// - `MissingHeader` if there is no `Authorization` header
/// - `MalformedHeader` if it is not ASCII or has no credential part
/// - `WrongScheme` if the scheme is not the expected one
pub fn extract_credential(headers: &HeaderMap, scheme: Scheme) -> Result<String, CredentialError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(CredentialError::MissingHeader)?
        .to_str()
        .map_err(|_| CredentialError::MalformedHeader)?;

    let (presented, credential) = value
        .split_once(' ')
        .ok_or(CredentialError::MalformedHeader)?;

    if presented != scheme.as_str() {
        return Err(CredentialError::WrongScheme);
    }

    if credential.is_empty() {
        return Err(CredentialError::MalformedHeader);
    }

    Ok(credential.to_string())
}

/// `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<String, CredentialError> {
    extract_credential(headers, Scheme::Bearer)
}

/// `Authorization: ApiKey <key>`
pub fn api_key(headers: &HeaderMap) -> Result<String, CredentialError> {
    extract_credential(headers, Scheme::ApiKey)
}
