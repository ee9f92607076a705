/// Session Orchestration
///
/// Composes password verification, access tokens and refresh tokens into
/// login, refresh, revoke and per-request identity resolution.

use actix_web::http::header::HeaderMap;
use chrono::Utc;
use lazy_static::lazy_static;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::auth::{
    access_token_ttl, api_key, bearer_token, generate_refresh_token, hash_password,
    issue_access_token, refresh_token_ttl, validate_access_token, verify_password, AccessToken,
    RefreshToken,
};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, DatabaseError, PasswordError};
use crate::models::{RefreshTokenRejection, User};
use crate::repository::{RefreshTokenRepository, UserRepository};

lazy_static! {
    // Verified against when the email is unknown so both login failures cost the same
    static ref DUMMY_DIGEST: String =
        hash_password("chirpy-unknown-user").unwrap_or_default();
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// Hash a password on the blocking pool
pub async fn compute_password_hash(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Verify against the stored digest, or the dummy one when the user is unknown.
/// Only called on the blocking pool: the first use builds the dummy digest.
fn verify_against(password: &str, digest: Option<&str>) -> Result<(), PasswordError> {
    match digest {
        Some(digest) => verify_password(password, digest),
        None => verify_password(password, &DUMMY_DIGEST),
    }
}

async fn check_password(password: String, digest: Option<String>) -> Result<(), AppError> {
    tokio::task::spawn_blocking(move || verify_against(&password, digest.as_deref()))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
        .map_err(AppError::from)
}

fn upstream(err: DatabaseError) -> AuthError {
    AuthError::Upstream(err.to_string())
}

/// Login, refresh, revoke and identity resolution over the repositories
pub struct SessionManager {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    settings: AuthSettings,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            settings,
        }
    }

    /// Authenticate with email and password and open a session
    ///
    /// Unknown email and wrong password both fail with
    /// `AuthError::InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = self.users.find_user_by_email(email).await.map_err(upstream)?;

        let digest = user.as_ref().map(|user| user.hashed_password.clone());
        let verified = check_password(password.to_string(), digest).await;

        let user = match (user, verified) {
            (Some(user), Ok(())) => user,
            (None, _) => {
                tracing::info!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            (Some(user), Err(AppError::Auth(AuthError::InvalidCredentials))) => {
                tracing::info!(user_id = %user.id, "Login attempt with wrong password");
                return Err(AuthError::InvalidCredentials.into());
            }
            (Some(_), Err(e)) => return Err(e),
        };

        let access_token = issue_access_token(user.id, &self.settings.jwt_secret, access_token_ttl())
            .map_err(AuthError::from)?;
        let refresh_token = generate_refresh_token()?;

        self.refresh_tokens
            .create_refresh_token(&refresh_token, user.id, Utc::now() + refresh_token_ttl())
            .await
            .map_err(upstream)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from the bearer refresh token
    ///
    /// The refresh token itself is not rotated or extended.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<AccessToken, AppError> {
        let refresh_token = RefreshToken::from_bearer(bearer_token(headers).map_err(AuthError::from)?);

        let now = Utc::now();
        let user_id = match self
            .refresh_tokens
            .find_refresh_token(&refresh_token)
            .await
            .map_err(upstream)?
        {
            Some(record) => record.active_user(now),
            None => Err(RefreshTokenRejection::Unknown),
        }
        .map_err(|rejection| {
            tracing::warn!(reason = %rejection, "Refresh token rejected");
            AuthError::InvalidRefreshToken
        })?;

        let access_token = issue_access_token(user_id, &self.settings.jwt_secret, access_token_ttl())
            .map_err(AuthError::from)?;

        tracing::info!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke the bearer refresh token
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let refresh_token = RefreshToken::from_bearer(bearer_token(headers).map_err(AuthError::from)?);

        let revoked = self
            .refresh_tokens
            .revoke_refresh_token(&refresh_token)
            .await
            .map_err(upstream)?;

        if !revoked {
            return Err(AuthError::UnknownToken.into());
        }

        tracing::info!("Refresh token revoked");
        Ok(())
    }

    /// Resolve the acting user from the bearer access token
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let access_token = AccessToken::from_bearer(bearer_token(headers)?);
        let user_id = validate_access_token(&access_token, &self.settings.jwt_secret)?;
        Ok(user_id)
    }

    /// Check the `ApiKey` credential of the payment webhook
    pub fn authorize_webhook(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let key = api_key(headers)?;
        let matches: bool = key.as_bytes().ct_eq(self.settings.polka_key.as_bytes()).into();
        if !matches {
            return Err(AuthError::InvalidApiKey);
        }
        Ok(())
    }
}
