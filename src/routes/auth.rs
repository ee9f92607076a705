/// Authentication Routes
///
/// Handles login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AccessToken, RefreshToken};
use crate::error::AppError;
use crate::models::UserResponse;
use crate::session::SessionManager;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User profile plus both session tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// Fresh access token
#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: AccessToken,
}

/// POST /api/login
///
/// Authenticate with email and password.
/// Returns the user profile, a 1-hour access token and a 60-day refresh token.
///
/// # Errors
/// - 401: Unknown email or wrong password (same message for both)
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let session = sessions.login(form.email.trim(), &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from(&session.user),
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Mint a new access token. Requires `Authorization: Bearer <refresh token>`.
/// The refresh token is not rotated.
///
/// # Errors
/// - 401: Missing header, or unknown, revoked or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let token = sessions.refresh(req.headers()).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Revoke the refresh token in `Authorization: Bearer <refresh token>`.
///
/// # Errors
/// - 401: Missing header or unknown refresh token
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    sessions.revoke(req.headers()).await?;

    Ok(HttpResponse::NoContent().finish())
}
