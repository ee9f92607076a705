use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::MAX_PASSWORD_BYTES;
use crate::error::{AppError, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::models::UserResponse;
use crate::repository::UserRepository;
use crate::session::compute_password_hash;
use crate::validators::is_valid_email;

/// Body of both user creation and update
#[derive(Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub password: String,
}

fn validate_user_request(form: &UserRequest) -> Result<String, AppError> {
    let email = is_valid_email(&form.email)?;
    if form.password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()).into());
    }
    if form.password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES).into());
    }
    Ok(email)
}

/// POST /api/users
///
/// # Errors
/// - 400: Invalid email, or empty or over-long password
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<UserRequest>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let email = validate_user_request(&form)?;
    let hashed_password = compute_password_hash(form.into_inner().password).await?;

    let user = users.create_user(&email, &hashed_password).await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// PUT /api/users
///
/// Replace the authenticated user's email and password.
///
/// # Errors
/// - 400: Invalid email, or empty or over-long password
/// - 401: Missing or invalid access token
/// - 409: Email already taken by another user
pub async fn update_user(
    user: AuthenticatedUser,
    form: web::Json<UserRequest>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let email = validate_user_request(&form)?;
    let hashed_password = compute_password_hash(form.into_inner().password).await?;

    let updated = users
        .update_user(user.id(), &email, &hashed_password)
        .await?;

    tracing::info!(user_id = %updated.id, "User updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(&updated)))
}
