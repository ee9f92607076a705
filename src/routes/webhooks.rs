use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, ValidationError};
use crate::repository::UserRepository;
use crate::session::SessionManager;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct PolkaWebhook {
    pub event: String,
    #[serde(default)]
    pub data: Option<PolkaWebhookData>,
}

#[derive(Deserialize)]
pub struct PolkaWebhookData {
    pub user_id: Uuid,
}

/// POST /api/polka/webhooks
///
/// Payment provider callback. Requires `Authorization: ApiKey <key>`.
/// Events other than `user.upgraded` are acknowledged and ignored.
///
/// # Errors
/// - 400: `user.upgraded` without a user id
/// - 401: Missing or wrong API key
/// - 404: Unknown user
pub async fn polka_webhook(
    req: HttpRequest,
    payload: web::Json<PolkaWebhook>,
    sessions: web::Data<SessionManager>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    sessions.authorize_webhook(req.headers())?;

    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = payload
        .data
        .as_ref()
        .map(|data| data.user_id)
        .ok_or_else(|| ValidationError::EmptyField("data.user_id".to_string()))?;

    if !users.upgrade_to_chirpy_red(user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user_id, "User upgraded to Chirpy Red");
    Ok(HttpResponse::NoContent().finish())
}
