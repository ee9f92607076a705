/// Chirp Routes
///
/// Creation and deletion require an access token; reads are public.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::models::SortOrder;
use crate::repository::ChirpRepository;
use crate::validators::validate_chirp_body;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ChirpQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat(field.to_string()).into())
}

/// POST /api/chirps
pub async fn create_chirp(
    user: AuthenticatedUser,
    form: web::Json<CreateChirpRequest>,
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    let body = validate_chirp_body(&form.body)?;

    let chirp = chirps.create_chirp(user.id(), &body).await?;

    tracing::info!(user_id = %user.id(), chirp_id = %chirp.id, "Chirp created");
    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
pub async fn list_chirps(
    query: web::Query<ChirpQuery>,
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    let author_id = match query.author_id.as_deref() {
        Some(raw) if !raw.is_empty() => Some(parse_id(raw, "author_id")?),
        _ => None,
    };
    let order = SortOrder::parse(query.sort.as_deref());

    let listed = chirps.list_chirps(author_id, order).await?;

    Ok(HttpResponse::Ok().json(listed))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_id(&path, "chirp ID")?;

    let chirp = chirps
        .find_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 401: Missing or invalid access token
/// - 403: Chirp belongs to another user
/// - 404: No such chirp
pub async fn delete_chirp(
    user: AuthenticatedUser,
    path: web::Path<String>,
    chirps: web::Data<dyn ChirpRepository>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_id(&path, "chirp ID")?;

    let chirp = chirps
        .find_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp not found".to_string()))?;

    if chirp.user_id != user.id() {
        return Err(AppError::Forbidden(
            "You can only delete your own chirps".to_string(),
        ));
    }

    if !chirps.delete_chirp(chirp_id).await? {
        return Err(AppError::NotFound("Chirp not found".to_string()));
    }

    tracing::info!(user_id = %user.id(), chirp_id = %chirp_id, "Chirp deleted");
    Ok(HttpResponse::NoContent().finish())
}
