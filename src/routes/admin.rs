use actix_web::{web, HttpResponse};

use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::middleware::Metrics;
use crate::repository::UserRepository;

/// GET /admin/metrics
pub async fn metrics(metrics: web::Data<Metrics>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<html><body><h1>Welcome, Chirpy Admin</h1><p>Chirpy has been visited {} times!</p></body></html>",
            metrics.file_server_hits()
        ))
}

/// POST /admin/reset
///
/// Zero the hit counter and delete every user. Only on the `dev` platform.
///
/// # Errors
/// - 403: Not running on the `dev` platform
pub async fn reset(
    settings: web::Data<ApplicationSettings>,
    metrics: web::Data<Metrics>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    if !settings.platform.is_dev() {
        return Err(AppError::Forbidden(
            "Only allowed in dev environment.".to_string(),
        ));
    }

    metrics.reset();
    users.delete_all_users().await?;

    tracing::warn!("Hit counter and database reset");
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0 and database reset to initial state."))
}
