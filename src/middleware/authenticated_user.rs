/// Authenticated user extractor
///
/// Resolves the acting user from `Authorization: Bearer <access token>`.
/// Handlers that take an `AuthenticatedUser` argument are protected: a
/// missing, malformed, expired or forged token is answered with 401
/// before the handler runs.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<SessionManager>>() {
            Some(sessions) => sessions
                .authenticate(req.headers())
                .map(AuthenticatedUser)
                .map_err(|e| {
                    tracing::debug!(path = %req.path(), "Access token rejected: {}", e);
                    AppError::from(e)
                }),
            None => Err(AppError::Internal(
                "SessionManager missing from app data".to_string(),
            )),
        };

        ready(result)
    }
}
