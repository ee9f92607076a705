use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{error::InternalError, web, App, HttpResponse, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::{ApplicationSettings, AuthSettings};
use crate::error::{AppError, ErrorHandler, ValidationError};
use crate::middleware::{FileServerHits, Metrics, RequestLogger};
use crate::repository::{ChirpRepository, PgRepository, RefreshTokenRepository, UserRepository};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, reset, revoke, update_user,
};
use crate::session::SessionManager;

/// Storage backends the server runs against
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub chirps: Arc<dyn ChirpRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        let repository = Arc::new(PgRepository::new(pool));
        Self {
            users: repository.clone(),
            refresh_tokens: repository.clone(),
            chirps: repository,
        }
    }
}

/// Malformed JSON bodies get the same `{"error": ...}` shape as every other failure
fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::debug!("Rejected request body: {}", err);
    let app_error = AppError::Validation(ValidationError::InvalidFormat("request body".to_string()));
    let (status, body) = <AppError as ErrorHandler>::error_response(&app_error);
    InternalError::from_response(err, HttpResponse::build(status).json(body)).into()
}

pub fn run(
    listener: TcpListener,
    repositories: Repositories,
    application: ApplicationSettings,
    auth: AuthSettings,
) -> Result<Server, std::io::Error> {
    let sessions = web::Data::new(SessionManager::new(
        repositories.users.clone(),
        repositories.refresh_tokens.clone(),
        auth,
    ));
    let users: web::Data<dyn UserRepository> = web::Data::from(repositories.users);
    let chirps: web::Data<dyn ChirpRepository> = web::Data::from(repositories.chirps);
    let metrics_data = web::Data::new(Metrics::default());
    let static_dir = application.static_dir.clone();
    let application = web::Data::new(application);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Shared state
            .app_data(sessions.clone())
            .app_data(users.clone())
            .app_data(chirps.clone())
            .app_data(metrics_data.clone())
            .app_data(application.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .service(
                        web::resource("/users")
                            .route(web::post().to(create_user))
                            .route(web::put().to(update_user)),
                    )
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .service(
                        web::resource("/chirps")
                            .route(web::post().to(create_chirp))
                            .route(web::get().to(list_chirps)),
                    )
                    .service(
                        web::resource("/chirps/{chirp_id}")
                            .route(web::get().to(get_chirp))
                            .route(web::delete().to(delete_chirp)),
                    )
                    .route("/polka/webhooks", web::post().to(polka_webhook)),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(metrics))
                    .route("/reset", web::post().to(reset)),
            )
            // Static files, counted by the hit metric
            .service(
                web::scope("/app")
                    .wrap(FileServerHits::new(metrics_data.clone()))
                    .service(fs::Files::new("/", static_dir.clone()).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
