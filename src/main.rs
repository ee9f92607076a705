use chirpy::configuration::get_configuration;
use chirpy::startup::{run, Repositories};
use chirpy::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // A missing .env file is fine; real env vars still apply
    let _ = dotenvy::dotenv();

    // sqlx logs every statement at info
    init_telemetry("info,sqlx=warn");

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!(platform = ?config.application.platform, "Configuration loaded");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    if configuration.auth.jwt_secret.is_empty() || configuration.auth.polka_key.is_empty() {
        tracing::error!("APP_AUTH__JWT_SECRET and APP_AUTH__POLKA_KEY must be set");
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Missing auth secrets",
        ));
    }

    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
        })?;

    tracing::info!("Database ready");

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(
        listener,
        Repositories::postgres(pool),
        configuration.application,
        configuration.auth,
    )?;

    server.await
}
