/// Middleware module
///
/// Request logging, the static file hit counter and the
/// authenticated-user extractor.

mod authenticated_user;
mod file_server_hits;
mod request_logger;

pub use authenticated_user::AuthenticatedUser;
pub use file_server_hits::{FileServerHits, Metrics};
pub use request_logger::RequestLogger;
