/// Authentication module
///
/// Password hashing, access token issue/validation, refresh token
/// generation and Authorization header parsing.

mod claims;
mod credentials;
mod jwt;
mod password;
mod refresh_token;

pub use claims::{Claims, ISSUER};
pub use credentials::{api_key, bearer_token, extract_credential, Scheme};
pub use jwt::{access_token_ttl, issue_access_token, validate_access_token, AccessToken};
pub use password::{hash_password, verify_password, MAX_PASSWORD_BYTES};
pub use refresh_token::{generate_refresh_token, refresh_token_ttl, RefreshToken};
