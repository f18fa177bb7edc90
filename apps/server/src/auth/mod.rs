//! Session authentication: HS256 JWT carried in an HttpOnly cookie or a bearer header.

mod extractor;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::error::{AppError, AppResult};
use crate::models::SessionClaims;

pub use extractor::AuthUser;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "jobtrack_session";
/// Session JWT issuer.
pub const SESSION_ISSUER: &str = "jobtrack";

pub fn create_session_token(user_id: Uuid, settings: &SessionSettings) -> AppResult<String> {
    let now = chrono::Utc::now();
    let exp = now + chrono::Duration::seconds(settings.ttl_secs as i64);

    let claims = SessionClaims {
        sub: user_id.to_string(),
        iss: SESSION_ISSUER.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let key = EncodingKey::from_secret(settings.secret.expose_secret().as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))
}

/// Verify a session JWT and return the user id it was issued for.
pub fn verify_session_token(token: &str, secret: &SecretString) -> AppResult<Uuid> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_aud = false;

    let token_data = decode::<SessionClaims>(token, &key, &validation)
        .map_err(|e| AppError::Unauthorized(format!("Invalid session token: {}", e)))?;

    Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid session token".to_string()))
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: String, settings: &SessionSettings, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie.set_max_age(CookieDuration::seconds(settings.ttl_secs as i64));
    cookie
}

/// Expired cookie that makes the browser drop the session.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie.set_max_age(CookieDuration::ZERO);
    cookie
}
