//! Actix-web extractor resolving the calling user from the session token.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use std::future::{Ready, ready};
use uuid::Uuid;

use super::{SESSION_COOKIE, verify_session_token};
use crate::config::Config;
use crate::error::AppError;

/// The authenticated caller.
///
/// Handlers that take an `AuthUser` reject the request with 401 before they
/// run when no valid session is presented. The cookie wins over an
/// `Authorization: Bearer` header when both are present.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(config) = req.app_data::<web::Data<Config>>() else {
            return ready(Err(AppError::Internal(
                "Config missing from app data".to_string(),
            )));
        };

        let Some(token) = session_token(req) else {
            return ready(Err(AppError::Unauthorized(
                "Authentication required".to_string(),
            )));
        };

        ready(
            verify_session_token(&token, &config.session.secret).map(|user_id| AuthUser { user_id }),
        )
    }
}
