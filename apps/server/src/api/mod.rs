//! API endpoint modules.

pub mod auth;
pub mod documents;
pub mod health;
pub mod jobs;
pub mod openapi;
pub mod profile;

use actix_web::web;

use crate::error::AppError;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;

/// Register every API route plus extractor error handlers that answer in the
/// `{ success: false, message }` envelope.
///
/// Mounted under `/api` by the binary and by the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .configure(configure_health_routes)
    .configure(auth::configure_routes)
    .configure(crate::services::configure_oauth_routes)
    .configure(jobs::configure_routes)
    .configure(documents::configure_routes)
    .configure(profile::configure_routes);
}
