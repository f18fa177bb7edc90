//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, auth, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jobtrack Server",
        version = "0.1.0",
        description = "API server for tracking job applications, application documents and a personal profile"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health
        api::health::health,
        api::health::ready,
        // Auth
        api::auth::signup,
        api::auth::login,
        api::auth::logout,
        api::auth::me,
        api::auth::update_me,
        api::auth::forgot_password,
        api::auth::verify_reset_token,
        api::auth::reset_password,
        api::auth::change_password,
        api::auth::change_email,
        api::auth::delete_account,
        // Jobs
        api::jobs::list_jobs,
        api::jobs::create_job,
        api::jobs::job_analytics,
        api::jobs::get_job,
        api::jobs::update_job,
        api::jobs::update_job_status,
        api::jobs::delete_job,
        api::jobs::unlink_document,
        // Documents
        api::documents::list_documents,
        api::documents::upload_document,
        api::documents::get_document,
        api::documents::update_document,
        api::documents::delete_document,
        api::documents::replace_document_file,
        api::documents::download_document,
        api::documents::view_document,
        // Profile
        api::profile::get_profile,
        api::profile::upsert_profile,
        api::profile::add_experience,
        api::profile::reorder_experiences,
        api::profile::update_experience,
        api::profile::delete_experience,
        api::profile::add_education,
        api::profile::reorder_educations,
        api::profile::update_education,
        api::profile::delete_education,
        api::profile::add_skills,
        api::profile::remove_skills,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Auth
            models::UserResponse,
            models::SignupRequest,
            models::LoginRequest,
            models::ForgotPasswordRequest,
            models::VerifyResetTokenRequest,
            models::ResetPasswordRequest,
            models::ChangePasswordRequest,
            models::ChangeEmailRequest,
            models::UpdateAccountRequest,
            // Jobs
            models::JobStatus,
            models::DocumentSlot,
            models::JobDocuments,
            models::JobResponse,
            models::CreateJobRequest,
            models::UpdateJobRequest,
            models::RemoveDocument,
            models::UpdateStatusRequest,
            models::UnlinkOutcome,
            models::JobAnalytics,
            models::StatusCounts,
            models::RankedEntry,
            // Documents
            models::DocumentType,
            models::FileInfo,
            models::DocumentResponse,
            models::UpdateDocumentRequest,
            // Profile
            models::Experience,
            models::Education,
            models::ExperienceInput,
            models::EducationInput,
            models::ProfileResponse,
            models::UpsertProfileRequest,
            models::SkillsRequest,
            models::ReorderRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Accounts and sessions"),
        (name = "Jobs", description = "Job applications and the status pipeline"),
        (name = "Documents", description = "CVs, cover letters, portfolios and certificates"),
        (name = "Profile", description = "Experience, education and skills")
    ),
    modifiers(&SecurityAddon),
    security(("session" = []), ("bearer" = []))
)]
pub struct ApiDoc;

/// Session cookie and bearer token security schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(auth::SESSION_COOKIE))),
            );
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

