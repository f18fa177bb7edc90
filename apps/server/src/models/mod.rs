//! Domain models and request/response DTOs.

use serde::Serialize;

pub mod analytics;
pub mod document;
pub mod job;
pub mod profile;
pub mod user;

// Re-export commonly used types
pub use analytics::{JobAnalytics, RankedEntry, StatusCounts};
pub use document::{
    DocumentResponse, DocumentType, FileInfo, ListDocumentsQuery, UpdateDocumentRequest,
};
pub use job::{
    CreateJobRequest, DocumentSlot, JobDocuments, JobResponse, JobStatus, ListJobsQuery,
    RemoveDocument, UnlinkDocumentQuery, UnlinkOutcome, UpdateJobRequest, UpdateStatusRequest,
};
pub use profile::{
    Education, EducationInput, Experience, ExperienceInput, ProfileResponse, ReorderRequest,
    SkillsRequest, UpsertProfileRequest,
};
pub use user::{
    ChangeEmailRequest, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    ResetPasswordRequest, SessionClaims, SignupRequest, UpdateAccountRequest, UserResponse,
    VerifyResetTokenRequest,
};

/// Success envelope shared by every endpoint: `{success, data?, message?}`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Trim an optional free-text field, mapping blank input to `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Require a non-blank text field, returning its trimmed value.
pub fn required(value: &str, field: &str) -> crate::error::AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::error::AppError::InvalidInput(format!(
            "{} is required",
            field
        )));
    }
    Ok(trimmed.to_string())
}
