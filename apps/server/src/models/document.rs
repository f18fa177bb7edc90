//! Document domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::document;

/// Kind of document a user can upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Cv,
    CoverLetter,
    Portfolio,
    Certificate,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cv => "cv",
            Self::CoverLetter => "cover_letter",
            Self::Portfolio => "portfolio",
            Self::Certificate => "certificate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cv" => Some(Self::Cv),
            "cover_letter" | "coverLetter" => Some(Self::CoverLetter),
            "portfolio" => Some(Self::Portfolio),
            "certificate" => Some(Self::Certificate),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pointer to the stored file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Object storage key.
    pub file_id: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub owner: Uuid,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub title: String,
    pub description: Option<String>,
    pub file: FileInfo,
    pub version: i32,
    pub is_default: bool,
    pub is_archived: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<document::Model> for DocumentResponse {
    fn from(m: document::Model) -> Self {
        Self {
            id: m.id,
            owner: m.owner_id,
            // Stored values are written from DocumentType; fall back rather than fail a listing.
            doc_type: DocumentType::parse(&m.doc_type).unwrap_or(DocumentType::Certificate),
            title: m.title,
            description: m.description,
            file: FileInfo {
                file_id: m.file_key,
                file_name: m.file_name,
                mime_type: m.mime_type,
                size: m.file_size,
            },
            version: m.version,
            is_default: m.is_default,
            is_archived: m.is_archived,
            last_used_at: m.last_used_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Metadata patch for an existing document.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
}

/// Query parameters for listing documents.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListDocumentsQuery {
    /// Filter by document type.
    #[serde(rename = "type", default)]
    pub doc_type: Option<DocumentType>,
}

/// Fields collected from a multipart document upload.
#[derive(Debug, Default)]
pub struct DocumentUpload {
    pub doc_type: Option<DocumentType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_default: bool,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}
