//! Job application domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

use super::document::DocumentType;
use crate::entity::job;

/// Pipeline status of an application.
///
/// There is no enforced ordering: any status may move to any other, so users
/// can skip stages or move a card back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Wishlist,
    Applied,
    Interview,
    Offered,
    Accepted,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        Self::Wishlist,
        Self::Applied,
        Self::Interview,
        Self::Offered,
        Self::Accepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wishlist => "wishlist",
            Self::Applied => "applied",
            Self::Interview => "interview",
            Self::Offered => "offered",
            Self::Accepted => "accepted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wishlist" => Some(Self::Wishlist),
            "applied" => Some(Self::Applied),
            "interview" => Some(Self::Interview),
            "offered" => Some(Self::Offered),
            "accepted" => Some(Self::Accepted),
            _ => None,
        }
    }

    /// Every status except wishlist counts as an application in progress.
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, Self::Wishlist)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Slot of a job's documents map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DocumentSlot {
    Cv,
    #[serde(alias = "cover_letter")]
    CoverLetter,
    Portfolio,
    #[serde(alias = "certificate")]
    Other,
}

impl DocumentSlot {
    /// Slot a document of the given type is attached to.
    pub fn for_type(doc_type: DocumentType) -> Self {
        match doc_type {
            DocumentType::Cv => Self::Cv,
            DocumentType::CoverLetter => Self::CoverLetter,
            DocumentType::Portfolio => Self::Portfolio,
            DocumentType::Certificate => Self::Other,
        }
    }
}

/// Weak references from a job to documents. A job never owns these documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobDocuments {
    #[serde(default)]
    pub cv: Option<Uuid>,
    #[serde(default)]
    pub cover_letter: Option<Uuid>,
    #[serde(default)]
    pub portfolio: Option<Uuid>,
    #[serde(default)]
    pub other: Vec<Uuid>,
}

impl JobDocuments {
    /// All referenced document ids, slots first, without duplicates.
    pub fn ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::new();
        for id in [self.cv, self.cover_letter, self.portfolio]
            .into_iter()
            .flatten()
            .chain(self.other.iter().copied())
        {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    /// Ids referenced here that `previous` did not reference.
    pub fn added_since(&self, previous: &JobDocuments) -> Vec<Uuid> {
        let before = previous.ids();
        self.ids()
            .into_iter()
            .filter(|id| !before.contains(id))
            .collect()
    }

    /// Remove one reference. Returns whether anything changed.
    ///
    /// A slot holding a different document is left alone.
    pub fn remove(&mut self, slot: DocumentSlot, doc_id: Uuid) -> bool {
        let target = match slot {
            DocumentSlot::Cv => &mut self.cv,
            DocumentSlot::CoverLetter => &mut self.cover_letter,
            DocumentSlot::Portfolio => &mut self.portfolio,
            DocumentSlot::Other => {
                let before = self.other.len();
                self.other.retain(|id| *id != doc_id);
                return self.other.len() != before;
            }
        };
        if *target == Some(doc_id) {
            *target = None;
            true
        } else {
            false
        }
    }

    /// Remove a document from whichever slot references it.
    pub fn remove_anywhere(&mut self, doc_id: Uuid) -> bool {
        let mut changed = false;
        for slot in [
            DocumentSlot::Cv,
            DocumentSlot::CoverLetter,
            DocumentSlot::Portfolio,
            DocumentSlot::Other,
        ] {
            changed |= self.remove(slot, doc_id);
        }
        changed
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|_| JsonValue::Object(Default::default()))
    }

    pub fn from_json(value: &JsonValue) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub company: String,
    pub country: String,
    pub city: String,
    pub job_url: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub status: JobStatus,
    pub application_date: DateTime<Utc>,
    pub documents: JobDocuments,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<job::Model> for JobResponse {
    fn from(m: job::Model) -> Self {
        Self {
            id: m.id,
            owner: m.owner_id,
            title: m.title,
            company: m.company,
            country: m.country,
            city: m.city,
            job_url: m.job_url,
            description: m.description,
            notes: m.notes,
            status: JobStatus::parse(&m.status).unwrap_or(JobStatus::Wishlist),
            application_date: m.application_date,
            documents: JobDocuments::from_json(&m.documents),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Request to create a job.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Defaults to wishlist.
    #[serde(default)]
    pub status: Option<JobStatus>,
    /// Defaults to now.
    #[serde(default)]
    pub application_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub documents: Option<JobDocuments>,
    /// Fill empty cv/coverLetter/portfolio slots with the owner's default documents.
    #[serde(default)]
    pub use_default_documents: bool,
}

/// Nulls one document reference without touching the rest of the job.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveDocument {
    pub doc_type: DocumentSlot,
    pub doc_id: Uuid,
}

/// Request to update a job.
///
/// With `removeDocument` set, only that reference is removed and every other
/// field is ignored. Otherwise this is a full replace: title, company, country
/// and city are required, absent optional text fields are cleared, and an
/// omitted status, application date or documents map keeps its current value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub application_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub documents: Option<JobDocuments>,
    #[serde(default)]
    pub remove_document: Option<RemoveDocument>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: JobStatus,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListJobsQuery {
    #[serde(default)]
    pub status: Option<JobStatus>,
}

/// Query parameters of the unlink gesture.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkDocumentQuery {
    /// Slot to clear. When absent the document is removed from every slot.
    #[serde(default)]
    pub doc_type: Option<DocumentSlot>,
    /// Also archive the document after the job has been unlinked.
    #[serde(default)]
    pub delete_permanently: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkOutcome {
    pub job: JobResponse,
    pub document_archived: bool,
}
