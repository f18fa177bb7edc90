//! Job records, the status pipeline and document unlinking.

use chrono::Utc;
use sea_orm::Set;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::jobs::NewJob;
use crate::entity::job;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateJobRequest, DocumentSlot, DocumentType, JobDocuments, JobResponse, JobStatus,
    UnlinkDocumentQuery, UnlinkOutcome, UpdateJobRequest, non_blank, required,
};

use super::documents::archive_document;
use super::storage::BlobStore;

/// Every referenced document must be a live document of the owner.
async fn check_references(db: &DbPool, owner_id: Uuid, ids: &[Uuid]) -> AppResult<()> {
    for id in ids {
        if db.find_document(owner_id, *id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "referenced document {} does not exist",
                id
            )));
        }
    }
    Ok(())
}

/// Reject a URL another job of the same owner already uses. Only enforced on create.
async fn check_unique_url(db: &DbPool, owner_id: Uuid, job_url: Option<&str>) -> AppResult<()> {
    let Some(url) = job_url else {
        return Ok(());
    };
    if db.find_job_by_url(owner_id, url).await?.is_some() {
        return Err(AppError::Conflict(
            "A job with this URL already exists".to_string(),
        ));
    }
    Ok(())
}

/// Fill empty cv, cover letter and portfolio slots from the owner's defaults.
async fn apply_default_documents(
    db: &DbPool,
    owner_id: Uuid,
    documents: &mut JobDocuments,
) -> AppResult<()> {
    for doc in db.default_documents(owner_id).await? {
        let Some(doc_type) = DocumentType::parse(&doc.doc_type) else {
            continue;
        };
        let slot = match DocumentSlot::for_type(doc_type) {
            DocumentSlot::Cv => &mut documents.cv,
            DocumentSlot::CoverLetter => &mut documents.cover_letter,
            DocumentSlot::Portfolio => &mut documents.portfolio,
            DocumentSlot::Other => continue,
        };
        if slot.is_none() {
            *slot = Some(doc.id);
        }
    }
    Ok(())
}

async fn touch(db: &DbPool, owner_id: Uuid, ids: &[Uuid]) {
    // lastUsedAt is informational; a failed stamp must not fail the job write.
    if let Err(e) = db.touch_documents(owner_id, ids).await {
        warn!(error = %e, "failed to update document last-used time");
    }
}

pub async fn create_job(
    db: &DbPool,
    owner_id: Uuid,
    req: CreateJobRequest,
) -> AppResult<job::Model> {
    let title = required(&req.title, "title")?;
    let company = required(&req.company, "company")?;
    let country = required(&req.country, "country")?;
    let city = required(&req.city, "city")?;
    let job_url = non_blank(req.job_url);

    check_unique_url(db, owner_id, job_url.as_deref()).await?;

    let mut documents = req.documents.unwrap_or_default();
    check_references(db, owner_id, &documents.ids()).await?;
    if req.use_default_documents {
        apply_default_documents(db, owner_id, &mut documents).await?;
    }

    let created = db
        .insert_job(NewJob {
            owner_id,
            title,
            company,
            country,
            city,
            job_url,
            description: non_blank(req.description),
            notes: non_blank(req.notes),
            status: req.status.unwrap_or(JobStatus::Wishlist),
            application_date: req.application_date.unwrap_or_else(Utc::now),
            documents: documents.clone(),
        })
        .await?;

    touch(db, owner_id, &documents.ids()).await;

    info!(job_id = %created.id, status = %created.status, "job created");
    Ok(created)
}

/// Full replace of a job's fields, or removal of one document reference.
pub async fn update_job(
    db: &DbPool,
    owner_id: Uuid,
    id: Uuid,
    req: UpdateJobRequest,
) -> AppResult<job::Model> {
    let existing = db.get_job(owner_id, id).await?;
    let previous = JobDocuments::from_json(&existing.documents);

    if let Some(remove) = req.remove_document {
        let mut documents = previous;
        if !documents.remove(remove.doc_type, remove.doc_id) {
            return Ok(existing);
        }
        let mut active: job::ActiveModel = existing.into();
        active.documents = Set(documents.to_json());
        return db.save_job(active).await;
    }

    let title = required(&req.title, "title")?;
    let company = required(&req.company, "company")?;
    let country = required(&req.country, "country")?;
    let city = required(&req.city, "city")?;
    let job_url = non_blank(req.job_url);

    let documents = req.documents.unwrap_or_else(|| previous.clone());
    let added = documents.added_since(&previous);
    check_references(db, owner_id, &added).await?;

    let mut active: job::ActiveModel = existing.into();
    active.title = Set(title);
    active.company = Set(company);
    active.country = Set(country);
    active.city = Set(city);
    active.job_url = Set(job_url);
    active.description = Set(non_blank(req.description));
    active.notes = Set(non_blank(req.notes));
    if let Some(status) = req.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(date) = req.application_date {
        active.application_date = Set(date);
    }
    active.documents = Set(documents.to_json());

    let updated = db.save_job(active).await?;
    touch(db, owner_id, &added).await;

    Ok(updated)
}

/// Move a job to another pipeline stage. Any transition is allowed.
pub async fn update_status(
    db: &DbPool,
    owner_id: Uuid,
    id: Uuid,
    status: JobStatus,
) -> AppResult<job::Model> {
    let existing = db.get_job(owner_id, id).await?;
    let from = existing.status.clone();

    let mut active: job::ActiveModel = existing.into();
    active.status = Set(status.as_str().to_string());
    let updated = db.save_job(active).await?;

    info!(job_id = %id, from = %from, to = %status, "job status changed");
    Ok(updated)
}

/// Remove a document reference from a job, then optionally archive the document.
///
/// The job write comes first and is not rolled back if archiving fails. A
/// reference that is already gone, or a document that is already archived,
/// is not an error so the call can be retried.
pub async fn unlink_document(
    db: &DbPool,
    store: &dyn BlobStore,
    owner_id: Uuid,
    job_id: Uuid,
    doc_id: Uuid,
    query: UnlinkDocumentQuery,
) -> AppResult<UnlinkOutcome> {
    let existing = db.get_job(owner_id, job_id).await?;
    let mut documents = JobDocuments::from_json(&existing.documents);

    let changed = match query.doc_type {
        Some(slot) => documents.remove(slot, doc_id),
        None => documents.remove_anywhere(doc_id),
    };

    let job = if changed {
        let mut active: job::ActiveModel = existing.into();
        active.documents = Set(documents.to_json());
        db.save_job(active).await?
    } else {
        existing
    };

    let mut document_archived = false;
    if query.delete_permanently {
        match archive_document(db, store, owner_id, doc_id).await {
            Ok(_) => document_archived = true,
            Err(AppError::NotFound(_)) => {}
            Err(e) => {
                warn!(job_id = %job_id, document_id = %doc_id, error = %e, "document unlinked but archive failed");
                return Err(e);
            }
        }
    }

    info!(job_id = %job_id, document_id = %doc_id, document_archived, "document unlinked");
    Ok(UnlinkOutcome {
        job: JobResponse::from(job),
        document_archived,
    })
}
