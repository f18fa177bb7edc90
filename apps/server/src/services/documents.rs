//! Document store: metadata in the database, bytes in the blob store.
//!
//! Writes that span both stores are ordered so a failure leaves at worst an
//! orphaned blob, never metadata pointing at a missing file.

use sea_orm::Set;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::documents::NewDocument;
use crate::entity::{document, job};
use crate::error::{AppError, AppResult};
use crate::models::document::DocumentUpload;
use crate::models::{JobDocuments, UpdateDocumentRequest, non_blank, required};

use super::storage::{self, BlobStore};

/// A validated file ready to be stored.
struct IncomingFile {
    file_name: String,
    mime_type: String,
    data: Vec<u8>,
}

fn validate_file(
    file_name: Option<String>,
    mime_type: Option<String>,
    data: Vec<u8>,
    max_size: usize,
) -> AppResult<IncomingFile> {
    let file_name = non_blank(file_name)
        .filter(|_| !data.is_empty())
        .ok_or_else(|| AppError::InvalidInput("file is required".to_string()))?;

    if data.len() > max_size {
        return Err(AppError::InvalidInput(format!(
            "file exceeds the maximum size of {} bytes",
            max_size
        )));
    }

    if !storage::is_allowed_extension(&file_name) {
        return Err(AppError::InvalidInput(format!(
            "file type not allowed; accepted extensions: {}",
            storage::ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let mime_type = mime_type
        .filter(|m| !m.is_empty() && m != "application/octet-stream")
        .unwrap_or_else(|| {
            let ext = storage::file_extension(&file_name).unwrap_or_default();
            storage::content_type_for_extension(&ext).to_string()
        });

    Ok(IncomingFile {
        file_name,
        mime_type,
        data,
    })
}

/// Store a new document.
///
/// The blob is written first. When the document is marked default, other
/// defaults of the same type are cleared before the metadata insert.
pub async fn create_document(
    db: &DbPool,
    store: &dyn BlobStore,
    owner_id: Uuid,
    upload: DocumentUpload,
    max_size: usize,
) -> AppResult<document::Model> {
    let doc_type = upload
        .doc_type
        .ok_or_else(|| AppError::InvalidInput("type is required".to_string()))?;
    let title = non_blank(upload.title);
    let description = non_blank(upload.description);
    let file = validate_file(upload.file_name, upload.mime_type, upload.data, max_size)?;
    let title = title.unwrap_or_else(|| file.file_name.clone());

    let key = storage::document_key(owner_id, &file.file_name);
    let size = file.data.len() as i64;
    store
        .put(&key, file.data, Some(&file.mime_type))
        .await?;

    if upload.is_default {
        db.clear_default_documents(owner_id, doc_type, None).await?;
    }

    let inserted = db
        .insert_document(NewDocument {
            id: Uuid::now_v7(),
            owner_id,
            doc_type,
            title,
            description,
            file_key: key.clone(),
            file_name: file.file_name,
            mime_type: file.mime_type,
            file_size: size,
            is_default: upload.is_default,
        })
        .await;

    match inserted {
        Ok(doc) => {
            info!(document_id = %doc.id, doc_type = %doc_type, "document created");
            Ok(doc)
        }
        Err(e) => {
            if let Err(cleanup) = store.delete(&key).await {
                warn!(key = %key, error = %cleanup, "failed to remove orphaned blob");
            }
            Err(e)
        }
    }
}

/// Patch title, description and default flag.
pub async fn update_document(
    db: &DbPool,
    owner_id: Uuid,
    id: Uuid,
    patch: UpdateDocumentRequest,
) -> AppResult<document::Model> {
    let existing = db.get_document(owner_id, id).await?;
    let doc_type = crate::models::DocumentType::parse(&existing.doc_type)
        .ok_or_else(|| AppError::Internal(format!("unknown document type {}", existing.doc_type)))?;

    let mut active: document::ActiveModel = existing.into();
    if let Some(title) = patch.title {
        active.title = Set(required(&title, "title")?);
    }
    if patch.description.is_some() {
        active.description = Set(non_blank(patch.description));
    }
    match patch.is_default {
        Some(true) => {
            db.clear_default_documents(owner_id, doc_type, Some(id))
                .await?;
            active.is_default = Set(true);
        }
        Some(false) => active.is_default = Set(false),
        None => {}
    }

    db.save_document(active).await
}

/// Upload a new file version and point the document at it.
///
/// The previous blob is deleted best-effort once the metadata references the
/// new one.
pub async fn replace_file(
    db: &DbPool,
    store: &dyn BlobStore,
    owner_id: Uuid,
    id: Uuid,
    upload: DocumentUpload,
    max_size: usize,
) -> AppResult<document::Model> {
    let existing = db.get_document(owner_id, id).await?;
    let file = validate_file(upload.file_name, upload.mime_type, upload.data, max_size)?;

    let key = storage::document_key(owner_id, &file.file_name);
    let size = file.data.len() as i64;
    store
        .put(&key, file.data, Some(&file.mime_type))
        .await?;

    let previous_key = existing.file_key.clone();
    let version = existing.version + 1;
    let mut active: document::ActiveModel = existing.into();
    active.file_key = Set(key.clone());
    active.file_name = Set(file.file_name);
    active.mime_type = Set(file.mime_type);
    active.file_size = Set(size);
    active.version = Set(version);

    let updated = match db.save_document(active).await {
        Ok(doc) => doc,
        Err(e) => {
            if let Err(cleanup) = store.delete(&key).await {
                warn!(key = %key, error = %cleanup, "failed to remove orphaned blob");
            }
            return Err(e);
        }
    };

    if let Err(e) = store.delete(&previous_key).await {
        warn!(key = %previous_key, error = %e, "failed to delete previous document version");
    }

    info!(document_id = %id, version, "document file replaced");
    Ok(updated)
}

/// Drop every reference the owner's jobs hold to a document.
async fn detach_from_jobs(db: &DbPool, owner_id: Uuid, doc_id: Uuid) -> AppResult<usize> {
    let mut detached = 0;
    for existing in db.list_jobs(owner_id, None).await? {
        let mut documents = JobDocuments::from_json(&existing.documents);
        if !documents.remove_anywhere(doc_id) {
            continue;
        }
        let mut active: job::ActiveModel = existing.into();
        active.documents = Set(documents.to_json());
        db.save_job(active).await?;
        detached += 1;
    }
    Ok(detached)
}

/// Soft-delete a document.
///
/// Job references are removed before anything else. The blob delete is
/// best-effort; the document is archived even when it fails.
pub async fn archive_document(
    db: &DbPool,
    store: &dyn BlobStore,
    owner_id: Uuid,
    id: Uuid,
) -> AppResult<document::Model> {
    let existing = db.get_document(owner_id, id).await?;

    let detached = detach_from_jobs(db, owner_id, id).await?;
    if detached > 0 {
        info!(document_id = %id, jobs = detached, "document unlinked from jobs");
    }

    if let Err(e) = store.delete(&existing.file_key).await {
        warn!(document_id = %id, key = %existing.file_key, error = %e, "failed to delete document blob");
    }

    let mut active: document::ActiveModel = existing.into();
    active.is_archived = Set(true);
    active.is_default = Set(false);
    let archived = db.save_document(active).await?;

    info!(document_id = %id, "document archived");
    Ok(archived)
}

/// Metadata and bytes of a document for download or inline view.
pub async fn open_document(
    db: &DbPool,
    store: &dyn BlobStore,
    owner_id: Uuid,
    id: Uuid,
) -> AppResult<(document::Model, Vec<u8>)> {
    let doc = db.get_document(owner_id, id).await?;
    let (data, _) = store.get(&doc.file_key).await?;
    Ok((doc, data))
}
