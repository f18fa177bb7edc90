//! Document endpoints: multipart upload, metadata, archive and file delivery.

use actix_multipart::Multipart;
use actix_web::http::header::{
    CONTENT_TYPE, ContentDisposition, DispositionParam, DispositionType,
};
use actix_web::{HttpResponse, delete, get, post, put, web};
use futures_util::StreamExt;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::document::DocumentUpload;
use crate::models::{
    ApiResponse, DocumentResponse, DocumentType, ListDocumentsQuery, UpdateDocumentRequest,
};
use crate::services::{BlobStore, documents};

/// Configure document routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_documents)
        .service(upload_document)
        .service(get_document)
        .service(update_document)
        .service(delete_document)
        .service(replace_document_file)
        .service(download_document)
        .service(view_document);
}

/// Read a text form field.
async fn read_text(field: &mut actix_multipart::Field) -> AppResult<String> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
        data.extend_from_slice(&chunk);
    }
    String::from_utf8(data)
        .map(|s| s.trim().to_string())
        .map_err(|_| AppError::InvalidInput("Form fields must be UTF-8".to_string()))
}

/// Collect the document form: `type`, `title`, `description`, `isDefault` and `file`.
///
/// Reading stops as soon as the file grows past `max_size`.
async fn read_upload(payload: &mut Multipart, max_size: usize) -> AppResult<DocumentUpload> {
    let mut upload = DocumentUpload::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| AppError::InvalidInput("Missing content disposition".to_string()))?
            .clone();

        match content_disposition.get_name() {
            Some("file") => {
                upload.file_name = content_disposition.get_filename().map(String::from);
                upload.mime_type = field.content_type().map(|m| m.essence_str().to_string());
                while let Some(chunk) = field.next().await {
                    let chunk =
                        chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
                    if upload.data.len() + chunk.len() > max_size {
                        return Err(AppError::InvalidInput(format!(
                            "file exceeds the maximum size of {} bytes",
                            max_size
                        )));
                    }
                    upload.data.extend_from_slice(&chunk);
                }
            }
            Some("type") => {
                let value = read_text(&mut field).await?;
                upload.doc_type = Some(DocumentType::parse(&value).ok_or_else(|| {
                    AppError::InvalidInput(format!("invalid document type '{}'", value))
                })?);
            }
            Some("title") => upload.title = Some(read_text(&mut field).await?),
            Some("description") => upload.description = Some(read_text(&mut field).await?),
            Some("isDefault") => {
                let value = read_text(&mut field).await?;
                upload.is_default = matches!(value.as_str(), "true" | "1" | "on");
            }
            _ => {
                // Drain unknown fields.
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
                }
            }
        }
    }

    Ok(upload)
}

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "Documents",
    params(("type" = Option<String>, Query, description = "Filter by document type")),
    responses((status = 200, description = "Non-archived documents, newest first", body = Vec<DocumentResponse>))
)]
#[get("/documents")]
pub async fn list_documents(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    query: web::Query<ListDocumentsQuery>,
) -> AppResult<HttpResponse> {
    let docs: Vec<DocumentResponse> = pool
        .list_documents(auth.user_id, query.doc_type)
        .await?
        .into_iter()
        .map(DocumentResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(docs)))
}

/// Upload a document as `multipart/form-data`.
#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "Documents",
    request_body(content_type = "multipart/form-data", description = "Fields: type, title, description, isDefault, file"),
    responses(
        (status = 201, description = "Document stored", body = DocumentResponse),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 500, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[post("/documents")]
pub async fn upload_document(
    pool: web::Data<DbPool>,
    store: web::Data<dyn BlobStore>,
    config: web::Data<Config>,
    auth: AuthUser,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let upload = read_upload(&mut payload, config.max_upload_size).await?;
    let doc = documents::create_document(
        pool.get_ref(),
        store.get_ref(),
        auth.user_id,
        upload,
        config.max_upload_size,
    )
    .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(DocumentResponse::from(doc))))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document metadata", body = DocumentResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[get("/documents/{id}")]
pub async fn get_document(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let doc = pool.get_document(auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(DocumentResponse::from(doc))))
}

#[utoipa::path(
    put,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = UpdateDocumentRequest,
    responses((status = 200, description = "Document updated", body = DocumentResponse))
)]
#[put("/documents/{id}")]
pub async fn update_document(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateDocumentRequest>,
) -> AppResult<HttpResponse> {
    let doc = documents::update_document(
        pool.get_ref(),
        auth.user_id,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(DocumentResponse::from(doc))))
}

/// Archive a document and delete its file.
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document archived"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[delete("/documents/{id}")]
pub async fn delete_document(
    pool: web::Data<DbPool>,
    store: web::Data<dyn BlobStore>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    documents::archive_document(pool.get_ref(), store.get_ref(), auth.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Document deleted")))
}

/// Replace the stored file, bumping the document version.
#[utoipa::path(
    post,
    path = "/api/documents/{id}/file",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body(content_type = "multipart/form-data", description = "Field: file"),
    responses((status = 200, description = "File replaced", body = DocumentResponse))
)]
#[post("/documents/{id}/file")]
pub async fn replace_document_file(
    pool: web::Data<DbPool>,
    store: web::Data<dyn BlobStore>,
    config: web::Data<Config>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let upload = read_upload(&mut payload, config.max_upload_size).await?;
    let doc = documents::replace_file(
        pool.get_ref(),
        store.get_ref(),
        auth.user_id,
        path.into_inner(),
        upload,
        config.max_upload_size,
    )
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(DocumentResponse::from(doc))))
}

async fn serve_document(
    pool: &DbPool,
    store: &dyn BlobStore,
    owner_id: Uuid,
    id: Uuid,
    disposition: DispositionType,
) -> AppResult<HttpResponse> {
    let (doc, data) = documents::open_document(pool, store, owner_id, id).await?;
    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, doc.mime_type))
        .insert_header(ContentDisposition {
            disposition,
            parameters: vec![DispositionParam::Filename(doc.file_name)],
        })
        .body(data))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/download",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses((status = 200, description = "File as attachment"))
)]
#[get("/documents/{id}/download")]
pub async fn download_document(
    pool: web::Data<DbPool>,
    store: web::Data<dyn BlobStore>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    serve_document(
        &pool,
        store.get_ref(),
        auth.user_id,
        path.into_inner(),
        DispositionType::Attachment,
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/view",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses((status = 200, description = "File for inline display"))
)]
#[get("/documents/{id}/view")]
pub async fn view_document(
    pool: web::Data<DbPool>,
    store: web::Data<dyn BlobStore>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    serve_document(
        &pool,
        store.get_ref(),
        auth.user_id,
        path.into_inner(),
        DispositionType::Inline,
    )
    .await
}
