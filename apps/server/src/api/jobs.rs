//! Job application endpoints.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{AppResult, ErrorResponse};
use crate::models::{
    ApiResponse, CreateJobRequest, JobAnalytics, JobResponse, ListJobsQuery, UnlinkDocumentQuery,
    UnlinkOutcome, UpdateJobRequest, UpdateStatusRequest,
};
use crate::services::{BlobStore, analytics, jobs};

/// Configure job routes. `/jobs/analytics` is registered ahead of `/jobs/{id}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(job_analytics)
        .service(list_jobs)
        .service(create_job)
        .service(get_job)
        .service(update_job)
        .service(update_job_status)
        .service(delete_job)
        .service(unlink_document);
}

#[utoipa::path(
    get,
    path = "/api/jobs",
    tag = "Jobs",
    params(("status" = Option<String>, Query, description = "Filter by status")),
    responses((status = 200, description = "Jobs, newest application first", body = Vec<JobResponse>))
)]
#[get("/jobs")]
pub async fn list_jobs(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    query: web::Query<ListJobsQuery>,
) -> AppResult<HttpResponse> {
    let jobs: Vec<JobResponse> = pool
        .list_jobs(auth.user_id, query.status)
        .await?
        .into_iter()
        .map(JobResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(jobs)))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "Jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created", body = JobResponse),
        (status = 400, description = "Missing field or duplicate URL", body = ErrorResponse)
    )
)]
#[post("/jobs")]
pub async fn create_job(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    body: web::Json<CreateJobRequest>,
) -> AppResult<HttpResponse> {
    let job = jobs::create_job(pool.get_ref(), auth.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(JobResponse::from(job))))
}

/// Aggregate statistics over all of the caller's jobs.
#[utoipa::path(
    get,
    path = "/api/jobs/analytics",
    tag = "Jobs",
    responses((status = 200, description = "Analytics", body = JobAnalytics))
)]
#[get("/jobs/analytics")]
pub async fn job_analytics(pool: web::Data<DbPool>, auth: AuthUser) -> AppResult<HttpResponse> {
    let jobs: Vec<JobResponse> = pool
        .list_jobs(auth.user_id, None)
        .await?
        .into_iter()
        .map(JobResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(analytics::compute(&jobs, Utc::now()))))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    tag = "Jobs",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job", body = JobResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[get("/jobs/{id}")]
pub async fn get_job(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let job = pool.get_job(auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(JobResponse::from(job))))
}

#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    tag = "Jobs",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated", body = JobResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[put("/jobs/{id}")]
pub async fn update_job(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateJobRequest>,
) -> AppResult<HttpResponse> {
    let job = jobs::update_job(
        pool.get_ref(),
        auth.user_id,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(JobResponse::from(job))))
}

#[utoipa::path(
    patch,
    path = "/api/jobs/{id}/status",
    tag = "Jobs",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = UpdateStatusRequest,
    responses((status = 200, description = "Status changed", body = JobResponse))
)]
#[patch("/jobs/{id}/status")]
pub async fn update_job_status(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> AppResult<HttpResponse> {
    let job = jobs::update_status(pool.get_ref(), auth.user_id, path.into_inner(), body.status)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(JobResponse::from(job))))
}

/// Delete a job. Documents it references are kept.
#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    tag = "Jobs",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[delete("/jobs/{id}")]
pub async fn delete_job(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    pool.delete_job(auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Job deleted")))
}

/// Remove a document from a job, optionally archiving the document afterwards.
#[utoipa::path(
    delete,
    path = "/api/jobs/{id}/documents/{doc_id}",
    tag = "Jobs",
    params(
        ("id" = Uuid, Path, description = "Job ID"),
        ("doc_id" = Uuid, Path, description = "Document ID"),
        ("docType" = Option<String>, Query, description = "Slot to clear: cv, coverLetter, portfolio, other"),
        ("deletePermanently" = Option<bool>, Query, description = "Archive the document after unlinking")
    ),
    responses(
        (status = 200, description = "Document unlinked", body = UnlinkOutcome),
        (status = 404, description = "Job not found", body = ErrorResponse)
    )
)]
#[delete("/jobs/{id}/documents/{doc_id}")]
pub async fn unlink_document(
    pool: web::Data<DbPool>,
    store: web::Data<dyn BlobStore>,
    auth: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
    query: web::Query<UnlinkDocumentQuery>,
) -> AppResult<HttpResponse> {
    let (job_id, doc_id) = path.into_inner();
    let outcome = jobs::unlink_document(
        pool.get_ref(),
        store.get_ref(),
        auth.user_id,
        job_id,
        doc_id,
        query.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(outcome)))
}
