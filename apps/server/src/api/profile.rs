//! Profile endpoints. The path carries the user id; only the caller's own profile is visible.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::entity::profile;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::{
    ApiResponse, EducationInput, ExperienceInput, ProfileResponse, ReorderRequest, SkillsRequest,
    UpsertProfileRequest,
};
use crate::services::profile as profile_service;

/// Configure profile routes. Reorder routes are registered ahead of `{entry_id}` routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_profile)
        .service(upsert_profile)
        .service(reorder_experiences)
        .service(add_experience)
        .service(update_experience)
        .service(delete_experience)
        .service(reorder_educations)
        .service(add_education)
        .service(update_education)
        .service(delete_education)
        .service(add_skills)
        .service(remove_skills);
}

/// Resolve the path user id against the caller.
fn own_profile(auth: AuthUser, id: Uuid) -> AppResult<Uuid> {
    if auth.user_id != id {
        return Err(AppError::NotFound("Profile".to_string()));
    }
    Ok(id)
}

fn respond(model: profile::Model) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(ProfileResponse::from(model)))
}

#[utoipa::path(
    get,
    path = "/api/profile/{id}",
    tag = "Profile",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile, created empty on first access", body = ProfileResponse),
        (status = 404, description = "Not the caller's profile", body = ErrorResponse)
    )
)]
#[get("/profile/{id}")]
pub async fn get_profile(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user_id = own_profile(auth, path.into_inner())?;
    Ok(respond(pool.get_or_create_profile(user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/profile/{id}",
    tag = "Profile",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpsertProfileRequest,
    responses((status = 200, description = "Profile saved", body = ProfileResponse))
)]
#[post("/profile/{id}")]
pub async fn upsert_profile(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpsertProfileRequest>,
) -> AppResult<HttpResponse> {
    let user_id = own_profile(auth, path.into_inner())?;
    let model = profile_service::upsert_profile(pool.get_ref(), user_id, body.into_inner()).await?;
    Ok(respond(model))
}

/// Add an experience at the head of the list.
#[utoipa::path(
    put,
    path = "/api/profile/{id}/experiences",
    tag = "Profile",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ExperienceInput,
    responses((status = 200, description = "Experience added", body = ProfileResponse))
)]
#[put("/profile/{id}/experiences")]
pub async fn add_experience(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<ExperienceInput>,
) -> AppResult<HttpResponse> {
    let user_id = own_profile(auth, path.into_inner())?;
    let model = profile_service::add_experience(pool.get_ref(), user_id, body.into_inner()).await?;
    Ok(respond(model))
}

#[utoipa::path(
    post,
    path = "/api/profile/{id}/experiences/reorder",
    tag = "Profile",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ReorderRequest,
    responses((status = 200, description = "Experiences reordered", body = ProfileResponse))
)]
#[post("/profile/{id}/experiences/reorder")]
pub async fn reorder_experiences(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<ReorderRequest>,
) -> AppResult<HttpResponse> {
    let user_id = own_profile(auth, path.into_inner())?;
    let model = profile_service::reorder_experiences(pool.get_ref(), user_id, &body.ids).await?;
    Ok(respond(model))
}

/// Replace an experience in place. An unknown entry id leaves the profile unchanged.
#[utoipa::path(
    patch,
    path = "/api/profile/{id}/experiences/{entry_id}",
    tag = "Profile",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("entry_id" = Uuid, Path, description = "Experience ID")
    ),
    request_body = ExperienceInput,
    responses((status = 200, description = "Profile", body = ProfileResponse))
)]
#[patch("/profile/{id}/experiences/{entry_id}")]
pub async fn update_experience(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<ExperienceInput>,
) -> AppResult<HttpResponse> {
    let (id, entry_id) = path.into_inner();
    let user_id = own_profile(auth, id)?;
    let model =
        profile_service::update_experience(pool.get_ref(), user_id, entry_id, body.into_inner())
            .await?;
    Ok(respond(model))
}

#[utoipa::path(
    delete,
    path = "/api/profile/{id}/experiences/{entry_id}",
    tag = "Profile",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("entry_id" = Uuid, Path, description = "Experience ID")
    ),
    responses((status = 200, description = "Profile", body = ProfileResponse))
)]
#[delete("/profile/{id}/experiences/{entry_id}")]
pub async fn delete_experience(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (id, entry_id) = path.into_inner();
    let user_id = own_profile(auth, id)?;
    let model = profile_service::delete_experience(pool.get_ref(), user_id, entry_id).await?;
    Ok(respond(model))
}

#[utoipa::path(
    put,
    path = "/api/profile/{id}/educations",
    tag = "Profile",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = EducationInput,
    responses((status = 200, description = "Education added", body = ProfileResponse))
)]
#[put("/profile/{id}/educations")]
pub async fn add_education(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<EducationInput>,
) -> AppResult<HttpResponse> {
    let user_id = own_profile(auth, path.into_inner())?;
    let model = profile_service::add_education(pool.get_ref(), user_id, body.into_inner()).await?;
    Ok(respond(model))
}

#[utoipa::path(
    post,
    path = "/api/profile/{id}/educations/reorder",
    tag = "Profile",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ReorderRequest,
    responses((status = 200, description = "Educations reordered", body = ProfileResponse))
)]
#[post("/profile/{id}/educations/reorder")]
pub async fn reorder_educations(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<ReorderRequest>,
) -> AppResult<HttpResponse> {
    let user_id = own_profile(auth, path.into_inner())?;
    let model = profile_service::reorder_educations(pool.get_ref(), user_id, &body.ids).await?;
    Ok(respond(model))
}

#[utoipa::path(
    patch,
    path = "/api/profile/{id}/educations/{entry_id}",
    tag = "Profile",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("entry_id" = Uuid, Path, description = "Education ID")
    ),
    request_body = EducationInput,
    responses((status = 200, description = "Profile", body = ProfileResponse))
)]
#[patch("/profile/{id}/educations/{entry_id}")]
pub async fn update_education(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<EducationInput>,
) -> AppResult<HttpResponse> {
    let (id, entry_id) = path.into_inner();
    let user_id = own_profile(auth, id)?;
    let model =
        profile_service::update_education(pool.get_ref(), user_id, entry_id, body.into_inner())
            .await?;
    Ok(respond(model))
}

#[utoipa::path(
    delete,
    path = "/api/profile/{id}/educations/{entry_id}",
    tag = "Profile",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("entry_id" = Uuid, Path, description = "Education ID")
    ),
    responses((status = 200, description = "Profile", body = ProfileResponse))
)]
#[delete("/profile/{id}/educations/{entry_id}")]
pub async fn delete_education(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (id, entry_id) = path.into_inner();
    let user_id = own_profile(auth, id)?;
    let model = profile_service::delete_education(pool.get_ref(), user_id, entry_id).await?;
    Ok(respond(model))
}

/// Add skills. Values are trimmed, lower-cased and deduplicated.
#[utoipa::path(
    put,
    path = "/api/profile/{id}/skills",
    tag = "Profile",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SkillsRequest,
    responses((status = 200, description = "Skills added", body = ProfileResponse))
)]
#[put("/profile/{id}/skills")]
pub async fn add_skills(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<SkillsRequest>,
) -> AppResult<HttpResponse> {
    let user_id = own_profile(auth, path.into_inner())?;
    let model = profile_service::add_profile_skills(pool.get_ref(), user_id, &body.skills).await?;
    Ok(respond(model))
}

#[utoipa::path(
    delete,
    path = "/api/profile/{id}/skills",
    tag = "Profile",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SkillsRequest,
    responses((status = 200, description = "Skills removed", body = ProfileResponse))
)]
#[delete("/profile/{id}/skills")]
pub async fn remove_skills(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<SkillsRequest>,
) -> AppResult<HttpResponse> {
    let user_id = own_profile(auth, path.into_inner())?;
    let model =
        profile_service::remove_profile_skills(pool.get_ref(), user_id, &body.skills).await?;
    Ok(respond(model))
}
