//! Account endpoints: signup, login, session and credential management.

use actix_web::{HttpResponse, delete, get, post, put, web};
use tracing::info;

use crate::auth::{AuthUser, clear_session_cookie, create_session_token, session_cookie};
use crate::config::Config;
use crate::db::DbPool;
use crate::entity::user;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::{
    ApiResponse, ChangeEmailRequest, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    ResetPasswordRequest, SignupRequest, UpdateAccountRequest, UserResponse,
    VerifyResetTokenRequest,
};
use crate::services::{BlobStore, accounts};

/// Configure account routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(signup)
        .service(login)
        .service(logout)
        .service(me)
        .service(update_me)
        .service(forgot_password)
        .service(verify_reset_token)
        .service(reset_password)
        .service(change_password)
        .service(change_email)
        .service(delete_account);
}

/// Response carrying the user and a fresh session cookie.
fn with_session(
    mut builder: actix_web::HttpResponseBuilder,
    user: user::Model,
    config: &Config,
) -> AppResult<HttpResponse> {
    let token = create_session_token(user.id, &config.session)?;
    Ok(builder
        .cookie(session_cookie(
            token,
            &config.session,
            config.environment.is_production(),
        ))
        .json(ApiResponse::ok(UserResponse::from(user))))
}

/// Create a password account and start a session.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid input or email taken", body = ErrorResponse)
    )
)]
#[post("/auth/signup")]
pub async fn signup(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let user = accounts::signup(pool.get_ref(), body.into_inner()).await?;
    with_session(HttpResponse::Created(), user, &config)
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = UserResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[post("/auth/login")]
pub async fn login(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let user = accounts::login(pool.get_ref(), body.into_inner()).await?;
    info!(user_id = %user.id, "login");
    with_session(HttpResponse::Ok(), user, &config)
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Session cookie cleared"))
)]
#[post("/auth/logout")]
pub async fn logout(config: web::Data<Config>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(clear_session_cookie(config.environment.is_production()))
        .json(ApiResponse::message("Logged out"))
}

/// Load the caller's account. A valid token for a deleted account is treated as no session.
async fn current_user(pool: &DbPool, auth: AuthUser) -> AppResult<user::Model> {
    pool.find_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "No valid session", body = ErrorResponse)
    )
)]
#[get("/auth/me")]
pub async fn me(pool: web::Data<DbPool>, auth: AuthUser) -> AppResult<HttpResponse> {
    let user = current_user(&pool, auth).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserResponse::from(user))))
}

#[utoipa::path(
    put,
    path = "/api/auth/me",
    tag = "Auth",
    request_body = UpdateAccountRequest,
    responses((status = 200, description = "Account updated", body = UserResponse))
)]
#[put("/auth/me")]
pub async fn update_me(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    body: web::Json<UpdateAccountRequest>,
) -> AppResult<HttpResponse> {
    current_user(&pool, auth).await?;
    let user = accounts::update_account(pool.get_ref(), auth.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserResponse::from(user))))
}

/// Start a password reset.
///
/// Always answers the same way so the endpoint cannot be used to probe for
/// accounts. The reset link is written to the server log.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordRequest,
    responses((status = 200, description = "Reset requested"))
)]
#[post("/auth/forgot-password")]
pub async fn forgot_password(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<ForgotPasswordRequest>,
) -> AppResult<HttpResponse> {
    if let Some((user, token)) =
        accounts::request_password_reset(pool.get_ref(), &config.session, &body.email).await?
    {
        info!(
            user_id = %user.id,
            "password reset link: {}/reset-password?token={}",
            config.public_url.trim_end_matches('/'),
            token
        );
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message(
        "If an account exists for that email, a reset link has been sent",
    )))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-reset-token",
    tag = "Auth",
    request_body = VerifyResetTokenRequest,
    responses(
        (status = 200, description = "Token is valid"),
        (status = 400, description = "Invalid or expired token", body = ErrorResponse)
    )
)]
#[post("/auth/verify-reset-token")]
pub async fn verify_reset_token(
    pool: web::Data<DbPool>,
    body: web::Json<VerifyResetTokenRequest>,
) -> AppResult<HttpResponse> {
    accounts::verify_reset_token(pool.get_ref(), &body.token).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Token is valid")))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Invalid token or weak password", body = ErrorResponse)
    )
)]
#[post("/auth/reset-password")]
pub async fn reset_password(
    pool: web::Data<DbPool>,
    body: web::Json<ResetPasswordRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    accounts::reset_password(pool.get_ref(), &body.token, body.new_password).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Password has been reset")))
}

#[utoipa::path(
    put,
    path = "/api/auth/password",
    tag = "Auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Current password missing or wrong", body = ErrorResponse)
    )
)]
#[put("/auth/password")]
pub async fn change_password(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    current_user(&pool, auth).await?;
    accounts::change_password(pool.get_ref(), auth.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Password updated")))
}

#[utoipa::path(
    put,
    path = "/api/auth/email",
    tag = "Auth",
    request_body = ChangeEmailRequest,
    responses(
        (status = 200, description = "Email changed", body = UserResponse),
        (status = 400, description = "Invalid email, email taken or wrong password", body = ErrorResponse)
    )
)]
#[put("/auth/email")]
pub async fn change_email(
    pool: web::Data<DbPool>,
    auth: AuthUser,
    body: web::Json<ChangeEmailRequest>,
) -> AppResult<HttpResponse> {
    current_user(&pool, auth).await?;
    let user = accounts::change_email(pool.get_ref(), auth.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserResponse::from(user))))
}

/// Delete the account with its jobs, documents and profile.
#[utoipa::path(
    delete,
    path = "/api/auth/account",
    tag = "Auth",
    responses((status = 200, description = "Account deleted"))
)]
#[delete("/auth/account")]
pub async fn delete_account(
    pool: web::Data<DbPool>,
    store: web::Data<dyn BlobStore>,
    config: web::Data<Config>,
    auth: AuthUser,
) -> AppResult<HttpResponse> {
    current_user(&pool, auth).await?;
    accounts::delete_account(pool.get_ref(), store.get_ref(), auth.user_id).await?;
    Ok(HttpResponse::Ok()
        .cookie(clear_session_cookie(config.environment.is_production()))
        .json(ApiResponse::message("Account deleted")))
}
