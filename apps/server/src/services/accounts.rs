//! Account lifecycle: signup, login, password reset, credential changes and deletion.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::Set;
use tokio::task;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::db::DbPool;
use crate::db::password_resets::{generate_token, hash_token};
use crate::db::users::NewUser;
use crate::entity::user;
use crate::error::{AppError, AppResult};
use crate::models::user::{GitHubUserInfo, MIN_PASSWORD_LENGTH, normalize_email};
use crate::models::{
    ChangeEmailRequest, ChangePasswordRequest, LoginRequest, SignupRequest, UpdateAccountRequest,
    non_blank, required,
};

use super::storage::BlobStore;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_RESET_TOKEN: &str = "Invalid or expired reset token";

/// Hash a password with Argon2id on the blocking pool.
pub async fn hash_password(password: String) -> AppResult<String> {
    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

pub async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
    task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&password_hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash format: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
}

fn check_password_strength(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn parse_email(email: &str) -> AppResult<String> {
    normalize_email(email)
        .ok_or_else(|| AppError::InvalidInput("a valid email is required".to_string()))
}

/// Require the account's current password when it has one.
async fn confirm_password(user: &user::Model, provided: Option<String>) -> AppResult<()> {
    let Some(hash) = user.password_hash.clone() else {
        return Ok(());
    };
    let provided =
        provided.ok_or_else(|| AppError::InvalidInput("current password is required".to_string()))?;
    if !verify_password(provided, hash).await? {
        return Err(AppError::InvalidInput(
            "current password is incorrect".to_string(),
        ));
    }
    Ok(())
}

pub async fn signup(db: &DbPool, req: SignupRequest) -> AppResult<user::Model> {
    let name = required(&req.name, "name")?;
    let email = parse_email(&req.email)?;
    check_password_strength(&req.password)?;

    if db.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(req.password).await?;
    let user = db
        .insert_user(NewUser {
            name,
            email,
            password_hash: Some(password_hash),
            github_id: None,
            avatar_url: None,
        })
        .await?;

    info!(user_id = %user.id, "account created");
    Ok(user)
}

pub async fn login(db: &DbPool, req: LoginRequest) -> AppResult<user::Model> {
    let unauthorized = || AppError::Unauthorized(INVALID_CREDENTIALS.to_string());

    let email = normalize_email(&req.email).ok_or_else(unauthorized)?;
    let user = db.find_user_by_email(&email).await?.ok_or_else(unauthorized)?;
    let hash = user.password_hash.clone().ok_or_else(unauthorized)?;

    if !verify_password(req.password, hash).await? {
        warn!(user_id = %user.id, "failed login attempt");
        return Err(unauthorized());
    }

    Ok(user)
}

/// Issue a reset token for the account with this email.
///
/// Returns the raw token, or `None` when no account matches. Callers must not
/// reveal which case occurred.
pub async fn request_password_reset(
    db: &DbPool,
    settings: &SessionSettings,
    email: &str,
) -> AppResult<Option<(user::Model, String)>> {
    let Some(email) = normalize_email(email) else {
        return Ok(None);
    };
    let Some(user) = db.find_user_by_email(&email).await? else {
        return Ok(None);
    };

    let token = generate_token();
    db.insert_reset_token(user.id, &hash_token(&token), settings.reset_token_ttl_secs)
        .await?;

    Ok(Some((user, token)))
}

/// Check a reset token without consuming it.
pub async fn verify_reset_token(db: &DbPool, token: &str) -> AppResult<()> {
    db.find_valid_reset_token(&hash_token(token.trim()))
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::InvalidInput(INVALID_RESET_TOKEN.to_string()))
}

/// Consume a reset token and set the new password.
pub async fn reset_password(db: &DbPool, token: &str, new_password: String) -> AppResult<()> {
    check_password_strength(&new_password)?;

    let record = db
        .find_valid_reset_token(&hash_token(token.trim()))
        .await?
        .ok_or_else(|| AppError::InvalidInput(INVALID_RESET_TOKEN.to_string()))?;

    if !db.consume_reset_token(record.id).await? {
        return Err(AppError::InvalidInput(INVALID_RESET_TOKEN.to_string()));
    }

    let user = db.get_user(record.user_id).await?;
    let password_hash = hash_password(new_password).await?;
    let mut active: user::ActiveModel = user.into();
    active.password_hash = Set(Some(password_hash));
    db.save_user(active).await?;

    info!(user_id = %record.user_id, "password reset");
    Ok(())
}

/// Set a new password. OAuth-only accounts may set a first password without a current one.
pub async fn change_password(
    db: &DbPool,
    user_id: Uuid,
    req: ChangePasswordRequest,
) -> AppResult<()> {
    check_password_strength(&req.new_password)?;
    let user = db.get_user(user_id).await?;
    confirm_password(&user, req.current_password).await?;

    let password_hash = hash_password(req.new_password).await?;
    let mut active: user::ActiveModel = user.into();
    active.password_hash = Set(Some(password_hash));
    db.save_user(active).await?;

    info!(user_id = %user_id, "password changed");
    Ok(())
}

pub async fn change_email(
    db: &DbPool,
    user_id: Uuid,
    req: ChangeEmailRequest,
) -> AppResult<user::Model> {
    let email = parse_email(&req.new_email)?;
    let user = db.get_user(user_id).await?;
    if user.email == email {
        return Ok(user);
    }
    confirm_password(&user, req.password).await?;

    if db.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let mut active: user::ActiveModel = user.into();
    active.email = Set(email);
    let updated = db.save_user(active).await?;

    info!(user_id = %user_id, "email changed");
    Ok(updated)
}

pub async fn update_account(
    db: &DbPool,
    user_id: Uuid,
    req: UpdateAccountRequest,
) -> AppResult<user::Model> {
    let user = db.get_user(user_id).await?;
    let mut active: user::ActiveModel = user.into();
    if let Some(name) = req.name {
        active.name = Set(required(&name, "name")?);
    }
    if req.avatar_url.is_some() {
        active.avatar_url = Set(non_blank(req.avatar_url));
    }
    db.save_user(active).await
}

/// Delete an account and everything it owns.
///
/// Blob deletes are best-effort; the rows are removed regardless.
pub async fn delete_account(db: &DbPool, store: &dyn BlobStore, user_id: Uuid) -> AppResult<()> {
    let user = db.get_user(user_id).await?;

    for doc in db.list_all_documents(user_id).await? {
        if doc.is_archived {
            continue;
        }
        if let Err(e) = store.delete(&doc.file_key).await {
            warn!(document_id = %doc.id, key = %doc.file_key, error = %e, "failed to delete document blob");
        }
    }

    let documents = db.delete_documents_for_owner(user_id).await?;
    let jobs = db.delete_jobs_for_owner(user_id).await?;
    db.delete_profile_for_user(user_id).await?;
    db.delete_reset_tokens_for_user(user_id).await?;
    db.delete_user(user).await?;

    info!(user_id = %user_id, documents, jobs, "account deleted");
    Ok(())
}

/// Resolve the account for a GitHub login.
///
/// Matches on the GitHub id first, then links an existing account with the
/// same verified email, and otherwise creates a password-less account.
pub async fn login_with_github(
    db: &DbPool,
    info: GitHubUserInfo,
    verified_email: Option<String>,
) -> AppResult<user::Model> {
    if let Some(existing) = db.find_user_by_github_id(info.id).await? {
        let mut active: user::ActiveModel = existing.into();
        active.avatar_url = Set(info.avatar_url);
        return db.save_user(active).await;
    }

    let email = verified_email
        .as_deref()
        .and_then(normalize_email)
        .ok_or_else(|| {
            AppError::Unauthorized("GitHub account has no verified email".to_string())
        })?;

    if let Some(existing) = db.find_user_by_email(&email).await? {
        let mut active: user::ActiveModel = existing.into();
        active.github_id = Set(Some(info.id));
        if let Some(avatar) = info.avatar_url {
            active.avatar_url = Set(Some(avatar));
        }
        let linked = db.save_user(active).await?;
        info!(user_id = %linked.id, github_login = %info.login, "GitHub account linked");
        return Ok(linked);
    }

    let user = db
        .insert_user(NewUser {
            name: non_blank(info.name).unwrap_or_else(|| info.login.clone()),
            email,
            password_hash: None,
            github_id: Some(info.id),
            avatar_url: info.avatar_url,
        })
        .await?;

    info!(user_id = %user.id, github_login = %info.login, "account created via GitHub");
    Ok(user)
}
