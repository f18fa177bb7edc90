//! Database operations for users.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::user::{self, ActiveModel, Entity as User};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// Fields for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    /// Already normalized.
    pub email: String,
    pub password_hash: Option<String>,
    pub github_id: Option<i64>,
    pub avatar_url: Option<String>,
}

impl DbPool {
    pub async fn insert_user(&self, new: NewUser) -> AppResult<user::Model> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            github_id: Set(new.github_id),
            avatar_url: Set(new.avatar_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert user: {}", e)))
    }

    pub async fn find_user(&self, id: Uuid) -> AppResult<Option<user::Model>> {
        Ok(User::find_by_id(id).one(self.connection()).await?)
    }

    /// Find a user by id, mapping absence to `NotFound`.
    pub async fn get_user(&self, id: Uuid) -> AppResult<user::Model> {
        self.find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    pub async fn find_user_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        Ok(User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.connection())
            .await?)
    }

    pub async fn find_user_by_github_id(&self, github_id: i64) -> AppResult<Option<user::Model>> {
        Ok(User::find()
            .filter(user::Column::GithubId.eq(github_id))
            .one(self.connection())
            .await?)
    }

    /// Persist a modified user, stamping `updated_at`.
    pub async fn save_user(&self, mut active: ActiveModel) -> AppResult<user::Model> {
        active.updated_at = Set(Utc::now());
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update user: {}", e)))
    }

    pub async fn delete_user(&self, model: user::Model) -> AppResult<()> {
        model.delete(self.connection()).await?;
        Ok(())
    }
}
