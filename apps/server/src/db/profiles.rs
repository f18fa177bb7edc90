//! Database operations for profiles.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;
use uuid::Uuid;

use crate::entity::profile::{self, ActiveModel, Entity as Profile};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    pub async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<profile::Model>> {
        Ok(Profile::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(self.connection())
            .await?)
    }

    /// The user's profile, created empty on first access.
    pub async fn get_or_create_profile(&self, user_id: Uuid) -> AppResult<profile::Model> {
        if let Some(existing) = self.find_profile(user_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            headline: Set(None),
            bio: Set(None),
            location: Set(None),
            phone: Set(None),
            website: Set(None),
            experiences: Set(json!([])),
            educations: Set(json!([])),
            skills: Set(json!([])),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match model.insert(self.connection()).await {
            Ok(created) => Ok(created),
            // A concurrent first access may have won the unique user_id race.
            Err(e) => self
                .find_profile(user_id)
                .await?
                .ok_or_else(|| AppError::Database(format!("Failed to create profile: {}", e))),
        }
    }

    /// Persist a modified profile, stamping `updated_at`.
    pub async fn save_profile(&self, mut active: ActiveModel) -> AppResult<profile::Model> {
        active.updated_at = Set(Utc::now());
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update profile: {}", e)))
    }

    pub async fn delete_profile_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = Profile::delete_many()
            .filter(profile::Column::UserId.eq(user_id))
            .exec(self.connection())
            .await?;
        Ok(result.rows_affected)
    }
}
