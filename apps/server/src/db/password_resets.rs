//! Database operations for password reset tokens.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entity::password_reset_token::{self, ActiveModel, Entity as PasswordResetToken};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// Hash a reset token using SHA-256. Only the hash is persisted.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a random reset token string.
pub fn generate_token() -> String {
    let random_bytes: [u8; 32] = rand::random();
    format!("jt_reset_{}", hex::encode(random_bytes))
}

impl DbPool {
    /// Store a new reset token hash. Earlier unused tokens for the user are invalidated.
    pub async fn insert_reset_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        ttl_secs: u64,
    ) -> AppResult<()> {
        let now = Utc::now();

        PasswordResetToken::update_many()
            .col_expr(
                password_reset_token::Column::UsedAt,
                Expr::value(Some(now)),
            )
            .filter(password_reset_token::Column::UserId.eq(user_id))
            .filter(password_reset_token::Column::UsedAt.is_null())
            .exec(self.connection())
            .await?;

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token_hash: Set(token_hash.to_string()),
            expires_at: Set(now + chrono::Duration::seconds(ttl_secs as i64)),
            used_at: Set(None),
            created_at: Set(now),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert reset token: {}", e)))?;

        Ok(())
    }

    /// Find an unused, unexpired token by its hash.
    pub async fn find_valid_reset_token(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<password_reset_token::Model>> {
        Ok(PasswordResetToken::find()
            .filter(password_reset_token::Column::TokenHash.eq(token_hash))
            .filter(password_reset_token::Column::UsedAt.is_null())
            .filter(password_reset_token::Column::ExpiresAt.gt(Utc::now()))
            .one(self.connection())
            .await?)
    }

    /// Mark a token consumed. Returns false if it was already used.
    pub async fn consume_reset_token(&self, id: Uuid) -> AppResult<bool> {
        let result = PasswordResetToken::update_many()
            .col_expr(
                password_reset_token::Column::UsedAt,
                Expr::value(Some(Utc::now())),
            )
            .filter(password_reset_token::Column::Id.eq(id))
            .filter(password_reset_token::Column::UsedAt.is_null())
            .exec(self.connection())
            .await?;

        Ok(result.rows_affected == 1)
    }

    pub async fn delete_reset_tokens_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = PasswordResetToken::delete_many()
            .filter(password_reset_token::Column::UserId.eq(user_id))
            .exec(self.connection())
            .await?;
        Ok(result.rows_affected)
    }
}
