//! Database operations for document metadata.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::document::{self, ActiveModel, Entity as Document};
use crate::error::{AppError, AppResult};
use crate::models::DocumentType;

use super::DbPool;

/// Metadata for a freshly stored blob.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub doc_type: DocumentType,
    pub title: String,
    pub description: Option<String>,
    pub file_key: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub is_default: bool,
}

impl DbPool {
    pub async fn insert_document(&self, new: NewDocument) -> AppResult<document::Model> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(new.id),
            owner_id: Set(new.owner_id),
            doc_type: Set(new.doc_type.as_str().to_string()),
            title: Set(new.title),
            description: Set(new.description),
            file_key: Set(new.file_key),
            file_name: Set(new.file_name),
            mime_type: Set(new.mime_type),
            file_size: Set(new.file_size),
            version: Set(1),
            is_default: Set(new.is_default),
            is_archived: Set(false),
            last_used_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert document: {}", e)))
    }

    /// Non-archived documents of an owner, newest first.
    pub async fn list_documents(
        &self,
        owner_id: Uuid,
        doc_type: Option<DocumentType>,
    ) -> AppResult<Vec<document::Model>> {
        let mut query = Document::find()
            .filter(document::Column::OwnerId.eq(owner_id))
            .filter(document::Column::IsArchived.eq(false));
        if let Some(t) = doc_type {
            query = query.filter(document::Column::DocType.eq(t.as_str()));
        }

        Ok(query
            .order_by_desc(document::Column::CreatedAt)
            .order_by_desc(document::Column::Id) // UUIDv7 is time-ordered
            .all(self.connection())
            .await?)
    }

    /// Every document row of an owner, archived ones included.
    pub async fn list_all_documents(&self, owner_id: Uuid) -> AppResult<Vec<document::Model>> {
        Ok(Document::find()
            .filter(document::Column::OwnerId.eq(owner_id))
            .all(self.connection())
            .await?)
    }

    /// A non-archived document owned by `owner_id`.
    pub async fn find_document(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<document::Model>> {
        Ok(Document::find_by_id(id)
            .filter(document::Column::OwnerId.eq(owner_id))
            .filter(document::Column::IsArchived.eq(false))
            .one(self.connection())
            .await?)
    }

    pub async fn get_document(&self, owner_id: Uuid, id: Uuid) -> AppResult<document::Model> {
        self.find_document(owner_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document".to_string()))
    }

    /// Current default document per type.
    pub async fn default_documents(&self, owner_id: Uuid) -> AppResult<Vec<document::Model>> {
        Ok(Document::find()
            .filter(document::Column::OwnerId.eq(owner_id))
            .filter(document::Column::IsDefault.eq(true))
            .filter(document::Column::IsArchived.eq(false))
            .order_by_desc(document::Column::UpdatedAt)
            .all(self.connection())
            .await?)
    }

    /// Clear the default flag on every non-archived document of (owner, type),
    /// optionally sparing one document.
    pub async fn clear_default_documents(
        &self,
        owner_id: Uuid,
        doc_type: DocumentType,
        except: Option<Uuid>,
    ) -> AppResult<u64> {
        let mut query = Document::update_many()
            .col_expr(document::Column::IsDefault, Expr::value(false))
            .col_expr(document::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(document::Column::OwnerId.eq(owner_id))
            .filter(document::Column::DocType.eq(doc_type.as_str()))
            .filter(document::Column::IsArchived.eq(false))
            .filter(document::Column::IsDefault.eq(true));
        if let Some(id) = except {
            query = query.filter(document::Column::Id.ne(id));
        }

        let result = query
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to clear defaults: {}", e)))?;

        Ok(result.rows_affected)
    }

    /// Persist a modified document, stamping `updated_at`.
    pub async fn save_document(&self, mut active: ActiveModel) -> AppResult<document::Model> {
        active.updated_at = Set(Utc::now());
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update document: {}", e)))
    }

    /// Set `last_used_at = now` on the owner's listed documents.
    pub async fn touch_documents(&self, owner_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Document::update_many()
            .col_expr(document::Column::LastUsedAt, Expr::value(Some(Utc::now())))
            .filter(document::Column::OwnerId.eq(owner_id))
            .filter(document::Column::Id.is_in(ids.iter().copied()))
            .exec(self.connection())
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn delete_documents_for_owner(&self, owner_id: Uuid) -> AppResult<u64> {
        let result = Document::delete_many()
            .filter(document::Column::OwnerId.eq(owner_id))
            .exec(self.connection())
            .await?;
        Ok(result.rows_affected)
    }
}
