//! Database operations for job applications.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::job::{self, ActiveModel, Entity as Job};
use crate::error::{AppError, AppResult};
use crate::models::{JobDocuments, JobStatus};

use super::DbPool;

/// A validated job ready to insert.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub owner_id: Uuid,
    pub title: String,
    pub company: String,
    pub country: String,
    pub city: String,
    pub job_url: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub status: JobStatus,
    pub application_date: DateTime<Utc>,
    pub documents: JobDocuments,
}

impl DbPool {
    pub async fn insert_job(&self, new: NewJob) -> AppResult<job::Model> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(new.owner_id),
            title: Set(new.title),
            company: Set(new.company),
            country: Set(new.country),
            city: Set(new.city),
            job_url: Set(new.job_url),
            description: Set(new.description),
            notes: Set(new.notes),
            status: Set(new.status.as_str().to_string()),
            application_date: Set(new.application_date),
            documents: Set(new.documents.to_json()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert job: {}", e)))
    }

    /// Jobs of an owner, newest application date first.
    pub async fn list_jobs(
        &self,
        owner_id: Uuid,
        status: Option<JobStatus>,
    ) -> AppResult<Vec<job::Model>> {
        let mut query = Job::find().filter(job::Column::OwnerId.eq(owner_id));
        if let Some(s) = status {
            query = query.filter(job::Column::Status.eq(s.as_str()));
        }

        Ok(query
            .order_by_desc(job::Column::ApplicationDate)
            .order_by_desc(job::Column::CreatedAt)
            .order_by_desc(job::Column::Id)
            .all(self.connection())
            .await?)
    }

    pub async fn find_job(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<job::Model>> {
        Ok(Job::find_by_id(id)
            .filter(job::Column::OwnerId.eq(owner_id))
            .one(self.connection())
            .await?)
    }

    pub async fn get_job(&self, owner_id: Uuid, id: Uuid) -> AppResult<job::Model> {
        self.find_job(owner_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job".to_string()))
    }

    /// The owner's job carrying exactly this URL, if any.
    pub async fn find_job_by_url(
        &self,
        owner_id: Uuid,
        job_url: &str,
    ) -> AppResult<Option<job::Model>> {
        Ok(Job::find()
            .filter(job::Column::OwnerId.eq(owner_id))
            .filter(job::Column::JobUrl.eq(job_url))
            .one(self.connection())
            .await?)
    }

    /// Persist a modified job, stamping `updated_at`.
    pub async fn save_job(&self, mut active: ActiveModel) -> AppResult<job::Model> {
        active.updated_at = Set(Utc::now());
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update job: {}", e)))
    }

    /// Hard delete. Referenced documents are left untouched.
    pub async fn delete_job(&self, owner_id: Uuid, id: Uuid) -> AppResult<()> {
        let model = self.get_job(owner_id, id).await?;
        model.delete(self.connection()).await?;
        Ok(())
    }

    pub async fn delete_jobs_for_owner(&self, owner_id: Uuid) -> AppResult<u64> {
        let result = Job::delete_many()
            .filter(job::Column::OwnerId.eq(owner_id))
            .exec(self.connection())
            .await?;
        Ok(result.rows_affected)
    }
}
