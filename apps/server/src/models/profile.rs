//! Profile models: basic fields plus embedded experience, education and skill lists.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{non_blank, required};
use crate::entity::profile;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: Uuid,
    pub degree: String,
    pub institution: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

/// Experience fields supplied by the client; the id is assigned server-side.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl ExperienceInput {
    /// Validate and build the stored entry.
    pub fn into_entry(self, id: Uuid) -> AppResult<Experience> {
        // A current position has no end date.
        let end_date = if self.current { None } else { self.end_date };
        check_dates(self.start_date, end_date)?;
        Ok(Experience {
            id,
            title: required(&self.title, "title")?,
            company: required(&self.company, "company")?,
            location: non_blank(self.location),
            start_date: self.start_date,
            end_date,
            current: self.current,
            description: non_blank(self.description),
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EducationInput {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl EducationInput {
    pub fn into_entry(self, id: Uuid) -> AppResult<Education> {
        check_dates(self.start_date, self.end_date)?;
        Ok(Education {
            id,
            degree: required(&self.degree, "degree")?,
            institution: required(&self.institution, "institution")?,
            start_date: self.start_date,
            end_date: self.end_date,
            grade: non_blank(self.grade),
            description: non_blank(self.description),
        })
    }
}

fn check_dates(start: NaiveDate, end: Option<NaiveDate>) -> AppResult<()> {
    match end {
        Some(end) if end < start => Err(AppError::InvalidInput(
            "endDate must not be before startDate".to_string(),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<profile::Model> for ProfileResponse {
    fn from(m: profile::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            headline: m.headline,
            bio: m.bio,
            location: m.location,
            phone: m.phone,
            website: m.website,
            experiences: serde_json::from_value(m.experiences).unwrap_or_default(),
            educations: serde_json::from_value(m.educations).unwrap_or_default(),
            skills: serde_json::from_value(m.skills).unwrap_or_default(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Basic profile fields. Absent or blank values clear the field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfileRequest {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SkillsRequest {
    pub skills: Vec<String>,
}

/// New order for an embedded list, by entry id.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReorderRequest {
    pub ids: Vec<Uuid>,
}
