//! Profile mutations.
//!
//! Each operation reads the user's profile row, changes one field group in
//! memory and writes it back. There is no version check, so concurrent edits
//! of the same list are last-write-wins.

use sea_orm::Set;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entity::profile;
use crate::error::AppResult;
use crate::models::{
    Education, EducationInput, Experience, ExperienceInput, UpsertProfileRequest, non_blank,
};

/// An embedded list entry addressed by id.
pub trait ListEntry {
    fn entry_id(&self) -> Uuid;
}

impl ListEntry for Experience {
    fn entry_id(&self) -> Uuid {
        self.id
    }
}

impl ListEntry for Education {
    fn entry_id(&self) -> Uuid {
        self.id
    }
}

/// Insert at the head; lists are most recent first.
pub fn prepend<T>(list: &mut Vec<T>, entry: T) {
    list.insert(0, entry);
}

/// Replace the entry with the same id in place. Returns false if absent.
pub fn replace_by_id<T: ListEntry>(list: &mut [T], entry: T) -> bool {
    match list.iter_mut().find(|e| e.entry_id() == entry.entry_id()) {
        Some(slot) => {
            *slot = entry;
            true
        }
        None => false,
    }
}

pub fn remove_by_id<T: ListEntry>(list: &mut Vec<T>, id: Uuid) -> bool {
    let before = list.len();
    list.retain(|e| e.entry_id() != id);
    list.len() != before
}

/// Order entries by `ids`. Unlisted entries follow in their previous relative order;
/// unknown ids are ignored.
pub fn reorder<T: ListEntry>(list: &mut Vec<T>, ids: &[Uuid]) {
    let mut remaining = std::mem::take(list);
    for id in ids {
        if let Some(pos) = remaining.iter().position(|e| e.entry_id() == *id) {
            list.push(remaining.remove(pos));
        }
    }
    list.append(&mut remaining);
}

pub fn normalize_skill(skill: &str) -> Option<String> {
    let s = skill.trim().to_lowercase();
    (!s.is_empty()).then_some(s)
}

/// Union of the existing skills and the normalized new ones, existing order first.
pub fn add_skills(existing: &mut Vec<String>, new: &[String]) -> bool {
    let before = existing.len();
    for skill in new.iter().filter_map(|s| normalize_skill(s)) {
        if !existing.contains(&skill) {
            existing.push(skill);
        }
    }
    existing.len() != before
}

/// Remove skills, matching after the same normalization used on add.
pub fn remove_skills(existing: &mut Vec<String>, remove: &[String]) -> bool {
    let targets: Vec<String> = remove.iter().filter_map(|s| normalize_skill(s)).collect();
    let before = existing.len();
    existing.retain(|s| !targets.contains(&normalize_skill(s).unwrap_or_default()));
    existing.len() != before
}

#[derive(Clone, Copy)]
enum ListField {
    Experiences,
    Educations,
    Skills,
}

fn field_value(model: &profile::Model, field: ListField) -> &JsonValue {
    match field {
        ListField::Experiences => &model.experiences,
        ListField::Educations => &model.educations,
        ListField::Skills => &model.skills,
    }
}

/// Read one embedded list, apply `f`, and write it back if it reports a change.
async fn modify_list<T, F>(
    db: &DbPool,
    user_id: Uuid,
    field: ListField,
    f: F,
) -> AppResult<profile::Model>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut Vec<T>) -> AppResult<bool>,
{
    let current = db.get_or_create_profile(user_id).await?;
    let mut list: Vec<T> = serde_json::from_value(field_value(&current, field).clone())
        .unwrap_or_default();

    if !f(&mut list)? {
        return Ok(current);
    }

    let value = serde_json::to_value(&list)?;
    let mut active: profile::ActiveModel = current.into();
    match field {
        ListField::Experiences => active.experiences = Set(value),
        ListField::Educations => active.educations = Set(value),
        ListField::Skills => active.skills = Set(value),
    }
    db.save_profile(active).await
}

pub async fn upsert_profile(
    db: &DbPool,
    user_id: Uuid,
    req: UpsertProfileRequest,
) -> AppResult<profile::Model> {
    let current = db.get_or_create_profile(user_id).await?;
    let mut active: profile::ActiveModel = current.into();
    active.headline = Set(non_blank(req.headline));
    active.bio = Set(non_blank(req.bio));
    active.location = Set(non_blank(req.location));
    active.phone = Set(non_blank(req.phone));
    active.website = Set(non_blank(req.website));
    db.save_profile(active).await
}

pub async fn add_experience(
    db: &DbPool,
    user_id: Uuid,
    input: ExperienceInput,
) -> AppResult<profile::Model> {
    let entry = input.into_entry(Uuid::new_v4())?;
    modify_list(db, user_id, ListField::Experiences, |list: &mut Vec<Experience>| {
        prepend(list, entry);
        Ok(true)
    })
    .await
}

pub async fn update_experience(
    db: &DbPool,
    user_id: Uuid,
    entry_id: Uuid,
    input: ExperienceInput,
) -> AppResult<profile::Model> {
    let entry = input.into_entry(entry_id)?;
    modify_list(db, user_id, ListField::Experiences, |list: &mut Vec<Experience>| {
        Ok(replace_by_id(list, entry))
    })
    .await
}

pub async fn delete_experience(
    db: &DbPool,
    user_id: Uuid,
    entry_id: Uuid,
) -> AppResult<profile::Model> {
    modify_list(db, user_id, ListField::Experiences, |list: &mut Vec<Experience>| {
        Ok(remove_by_id(list, entry_id))
    })
    .await
}

pub async fn reorder_experiences(
    db: &DbPool,
    user_id: Uuid,
    ids: &[Uuid],
) -> AppResult<profile::Model> {
    modify_list(db, user_id, ListField::Experiences, |list: &mut Vec<Experience>| {
        reorder(list, ids);
        Ok(true)
    })
    .await
}

pub async fn add_education(
    db: &DbPool,
    user_id: Uuid,
    input: EducationInput,
) -> AppResult<profile::Model> {
    let entry = input.into_entry(Uuid::new_v4())?;
    modify_list(db, user_id, ListField::Educations, |list: &mut Vec<Education>| {
        prepend(list, entry);
        Ok(true)
    })
    .await
}

pub async fn update_education(
    db: &DbPool,
    user_id: Uuid,
    entry_id: Uuid,
    input: EducationInput,
) -> AppResult<profile::Model> {
    let entry = input.into_entry(entry_id)?;
    modify_list(db, user_id, ListField::Educations, |list: &mut Vec<Education>| {
        Ok(replace_by_id(list, entry))
    })
    .await
}

pub async fn delete_education(
    db: &DbPool,
    user_id: Uuid,
    entry_id: Uuid,
) -> AppResult<profile::Model> {
    modify_list(db, user_id, ListField::Educations, |list: &mut Vec<Education>| {
        Ok(remove_by_id(list, entry_id))
    })
    .await
}

pub async fn reorder_educations(
    db: &DbPool,
    user_id: Uuid,
    ids: &[Uuid],
) -> AppResult<profile::Model> {
    modify_list(db, user_id, ListField::Educations, |list: &mut Vec<Education>| {
        reorder(list, ids);
        Ok(true)
    })
    .await
}

pub async fn add_profile_skills(
    db: &DbPool,
    user_id: Uuid,
    skills: &[String],
) -> AppResult<profile::Model> {
    modify_list(db, user_id, ListField::Skills, |list: &mut Vec<String>| {
        Ok(add_skills(list, skills))
    })
    .await
}

pub async fn remove_profile_skills(
    db: &DbPool,
    user_id: Uuid,
    skills: &[String],
) -> AppResult<profile::Model> {
    modify_list(db, user_id, ListField::Skills, |list: &mut Vec<String>| {
        Ok(remove_skills(list, skills))
    })
    .await
}
