//! Coach registry writes

use chrono::{DateTime, Utc};
use shared::models::{Coach, CoachCreate, CoachUpdate, EntityKind, HistoryAction};
use sqlx::SqlitePool;

use crate::audit;
use crate::db::repository::RepoError;
use crate::db::repository::coach::{self, CoachChanges, NewCoach};
use crate::utils::time::{parse_loose_date, parse_optional_instant};
use crate::utils::validation::{
    self, MAX_COACH_NOTE_LEN, MAX_FULL_NAME_LEN, MAX_SPECIALTY_LEN,
};
use crate::utils::{AppError, AppResult, ErrorCode};

pub struct CoachService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CoachService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, req: CoachCreate, now: DateTime<Utc>) -> AppResult<Coach> {
        let data = NewCoach {
            full_name: validation::required_person_name(
                "full_name",
                Some(req.full_name.as_str()),
                MAX_FULL_NAME_LEN,
            )?,
            specialty: validation::optional_text(
                "specialty",
                req.specialty.as_deref(),
                MAX_SPECIALTY_LEN,
            )?,
            email: validation::email(req.email.as_deref())?,
            phone: validation::coach_phone(req.phone.as_deref()),
            national_id: validation::national_id(req.national_id.as_deref())?,
            date_of_birth: coach_birth_date(req.date_of_birth.as_deref())?,
            registration_date: parse_optional_instant(
                "registration_date",
                req.registration_date.as_deref(),
            )?
            .unwrap_or(now)
            .timestamp_millis(),
            notes: validation::optional_text("notes", req.notes.as_deref(), MAX_COACH_NOTE_LEN)?,
        };

        if let Some(email) = data.email.as_deref() {
            if coach::email_taken(self.pool, email, None).await? {
                return Err(AppError::new(ErrorCode::EmailExists));
            }
        }

        let created = coach::insert(self.pool, &data).await.map_err(write_error)?;
        tracing::info!(coach_id = created.id, "Coach created");

        audit::record(
            self.pool,
            EntityKind::Coach,
            created.id,
            HistoryAction::Create,
            None,
            &created,
            now.timestamp_millis(),
        )
        .await;
        Ok(created)
    }

    pub async fn update(&self, id: i64, req: CoachUpdate, now: DateTime<Utc>) -> AppResult<Coach> {
        let changes = CoachChanges {
            full_name: validation::optional_person_name(
                "full_name",
                req.full_name.as_deref(),
                MAX_FULL_NAME_LEN,
            )?,
            specialty: validation::optional_text(
                "specialty",
                req.specialty.as_deref(),
                MAX_SPECIALTY_LEN,
            )?,
            email: validation::email(req.email.as_deref())?,
            phone: validation::coach_phone(req.phone.as_deref()),
            national_id: validation::national_id(req.national_id.as_deref())?,
            date_of_birth: coach_birth_date(req.date_of_birth.as_deref())?,
            registration_date: parse_optional_instant(
                "registration_date",
                req.registration_date.as_deref(),
            )?
            .map(|dt| dt.timestamp_millis()),
            notes: validation::optional_text("notes", req.notes.as_deref(), MAX_COACH_NOTE_LEN)?,
        };

        let current = active_coach(self.pool, id).await?;
        if let Some(email) = changes.email.as_deref() {
            if coach::email_taken(self.pool, email, Some(id)).await? {
                return Err(AppError::new(ErrorCode::EmailExists));
            }
        }

        let updated = coach::update(self.pool, id, &changes)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => coach_not_found(id),
                other => write_error(other),
            })?;
        tracing::info!(coach_id = id, "Coach updated");

        audit::record(
            self.pool,
            EntityKind::Coach,
            id,
            HistoryAction::Update,
            Some(&current),
            &updated,
            now.timestamp_millis(),
        )
        .await;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64, now: DateTime<Utc>) -> AppResult<Coach> {
        let current = active_coach(self.pool, id).await?;
        let deleted = coach::soft_delete(self.pool, id).await.map_err(|e| match e {
            RepoError::NotFound(_) => coach_not_found(id),
            other => other.into(),
        })?;
        tracing::info!(coach_id = id, "Coach deleted");

        audit::record(
            self.pool,
            EntityKind::Coach,
            id,
            HistoryAction::Delete,
            Some(&current),
            &deleted,
            now.timestamp_millis(),
        )
        .await;
        Ok(deleted)
    }
}

async fn active_coach(pool: &SqlitePool, id: i64) -> AppResult<Coach> {
    coach::find_by_id(pool, id)
        .await?
        .filter(|c| c.deleted_at.is_none())
        .ok_or_else(|| coach_not_found(id))
}

pub(crate) fn coach_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::CoachNotFound, format!("Coach {id} not found"))
        .with_detail("coach_id", id)
}

fn coach_birth_date(input: Option<&str>) -> AppResult<Option<String>> {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    parse_loose_date(raw)
        .map(|d| Some(d.format("%Y-%m-%d").to_string()))
        .ok_or_else(|| {
            AppError::invalid_field("date_of_birth", format!("Invalid date of birth: {raw}"))
        })
}

fn write_error(err: RepoError) -> AppError {
    match err.duplicate_column() {
        Some("email") => AppError::new(ErrorCode::EmailExists),
        _ => err.into(),
    }
}
